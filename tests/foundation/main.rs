//! Integration tests for Layer 0: Foundation
//!
//! Tests for core types: Value, EntityId, FieldPath, Error, and the bus contract.

mod errors;
mod paths;
mod values;

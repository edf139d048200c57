//! Integration tests for Layer 1: Storage
//!
//! Tests for world snapshots, hierarchy, transforms, and component rules.

mod components;
mod hierarchy;
mod world;

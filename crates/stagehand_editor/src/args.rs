//! Positional argument decoding for bus methods.

use stagehand_foundation::{Error, FromValue, Result, Value};

/// Arguments of one bus call, checked for count up front.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Args<'a> {
    values: &'a [Value],
}

impl<'a> Args<'a> {
    /// Accepts between `min` and `max` arguments. Missing trailing arguments
    /// read as nil.
    pub(crate) fn expect(values: &'a [Value], min: usize, max: usize) -> Result<Self> {
        if values.len() < min || values.len() > max {
            let expected = if min == max {
                min.to_string()
            } else {
                format!("{min}..={max}")
            };
            return Err(Error::arity_mismatch(expected, values.len()));
        }
        Ok(Self { values })
    }

    /// Accepts no arguments.
    pub(crate) fn none(values: &'a [Value]) -> Result<Self> {
        Self::expect(values, 0, 0)
    }

    /// Decodes argument `index`.
    pub(crate) fn get<T: FromValue>(&self, index: usize) -> Result<T> {
        let value = self.values.get(index).cloned().unwrap_or_default();
        T::from_value(value).map_err(|e| e.in_frame(format!("argument {index}")))
    }
}

#[cfg(test)]
mod tests {
    use stagehand_foundation::{EntityId, ErrorKind};

    use super::*;

    #[test]
    fn arity_is_checked() {
        let values = [Value::from(1i64)];
        assert!(Args::expect(&values, 1, 2).is_ok());
        let err = Args::none(&values).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::ArityMismatch { actual: 1, .. }));
        let err = Args::expect(&values, 2, 3).unwrap_err();
        assert_eq!(err.to_string(), "arity mismatch: expected 2..=3, got 1");
    }

    #[test]
    fn missing_optional_reads_as_none() {
        let values = [Value::from("name")];
        let args = Args::expect(&values, 1, 2).unwrap();
        assert_eq!(args.get::<String>(0).unwrap(), "name");
        assert_eq!(args.get::<Option<EntityId>>(1).unwrap(), None);
    }

    #[test]
    fn wrong_type_is_a_mismatch() {
        let values = [Value::from(true)];
        let args = Args::expect(&values, 1, 1).unwrap();
        let err = args.get::<String>(0).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));
        assert!(err.context.is_some());
    }
}

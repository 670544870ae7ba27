//! Value filters attached to projection nodes.
//!
//! A filter decides, per row, whether a top-level column value qualifies.
//! Readers only call into the trait; concrete predicates are supplied by the
//! query layer. A couple of common ones are provided here.

use std::fmt::Debug;

/// A row-level predicate over the values of a single column.
///
/// Every test defaults to rejecting, so an implementation only needs to
/// override the value domains it understands.
pub trait ValueFilter: Debug + Send + Sync {
    /// Whether a null value passes.
    fn test_null(&self) -> bool {
        false
    }

    fn test_bool(&self, _value: bool) -> bool {
        false
    }

    /// Integer columns of every width are tested through this method.
    fn test_i64(&self, _value: i64) -> bool {
        false
    }

    fn test_f64(&self, _value: f64) -> bool {
        false
    }

    fn test_bytes(&self, _value: &[u8]) -> bool {
        false
    }
}

/// Accepts every non-null value.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsNotNull;

impl ValueFilter for IsNotNull {
    fn test_bool(&self, _value: bool) -> bool {
        true
    }

    fn test_i64(&self, _value: i64) -> bool {
        true
    }

    fn test_f64(&self, _value: f64) -> bool {
        true
    }

    fn test_bytes(&self, _value: &[u8]) -> bool {
        true
    }
}

/// Accepts integers within `lower..=upper`.
#[derive(Debug, Clone, Copy)]
pub struct Int64Range {
    pub lower: i64,
    pub upper: i64,
    pub null_allowed: bool,
}

impl Int64Range {
    pub fn new(lower: i64, upper: i64) -> Int64Range {
        Int64Range {
            lower,
            upper,
            null_allowed: false,
        }
    }
}

impl ValueFilter for Int64Range {
    fn test_null(&self) -> bool {
        self.null_allowed
    }

    fn test_i64(&self, value: i64) -> bool {
        (self.lower..=self.upper).contains(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int64_range() {
        let filter = Int64Range::new(10, 20);
        assert!(filter.test_i64(10));
        assert!(filter.test_i64(20));
        assert!(!filter.test_i64(21));
        assert!(!filter.test_null());
        assert!(!filter.test_bytes(b"15"));
    }

    #[test]
    fn test_is_not_null() {
        assert!(IsNotNull.test_bytes(b""));
        assert!(!IsNotNull.test_null());
    }
}

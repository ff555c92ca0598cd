//! Entry structure for key-value pairs

use super::value::Value;
use std::time::{Duration, Instant};

/// Represents a single entry in the store
#[derive(Debug, Clone)]
pub struct Entry {
    /// The value
    pub value: Value,

    /// Instant of the last write to this key
    pub put_at: Instant,
}

impl Entry {
    /// Create a new entry stamped with the current instant
    pub fn new(value: Value) -> Self {
        Self::at(value, Instant::now())
    }

    /// Create a new entry stamped with the given instant
    pub(crate) fn at(value: Value, put_at: Instant) -> Self {
        Entry { value, put_at }
    }

    /// Time elapsed since the last write, as seen at `now`
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.put_at)
    }

    /// Check if the entry is strictly older than `max_age` at `now`
    pub fn is_older_than(&self, max_age: Duration, now: Instant) -> bool {
        self.age(now) > max_age
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age_is_measured_from_put() {
        let start = Instant::now();
        let entry = Entry::at(Value::from(1i32), start);

        assert_eq!(entry.age(start + Duration::from_secs(3)), Duration::from_secs(3));
    }

    #[test]
    fn test_age_saturates_for_earlier_now() {
        let start = Instant::now();
        let entry = Entry::at(Value::from(1i32), start + Duration::from_secs(1));

        assert_eq!(entry.age(start), Duration::ZERO);
    }

    #[test]
    fn test_older_than_is_strict() {
        let start = Instant::now();
        let entry = Entry::at(Value::from(true), start);
        let max_age = Duration::from_millis(10);

        assert!(!entry.is_older_than(max_age, start + max_age));
        assert!(entry.is_older_than(max_age, start + max_age + Duration::from_nanos(1)));
    }
}

//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with insertion-time TTL.

// == Cache Entry ==
/// Represents a single cache entry with value and insertion time.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Insertion timestamp (Unix milliseconds)
    pub inserted_at: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry stamped with `now_ms`.
    pub fn new(value: V, now_ms: u64) -> Self {
        Self {
            value,
            inserted_at: now_ms,
        }
    }

    // == Age ==
    /// Milliseconds since insertion. A clock that went backwards reads as age zero.
    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.inserted_at)
    }

    // == Is Expired ==
    /// Checks if the entry is stale.
    ///
    /// An entry stays fresh while its age is at most `max_age_ms`; it
    /// expires only once the age strictly exceeds the limit.
    pub fn is_expired(&self, now_ms: u64, max_age_ms: u64) -> bool {
        self.age_ms(now_ms) > max_age_ms
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_creation() {
        let entry = CacheEntry::new("value", 1_000);

        assert_eq!(entry.value, "value");
        assert_eq!(entry.inserted_at, 1_000);
        assert!(!entry.is_expired(1_000, 100));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let entry = CacheEntry::new(1, 1_000);

        // Exactly max_age old is still fresh
        assert!(!entry.is_expired(1_100, 100));
        assert!(entry.is_expired(1_101, 100));
    }

    #[test]
    fn test_clock_going_backwards() {
        let entry = CacheEntry::new(1, 1_000);

        assert_eq!(entry.age_ms(500), 0);
        assert!(!entry.is_expired(500, 0));
    }
}

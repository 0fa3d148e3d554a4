//! Insertion Order Module
//!
//! Tracks key insertion order for first-in eviction.

use std::collections::VecDeque;

// == Insertion Order ==
/// Tracks the order in which keys were inserted.
///
/// Keys are stored in a VecDeque where:
/// - Front = Earliest inserted
/// - Back = Latest inserted
///
/// Reads never reorder keys; only a re-insert moves a key to the back.
#[derive(Debug, Default)]
pub struct InsertionOrder {
    order: VecDeque<String>,
}

impl InsertionOrder {
    // == Constructor ==
    /// Creates a new empty tracker.
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }

    // == Record ==
    /// Records an insertion (moves an existing key to the back).
    pub fn record(&mut self, key: &str) {
        self.remove(key);
        self.order.push_back(key.to_string());
    }

    // == Remove ==
    /// Removes a key from the tracker.
    pub fn remove(&mut self, key: &str) {
        self.order.retain(|k| k != key);
    }

    // == Pop Oldest ==
    /// Returns and removes the earliest inserted key.
    ///
    /// Returns None if tracker is empty.
    pub fn pop_oldest(&mut self) -> Option<String> {
        self.order.pop_front()
    }

    // == Clear ==
    pub fn clear(&mut self) {
        self.order.clear();
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn drain(order: &mut InsertionOrder) -> Vec<String> {
        std::iter::from_fn(|| order.pop_oldest()).collect()
    }

    #[test]
    fn test_order_new() {
        let mut order = InsertionOrder::new();
        assert_eq!(order.pop_oldest(), None);
    }

    #[test]
    fn test_record_new_keys() {
        let mut order = InsertionOrder::new();

        order.record("key1");
        order.record("key2");
        order.record("key3");

        assert_eq!(drain(&mut order), vec!["key1", "key2", "key3"]);
    }

    #[test]
    fn test_rerecord_moves_to_back() {
        let mut order = InsertionOrder::new();

        order.record("key1");
        order.record("key2");
        order.record("key3");

        // Re-inserting key1 makes key2 the oldest
        order.record("key1");

        assert_eq!(drain(&mut order), vec!["key2", "key3", "key1"]);
    }

    #[test]
    fn test_remove() {
        let mut order = InsertionOrder::new();

        order.record("key1");
        order.record("key2");
        order.record("key3");

        order.remove("key2");
        order.remove("nonexistent");

        assert_eq!(drain(&mut order), vec!["key1", "key3"]);
    }

    #[test]
    fn test_clear() {
        let mut order = InsertionOrder::new();
        order.record("a");
        order.record("b");

        order.clear();

        assert_eq!(order.pop_oldest(), None);
    }
}

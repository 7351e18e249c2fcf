//! Append-only annotation registry

/// Insertion-ordered collection keyed by dense integers starting at 1.
///
/// Entries are never removed or replaced, so a key always refers to the
/// same item and iteration order equals insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Registry<T> {
    entries: Vec<T>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item and return its key
    pub fn insert(&mut self, item: T) -> u32 {
        self.entries.push(item);
        self.entries.len() as u32
    }

    pub fn get(&self, key: u32) -> Option<&T> {
        let idx = (key as usize).checked_sub(1)?;
        self.entries.get(idx)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Key of the most recent entry
    pub fn last_key(&self) -> Option<u32> {
        if self.entries.is_empty() {
            None
        } else {
            Some(self.entries.len() as u32)
        }
    }

    /// `(key, item)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (u32, &T)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, item)| (i as u32 + 1, item))
    }

    /// Items in insertion order
    pub fn values(&self) -> std::slice::Iter<'_, T> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_keys_start_at_one() {
        let mut registry = Registry::new();
        assert_eq!(registry.last_key(), None);
        assert_eq!(registry.insert("a"), 1);
        assert_eq!(registry.insert("b"), 2);
        assert_eq!(registry.get(0), None);
        assert_eq!(registry.get(1), Some(&"a"));
        assert_eq!(registry.get(3), None);
    }

    proptest! {
        #[test]
        fn keys_are_dense_and_ordered(items in proptest::collection::vec(any::<i32>(), 0..64)) {
            let mut registry = Registry::new();
            let mut previous = 0;
            for (n, item) in items.iter().enumerate() {
                let key = registry.insert(*item);
                prop_assert_eq!(key, previous + 1);
                prop_assert_eq!(registry.len(), n + 1);
                previous = key;
            }

            let replayed: Vec<i32> = registry.values().copied().collect();
            prop_assert_eq!(&replayed, &items);

            let keys: Vec<u32> = registry.iter().map(|(k, _)| k).collect();
            let expected: Vec<u32> = (1..=items.len() as u32).collect();
            prop_assert_eq!(keys, expected);
        }
    }
}

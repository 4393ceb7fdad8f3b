//! Slot pool
//!
//! A [`SlotMap`] arena plus a free list. Slots are never removed from the
//! arena; releasing a key parks it on the free list so the next request can
//! reuse its storage.

use slotmap::{Key, SlotMap};

/// Arena of reusable slots addressed by slotmap keys
pub struct Pool<K: Key, T> {
    slots: SlotMap<K, T>,
    free: Vec<K>,
    allocations: usize,
}

impl<K: Key, T> Default for Pool<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Key, T> Pool<K, T> {
    pub fn new() -> Self {
        Self {
            slots: SlotMap::with_key(),
            free: Vec::new(),
            allocations: 0,
        }
    }

    /// Create a pool with `capacity` slots already built and parked
    pub fn with_capacity(capacity: usize, mut make: impl FnMut() -> T) -> Self {
        let mut pool = Self {
            slots: SlotMap::with_capacity_and_key(capacity),
            free: Vec::with_capacity(capacity),
            allocations: 0,
        };
        for _ in 0..capacity {
            let key = pool.slots.insert(make());
            pool.allocations += 1;
            pool.free.push(key);
        }
        pool
    }

    /// Take a slot from the free list, or build a new one with `make`
    pub fn request(&mut self, make: impl FnOnce() -> T) -> (K, &mut T) {
        let key = match self.free.pop() {
            Some(key) => key,
            None => {
                self.allocations += 1;
                tracing::debug!(allocations = self.allocations, "pool grew");
                self.slots.insert(make())
            }
        };
        (key, &mut self.slots[key])
    }

    /// Park a slot on the free list
    ///
    /// Returns false if the key does not belong to this pool.
    pub fn release(&mut self, key: K) -> bool {
        if !self.slots.contains_key(key) {
            return false;
        }
        debug_assert!(!self.free.contains(&key), "slot released twice");
        self.free.push(key);
        true
    }

    pub fn get(&self, key: K) -> Option<&T> {
        self.slots.get(key)
    }

    pub fn get_mut(&mut self, key: K) -> Option<&mut T> {
        self.slots.get_mut(key)
    }

    /// Total number of slots ever built
    pub fn allocations(&self) -> usize {
        self.allocations
    }

    /// Number of slots parked on the free list
    pub fn pooled(&self) -> usize {
        self.free.len()
    }

    /// Number of slots currently handed out
    pub fn in_use(&self) -> usize {
        self.slots.len() - self.free.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::new_key_type;

    new_key_type! {
        struct TestKey;
    }

    #[test]
    fn test_request_reuses_released_slot() {
        let mut pool: Pool<TestKey, u32> = Pool::new();
        let (a, _) = pool.request(|| 1);
        assert_eq!(pool.allocations(), 1);
        assert!(pool.release(a));
        assert_eq!(pool.pooled(), 1);

        let (b, value) = pool.request(|| 2);
        // Reused slots keep their storage
        assert_eq!(*value, 1);
        assert_eq!(a, b);
        assert_eq!(pool.allocations(), 1);
    }

    #[test]
    fn test_with_capacity_prewarms() {
        let mut pool: Pool<TestKey, u32> = Pool::with_capacity(4, || 0);
        assert_eq!(pool.allocations(), 4);
        assert_eq!(pool.pooled(), 4);
        assert_eq!(pool.in_use(), 0);

        let (key, value) = pool.request(|| 9);
        *value = 7;
        assert_eq!(pool.allocations(), 4);
        assert_eq!(pool.in_use(), 1);
        assert_eq!(pool.get(key), Some(&7));
    }

    #[test]
    fn test_release_unknown_key() {
        let mut pool: Pool<TestKey, u32> = Pool::new();
        assert!(!pool.release(TestKey::default()));
    }
}

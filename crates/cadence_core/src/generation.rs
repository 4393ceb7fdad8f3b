//! Generation ids
//!
//! Every time a pooled driver is prepared it is stamped with a fresh
//! generation. Operation handles capture the generation they were created
//! with, so a handle whose driver has since been recycled compares unequal
//! and reads as expired.

use std::cell::Cell;

/// Generation stamped on a driver at prepare time
///
/// The value `0` is reserved for slots sitting in the pool and is never
/// handed out by [`GenerationAllocator`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation(u16);

impl Generation {
    /// Generation of a driver that is not prepared
    pub const NONE: Generation = Generation(0);

    /// Raw counter value
    pub fn get(self) -> u16 {
        self.0
    }

    /// Whether this is the reserved "not prepared" generation
    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

/// Wrapping 16-bit generation counter
#[derive(Debug, Default)]
pub struct GenerationAllocator {
    last: Cell<u16>,
}

impl GenerationAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an allocator whose next id follows `last`
    pub fn starting_after(last: u16) -> Self {
        Self {
            last: Cell::new(last),
        }
    }

    /// Allocate the next generation, wrapping past `u16::MAX` back to 1
    pub fn next(&self) -> Generation {
        let mut next = self.last.get().wrapping_add(1);
        if next == 0 {
            next = 1;
        }
        self.last.set(next);
        Generation(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generations_increase() {
        let alloc = GenerationAllocator::new();
        let a = alloc.next();
        let b = alloc.next();
        assert_eq!(a.get(), 1);
        assert_eq!(b.get(), 2);
        assert_ne!(a, b);
    }

    #[test]
    fn test_wrap_skips_reserved_zero() {
        let alloc = GenerationAllocator::starting_after(u16::MAX - 1);
        assert_eq!(alloc.next().get(), u16::MAX);
        let wrapped = alloc.next();
        assert!(!wrapped.is_none());
        assert_eq!(wrapped.get(), 1);
    }
}

//! Tick registry
//!
//! Ordered set of entries that are visited once per tick. Entries may be
//! added or removed from inside a dispatch pass:
//!
//! - removals during a pass are recorded by index and applied once the pass
//!   finishes, so the walk never shifts under itself
//! - entries appended during a pass are visited later in that same pass
//! - re-adding an entry that is pending removal re-activates it in place

use std::cell::{Cell, RefCell};

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::guard::{run_guarded, ActionResult};

/// Timing information for one tick
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TickData {
    /// Wall-clock delta in seconds
    pub unscaled_delta: f32,
    /// Time-scale factor applied by the host
    pub time_scale: f32,
}

impl TickData {
    pub fn new(unscaled_delta: f32, time_scale: f32) -> Self {
        Self {
            unscaled_delta,
            time_scale,
        }
    }

    /// Delta with the time scale applied
    pub fn scaled_delta(&self) -> f32 {
        self.unscaled_delta * self.time_scale
    }
}

/// Ordered registry of tick entries
pub struct TickRegistry<T> {
    entries: RefCell<Vec<T>>,
    /// Indices into `entries` removed during the current pass
    removed: RefCell<FxHashSet<usize>>,
    dispatching: Cell<bool>,
}

impl<T> Default for TickRegistry<T> {
    fn default() -> Self {
        Self {
            entries: RefCell::new(Vec::new()),
            removed: RefCell::new(FxHashSet::default()),
            dispatching: Cell::new(false),
        }
    }
}

impl<T: Copy + PartialEq> TickRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entry
    pub fn add(&self, item: T) {
        if self.dispatching.get() {
            let entries = self.entries.borrow();
            let mut removed = self.removed.borrow_mut();
            let pending = removed.iter().copied().find(|&idx| entries[idx] == item);
            if let Some(idx) = pending {
                removed.remove(&idx);
                return;
            }
        }
        self.entries.borrow_mut().push(item);
    }

    /// Unregister an entry, returning whether it was registered
    pub fn remove(&self, item: T) -> bool {
        if self.dispatching.get() {
            let entries = self.entries.borrow();
            let mut removed = self.removed.borrow_mut();
            let live = entries
                .iter()
                .enumerate()
                .find(|(idx, entry)| **entry == item && !removed.contains(idx))
                .map(|(idx, _)| idx);
            match live {
                Some(idx) => {
                    removed.insert(idx);
                    true
                }
                None => false,
            }
        } else {
            let mut entries = self.entries.borrow_mut();
            match entries.iter().position(|entry| *entry == item) {
                Some(idx) => {
                    entries.remove(idx);
                    true
                }
                None => false,
            }
        }
    }

    /// Whether `item` is registered and not pending removal
    pub fn contains(&self, item: T) -> bool {
        let entries = self.entries.borrow();
        let removed = self.removed.borrow();
        entries
            .iter()
            .enumerate()
            .any(|(idx, entry)| *entry == item && !removed.contains(&idx))
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.entries.borrow().len() - self.removed.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_dispatching(&self) -> bool {
        self.dispatching.get()
    }

    /// Visit every live entry in registration order
    ///
    /// Each call of `f` is guarded; a failing entry is logged and the pass
    /// continues. Returns the number of entries visited. A nested dispatch
    /// from inside `f` is refused.
    pub fn dispatch(&self, mut f: impl FnMut(T) -> ActionResult) -> usize {
        if self.dispatching.replace(true) {
            tracing::warn!("nested tick dispatch ignored");
            return 0;
        }

        let mut visited = 0;
        let mut idx = 0;
        loop {
            let item = match self.entries.borrow().get(idx) {
                Some(item) => *item,
                None => break,
            };
            let live = !self.removed.borrow().contains(&idx);
            if live {
                visited += 1;
                run_guarded("tick", || f(item));
            }
            idx += 1;
        }

        self.dispatching.set(false);
        self.apply_removals();
        visited
    }

    fn apply_removals(&self) {
        let mut removed = self.removed.borrow_mut();
        if removed.is_empty() {
            return;
        }
        let mut idx = 0;
        self.entries.borrow_mut().retain(|_| {
            let keep = !removed.contains(&idx);
            idx += 1;
            keep
        });
        removed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn test_tick_data_scaling() {
        let data = TickData::new(0.5, 2.0);
        assert_eq!(data.scaled_delta(), 1.0);
    }

    #[test]
    fn test_dispatch_in_order() {
        let registry = TickRegistry::new();
        registry.add(1);
        registry.add(2);
        registry.add(3);

        let mut seen = Vec::new();
        let visited = registry.dispatch(|item| {
            seen.push(item);
            Ok(())
        });
        assert_eq!(visited, 3);
        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[test]
    fn test_remove_outside_dispatch() {
        let registry = TickRegistry::new();
        registry.add(1);
        registry.add(2);
        assert!(registry.remove(1));
        assert!(!registry.remove(1));
        assert_eq!(registry.len(), 1);
        assert!(!registry.contains(1));
    }

    #[test]
    fn test_remove_during_dispatch_is_deferred() {
        let registry = Rc::new(TickRegistry::new());
        registry.add(1);
        registry.add(2);
        registry.add(3);

        let mut seen = Vec::new();
        let inner = registry.clone();
        registry.dispatch(|item| {
            seen.push(item);
            if item == 1 {
                // Removing a later entry skips it for this pass
                assert!(inner.remove(3));
                // Removing the current entry is fine too
                assert!(inner.remove(1));
            }
            Ok(())
        });
        assert_eq!(seen, vec![1, 2]);
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(2));
    }

    #[test]
    fn test_add_during_dispatch_runs_same_pass() {
        let registry = Rc::new(TickRegistry::new());
        registry.add(1);

        let mut seen = Vec::new();
        let inner = registry.clone();
        registry.dispatch(|item| {
            seen.push(item);
            if item == 1 {
                inner.add(2);
            }
            Ok(())
        });
        assert_eq!(seen, vec![1, 2]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_readd_pending_removal_reactivates() {
        let registry = Rc::new(TickRegistry::new());
        registry.add(1);
        registry.add(2);

        let mut seen = Vec::new();
        let inner = registry.clone();
        registry.dispatch(|item| {
            seen.push(item);
            if item == 1 {
                inner.remove(2);
                inner.add(2);
            }
            Ok(())
        });
        assert_eq!(seen, vec![1, 2]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_failing_entry_does_not_stop_pass() {
        let registry = TickRegistry::new();
        registry.add(1);
        registry.add(2);

        let mut seen = Vec::new();
        registry.dispatch(|item| {
            seen.push(item);
            if item == 1 {
                anyhow::bail!("entry failed");
            }
            Ok(())
        });
        assert_eq!(seen, vec![1, 2]);
        assert!(!registry.is_dispatching());
    }

    #[test]
    fn test_nested_dispatch_refused() {
        let registry = Rc::new(TickRegistry::new());
        registry.add(1);

        let inner = registry.clone();
        let mut nested = usize::MAX;
        registry.dispatch(|_| {
            nested = inner.dispatch(|_| Ok(()));
            Ok(())
        });
        assert_eq!(nested, 0);
    }
}

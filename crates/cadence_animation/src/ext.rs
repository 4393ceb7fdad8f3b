//! Chaining helpers on [`Operation`]

use cadence_core::{Operation, Result, Scheduler};

use crate::composite::{parallel, sequence};
use crate::repeat::{repeat, repeat_forever};

/// Composite builders in method form
///
/// ```ignore
/// let pulse = grow.then(&scheduler, shrink)?.repeat_forever(&scheduler)?;
/// ```
pub trait OperationExt: Sized {
    /// Play `self`, then `next`
    fn then(self, ctx: &Scheduler, next: Operation) -> Result<Operation>;

    /// Play `self` and `other` together
    fn with(self, ctx: &Scheduler, other: Operation) -> Result<Operation>;

    fn repeat(self, ctx: &Scheduler, count: u32) -> Result<Operation>;

    fn repeat_forever(self, ctx: &Scheduler) -> Result<Operation>;
}

impl OperationExt for Operation {
    fn then(self, ctx: &Scheduler, next: Operation) -> Result<Operation> {
        sequence(ctx, [self, next])
    }

    fn with(self, ctx: &Scheduler, other: Operation) -> Result<Operation> {
        parallel(ctx, [self, other])
    }

    fn repeat(self, ctx: &Scheduler, count: u32) -> Result<Operation> {
        repeat(ctx, self, count)
    }

    fn repeat_forever(self, ctx: &Scheduler) -> Result<Operation> {
        repeat_forever(ctx, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utility::delay;

    #[test]
    fn test_chained_durations() {
        let scheduler = Scheduler::new();
        let a = delay(&scheduler, 1.0).unwrap();
        let b = delay(&scheduler, 0.5).unwrap();
        let c = delay(&scheduler, 2.0).unwrap();

        let op = a
            .then(&scheduler, b)
            .unwrap()
            .with(&scheduler, c)
            .unwrap()
            .repeat(&scheduler, 3)
            .unwrap();
        assert_eq!(op.duration(&scheduler), 6.0);
    }
}

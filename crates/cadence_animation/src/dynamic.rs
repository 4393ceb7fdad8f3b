//! Lazily built operations

use cadence_core::{ActionResult, ActionState, Operation, Result, Scheduler, TweenAction};

use crate::composite::{release_children, settle_children};

/// Factory invoked when a [`dynamic`] operation starts
pub type OperationFactory = Box<dyn FnMut(&Scheduler) -> Result<Operation>>;

/// Build the child with `factory` when the operation starts
///
/// The child's progress follows the parent's normalized time, so a child of
/// any length is stretched over `duration`. Restarting the parent releases
/// the previous child and builds a fresh one.
///
/// ```ignore
/// let follow = dynamic(&scheduler, move |ctx| {
///     let goal = *cursor.borrow();
///     to(goal).property(ctx, &sprite, POSITION, 0.3)
/// }, 0.3)?;
/// ```
pub fn dynamic(
    ctx: &Scheduler,
    factory: impl FnMut(&Scheduler) -> Result<Operation> + 'static,
    duration: f32,
) -> Result<Operation> {
    ctx.prepare(
        DynamicAction {
            factory: Box::new(factory),
            child: Operation::default(),
        },
        duration,
    )
}

/// Payload of [`dynamic`]
pub struct DynamicAction {
    factory: OperationFactory,
    child: Operation,
}

impl DynamicAction {
    /// The child built on the last start, or a default handle before that
    pub fn current(&self) -> Operation {
        self.child
    }
}

impl TweenAction for DynamicAction {
    fn start(&mut self, ctx: &Scheduler) -> ActionResult {
        if self.child.is_initialized() {
            self.child.release(ctx);
        }
        let child = (self.factory)(ctx)?;
        child.adopt(ctx);
        self.child = child;
        Ok(())
    }

    fn update(&mut self, ctx: &Scheduler, state: &ActionState) -> ActionResult {
        self.child.set_normalized_time(ctx, state.normalized_time())?;
        Ok(())
    }

    fn complete(&mut self, ctx: &Scheduler, state: &ActionState) -> ActionResult {
        settle_children(ctx, state, std::slice::from_ref(&self.child));
        Ok(())
    }

    fn pre_release(&mut self, ctx: &Scheduler) -> ActionResult {
        release_children(ctx, std::slice::from_ref(&self.child));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utility::delay;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_factory_runs_on_start() {
        let scheduler = Scheduler::new();
        let built = Rc::new(Cell::new(0));
        let counter = built.clone();
        let op = dynamic(
            &scheduler,
            move |ctx| {
                counter.set(counter.get() + 1);
                delay(ctx, 4.0)
            },
            2.0,
        )
        .unwrap();
        assert_eq!(built.get(), 0);

        scheduler.tick(0.5, 1.0);
        assert_eq!(built.get(), 1);
        let child = scheduler.inspect(op, |a: &DynamicAction| a.current()).unwrap();
        assert!(child.paused(&scheduler));
        // Half a second of two maps to a quarter of the child
        assert_eq!(child.normalized_time(&scheduler), 0.25);
        assert_eq!(child.time(&scheduler), 1.0);
    }

    #[test]
    fn test_completion_releases_child() {
        let scheduler = Scheduler::new();
        let op = dynamic(&scheduler, |ctx| delay(ctx, 1.0), 1.0).unwrap();
        scheduler.tick(0.5, 1.0);
        let child = scheduler.inspect(op, |a: &DynamicAction| a.current()).unwrap();

        scheduler.tick(0.5, 1.0);
        assert!(op.is_expired(&scheduler));
        assert!(child.is_expired(&scheduler));
        assert_eq!(scheduler.stats().active, 0);
    }

    #[test]
    fn test_restart_builds_new_child() {
        let scheduler = Scheduler::new();
        let op = dynamic(&scheduler, |ctx| delay(ctx, 1.0), 1.0).unwrap();
        op.set_auto_release(&scheduler, false);
        scheduler.tick(1.0, 1.0);
        let first = scheduler.inspect(op, |a: &DynamicAction| a.current()).unwrap();
        assert!(first.is_completed(&scheduler));

        let op = op.restart(&scheduler).unwrap();
        scheduler.tick(0.5, 1.0);
        let second = scheduler.inspect(op, |a: &DynamicAction| a.current()).unwrap();
        assert!(first.is_expired(&scheduler));
        assert_eq!(second.time(&scheduler), 0.5);
    }

    #[test]
    fn test_failing_factory_leaves_parent_running() {
        let scheduler = Scheduler::new();
        let op = dynamic(
            &scheduler,
            |_| Err(cadence_core::TweenError::invalid_argument("nothing to build")),
            1.0,
        )
        .unwrap();
        op.set_auto_release(&scheduler, false);

        scheduler.tick(0.5, 1.0);
        assert!(op.is_running(&scheduler));
        scheduler.tick(0.5, 1.0);
        assert!(op.is_completed(&scheduler));
    }
}

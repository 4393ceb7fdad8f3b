//! Small building blocks for composites

use cadence_core::{ActionResult, Idle, Operation, Result, Scheduler, TweenAction};

/// An operation that does nothing for `seconds`
pub fn delay(ctx: &Scheduler, seconds: f32) -> Result<Operation> {
    ctx.prepare(Idle, seconds)
}

/// A zero-duration operation that runs `f` when it starts
///
/// Runs again each time the operation is restarted, e.g. inside a repeat.
pub fn callback(ctx: &Scheduler, f: impl FnMut() + 'static) -> Result<Operation> {
    ctx.prepare(CallbackAction { f: Box::new(f) }, 0.0)
}

struct CallbackAction {
    f: Box<dyn FnMut()>,
}

impl TweenAction for CallbackAction {
    fn start(&mut self, _ctx: &Scheduler) -> ActionResult {
        (self.f)();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_delay_runs_for_duration() {
        let scheduler = Scheduler::new();
        let op = delay(&scheduler, 0.5).unwrap();
        scheduler.tick(0.25, 1.0);
        assert!(op.is_running(&scheduler));
        scheduler.tick(0.25, 1.0);
        assert!(op.is_expired(&scheduler));
    }

    #[test]
    fn test_callback_fires_once_on_first_tick() {
        let scheduler = Scheduler::new();
        let count = Rc::new(Cell::new(0));
        let counter = count.clone();
        let op = callback(&scheduler, move || counter.set(counter.get() + 1)).unwrap();
        assert_eq!(count.get(), 0);

        scheduler.tick(0.016, 1.0);
        scheduler.tick(0.016, 1.0);
        assert_eq!(count.get(), 1);
        assert!(op.is_expired(&scheduler));
    }
}

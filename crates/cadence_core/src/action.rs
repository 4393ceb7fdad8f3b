//! Operation payloads
//!
//! Every operation kind is a type implementing [`TweenAction`]. The scheduler
//! stores it boxed inside the driver and calls its hooks as the driver moves
//! through its lifecycle. All hooks have no-op defaults.

use std::any::Any;

use crate::driver::ActionState;
use crate::guard::ActionResult;
use crate::scheduler::Scheduler;

/// Downcasting support for boxed payloads
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Behaviour of one operation kind
///
/// Hooks may call back into the scheduler (to drive child operations, for
/// example). A hook that fails or panics is logged; a failing
/// [`update`](TweenAction::update) also cancels the operation.
///
/// # Example
///
/// ```ignore
/// struct Fade { target: Target<Sprite> }
///
/// impl TweenAction for Fade {
///     fn update(&mut self, _ctx: &Scheduler, state: &ActionState) -> ActionResult {
///         self.target.try_borrow_mut()?.alpha = state.interpolated_time();
///         Ok(())
///     }
/// }
///
/// let op = scheduler.prepare(Fade { target }, TweenOptions::new(0.3))?;
/// ```
pub trait TweenAction: AsAny {
    /// Called once, on the first tick or time change after prepare or restart
    fn start(&mut self, _ctx: &Scheduler) -> ActionResult {
        Ok(())
    }

    /// Called every time elapsed time changes
    fn update(&mut self, _ctx: &Scheduler, _state: &ActionState) -> ActionResult {
        Ok(())
    }

    /// Called once the operation succeeds or is cancelled
    fn complete(&mut self, _ctx: &Scheduler, _state: &ActionState) -> ActionResult {
        Ok(())
    }

    /// Called right before the driver goes back to the pool
    fn pre_release(&mut self, _ctx: &Scheduler) -> ActionResult {
        Ok(())
    }
}

/// Payload with no behaviour, used for plain delays
#[derive(Clone, Copy, Debug, Default)]
pub struct Idle;

impl TweenAction for Idle {}

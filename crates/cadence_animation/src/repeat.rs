//! Bounded and unbounded repetition
//!
//! Both composites reuse a single child. When the child reaches its end the
//! child is restarted in place, and a tick that jumps several iterations ahead
//! skips them in one step instead of replaying each loop.

use cadence_core::{
    ActionResult, ActionState, Operation, Result, Scheduler, TweenAction, TweenError,
};

use crate::composite::{release_children, restart_completed, settle_children};

/// Loops that fit into `local` seconds, at least one
fn loops_elapsed(local: f32, child_duration: f32) -> u32 {
    // Float to int casts saturate
    ((local / child_duration).floor() as u32).max(1)
}

// ============================================================================
// Repeat
// ============================================================================

/// Play `op` `count` times back to back
///
/// The duration saturates at `f32::MAX` for unbounded children.
pub fn repeat(ctx: &Scheduler, op: Operation, count: u32) -> Result<Operation> {
    let child_duration = op.duration(ctx);
    op.adopt(ctx);
    ctx.prepare(
        RepeatAction {
            child: op,
            child_duration,
            count,
            repeat_index: 0,
        },
        (child_duration * count as f32).min(f32::MAX),
    )
}

/// Payload of [`repeat`]
pub struct RepeatAction {
    child: Operation,
    child_duration: f32,
    count: u32,
    repeat_index: u32,
}

impl RepeatAction {
    /// Completed iterations
    pub fn repeat_index(&self) -> u32 {
        self.repeat_index
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// The child's current handle; it changes on each restart
    pub fn current(&self) -> Operation {
        self.child
    }
}

impl TweenAction for RepeatAction {
    fn start(&mut self, ctx: &Scheduler) -> ActionResult {
        self.repeat_index = 0;
        restart_completed(ctx, std::slice::from_mut(&mut self.child))
    }

    fn update(&mut self, ctx: &Scheduler, state: &ActionState) -> ActionResult {
        if self.count == 0 || self.repeat_index >= self.count {
            return Ok(());
        }
        let d = self.child_duration;
        if d <= 0.0 {
            self.child.ran_to_end(ctx);
            self.repeat_index = self.count;
            return Ok(());
        }

        let local = state.elapsed - self.repeat_index as f32 * d;
        self.child.set_time(ctx, local)?;
        if !self.child.is_completed(ctx) {
            return Ok(());
        }

        let skip = loops_elapsed(local, d).min(self.count);
        self.repeat_index = self.repeat_index.saturating_add(skip).min(self.count);
        if self.repeat_index < self.count {
            self.child = self.child.restart(ctx)?;
            self.child.set_time(ctx, local % d)?;
        }
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

// ============================================================================
// Repeat forever
// ============================================================================

/// Loop `op` until cancelled
///
/// Fails with [`TweenError::InvalidArgument`] if `op` has no length.
pub fn repeat_forever(ctx: &Scheduler, op: Operation) -> Result<Operation> {
    let child_duration = op.duration(ctx);
    if child_duration <= 0.0 {
        return Err(TweenError::invalid_argument(format!(
            "repeat_forever needs a positive child duration, got {child_duration}"
        )));
    }
    op.adopt(ctx);
    ctx.prepare(
        RepeatForeverAction {
            child: op,
            child_duration,
            repeat_index: 0,
        },
        f32::MAX,
    )
}

/// Payload of [`repeat_forever`]
pub struct RepeatForeverAction {
    child: Operation,
    child_duration: f32,
    repeat_index: u32,
}

impl RepeatForeverAction {
    pub fn repeat_index(&self) -> u32 {
        self.repeat_index
    }

    pub fn current(&self) -> Operation {
        self.child
    }
}

impl TweenAction for RepeatForeverAction {
    fn start(&mut self, ctx: &Scheduler) -> ActionResult {
        self.repeat_index = 0;
        restart_completed(ctx, std::slice::from_mut(&mut self.child))
    }

    fn update(&mut self, ctx: &Scheduler, state: &ActionState) -> ActionResult {
        let d = self.child_duration;
        let local = state.elapsed - self.repeat_index as f32 * d;
        self.child.set_time(ctx, local)?;
        if !self.child.is_completed(ctx) {
            return Ok(());
        }

        let skip = loops_elapsed(local, d);
        self.repeat_index = self.repeat_index.saturating_add(skip);
        self.child = self.child.restart(ctx)?;
        self.child.set_time(ctx, local % d)?;
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

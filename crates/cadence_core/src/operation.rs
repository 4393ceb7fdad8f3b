//! Operation handles
//!
//! An [`Operation`] is a small `Copy` reference to a pooled driver. It
//! captures the driver's generation at creation; once the driver is recycled
//! (or restarted) the handle expires. Expired and default handles read as
//! completed with zero duration and time, and every mutator on them is a
//! no-op.

use crate::completion::{TweenFuture, TweenOutcome};
use crate::driver::{Continuation, TweenStatus};
use crate::error::Result;
use crate::generation::Generation;
use crate::scheduler::{DriverKey, Scheduler};

/// Handle to a scheduled operation
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Operation {
    key: Option<DriverKey>,
    generation: Generation,
    duration: f32,
}

impl Operation {
    pub(crate) fn new(key: DriverKey, generation: Generation, duration: f32) -> Self {
        Self {
            key: Some(key),
            generation,
            duration,
        }
    }

    pub fn key(&self) -> Option<DriverKey> {
        self.key
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Live driver key, `None` if the handle is default or expired
    fn live(&self, ctx: &Scheduler) -> Option<DriverKey> {
        self.key.filter(|&key| ctx.is_live(key, self.generation))
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Created by a scheduler, as opposed to `Operation::default()`
    pub fn is_initialized(&self) -> bool {
        self.key.is_some()
    }

    /// The driver behind this handle has been recycled or restarted
    pub fn is_expired(&self, ctx: &Scheduler) -> bool {
        self.live(ctx).is_none()
    }

    /// Current status, `None` if the handle is expired
    pub fn status(&self, ctx: &Scheduler) -> Option<TweenStatus> {
        let key = self.key?;
        ctx.state_of(key, self.generation).map(|state| state.status)
    }

    /// Succeeded, cancelled, expired or never initialized
    pub fn is_completed(&self, ctx: &Scheduler) -> bool {
        self.status(ctx).map_or(true, TweenStatus::is_terminal)
    }

    pub fn is_running(&self, ctx: &Scheduler) -> bool {
        self.status(ctx) == Some(TweenStatus::Running)
    }

    pub fn is_cancelled(&self, ctx: &Scheduler) -> bool {
        self.status(ctx) == Some(TweenStatus::Cancelled)
    }

    pub fn duration(&self, ctx: &Scheduler) -> f32 {
        if self.is_expired(ctx) {
            0.0
        } else {
            self.duration
        }
    }

    /// Elapsed time in seconds
    pub fn time(&self, ctx: &Scheduler) -> f32 {
        self.key
            .and_then(|key| ctx.state_of(key, self.generation))
            .map_or(0.0, |state| state.elapsed)
    }

    /// Elapsed time over duration, clamped to `[0, 1]`
    pub fn normalized_time(&self, ctx: &Scheduler) -> f32 {
        self.key
            .and_then(|key| ctx.state_of(key, self.generation))
            .map_or(0.0, |state| state.normalized_time())
    }

    pub fn paused(&self, ctx: &Scheduler) -> bool {
        if self.is_completed(ctx) {
            return false;
        }
        self.key
            .and_then(|key| ctx.paused_of(key, self.generation))
            .unwrap_or(false)
    }

    pub fn auto_release(&self, ctx: &Scheduler) -> bool {
        self.key
            .and_then(|key| ctx.auto_release_of(key, self.generation))
            .unwrap_or(false)
    }

    // ========================================================================
    // Control
    // ========================================================================

    /// Move the operation to `time`, starting, updating and completing it
    /// as needed
    ///
    /// Fails with [`InvalidState`](crate::TweenError::InvalidState) if the operation already
    /// completed.
    pub fn set_time(&self, ctx: &Scheduler, time: f32) -> Result<()> {
        match self.live(ctx) {
            Some(key) => ctx.set_elapsed(key, self.generation, time),
            None => Ok(()),
        }
    }

    pub fn set_normalized_time(&self, ctx: &Scheduler, normalized: f32) -> Result<()> {
        self.set_time(ctx, self.duration * normalized)
    }

    /// Pause or resume ticking. Ignored once completed.
    pub fn set_paused(&self, ctx: &Scheduler, paused: bool) {
        if self.is_completed(ctx) {
            return;
        }
        if let Some(key) = self.key {
            ctx.set_paused(key, self.generation, paused);
        }
    }

    /// Advance by unscaled time, ignoring the tick's time scale
    pub fn set_ignore_time_scale(&self, ctx: &Scheduler, ignore: bool) {
        if let Some(key) = self.live(ctx) {
            ctx.set_ignore_time_scale(key, self.generation, ignore);
        }
    }

    /// Jump to the end and succeed. Ignored once completed.
    pub fn ran_to_end(&self, ctx: &Scheduler) {
        if self.is_completed(ctx) {
            return;
        }
        if let Some(key) = self.key {
            if let Err(err) = ctx.ran_to_end(key, self.generation) {
                tracing::warn!(error = %err, "ran_to_end rejected");
            }
        }
    }

    /// Cancel without a final update. Ignored once completed.
    pub fn cancel(&self, ctx: &Scheduler) {
        if self.is_completed(ctx) {
            return;
        }
        if let Some(key) = self.key {
            if let Err(err) = ctx.cancel(key, self.generation) {
                tracing::warn!(error = %err, "cancel rejected");
            }
        }
    }

    /// Future resolving when the operation completes
    ///
    /// Already completed operations give a ready future. Expired handles
    /// resolve as [`TweenOutcome::Succeeded`].
    pub fn completion(&self, ctx: &Scheduler) -> TweenFuture {
        let Some(status) = self.status(ctx) else {
            return TweenFuture::ready(TweenOutcome::Succeeded);
        };
        if status.is_terminal() {
            return TweenFuture::ready(TweenOutcome::from_status(status));
        }
        let (future, resolve) = TweenFuture::pending();
        match self.add_continuation(ctx, Box::new(resolve)) {
            Ok(()) => future,
            Err(resolve) => {
                resolve(TweenOutcome::from_status(status));
                future
            }
        }
    }

    /// Run `f` once the operation completes
    ///
    /// Called immediately if the operation already completed or the handle
    /// is expired.
    pub fn on_complete(&self, ctx: &Scheduler, f: impl FnOnce(TweenOutcome) + 'static) {
        let outcome = match self.status(ctx) {
            None => TweenOutcome::Succeeded,
            Some(status) if status.is_terminal() => TweenOutcome::from_status(status),
            Some(_) => match self.add_continuation(ctx, Box::new(f)) {
                Ok(()) => return,
                Err(f) => {
                    f(TweenOutcome::Succeeded);
                    return;
                }
            },
        };
        f(outcome);
    }

    fn add_continuation(
        &self,
        ctx: &Scheduler,
        continuation: Continuation,
    ) -> std::result::Result<(), Continuation> {
        match self.key {
            Some(key) => ctx.add_on_complete(key, self.generation, continuation),
            None => Err(continuation),
        }
    }

    /// Rewind a completed operation and return its new handle
    ///
    /// The operation must have auto-release disabled. This handle expires;
    /// use the returned one from now on. Expired handles return themselves.
    pub fn restart(&self, ctx: &Scheduler) -> Result<Operation> {
        let Some(key) = self.key else {
            return Ok(*self);
        };
        let generation = ctx.restart(key, self.generation)?;
        Ok(Operation {
            generation,
            ..*self
        })
    }

    /// Keep the driver after completion so it can be restarted or inspected
    pub fn set_auto_release(&self, ctx: &Scheduler, auto_release: bool) {
        if let Some(key) = self.key {
            ctx.set_auto_release(key, self.generation, auto_release);
        }
    }

    /// Return the driver to the pool, cancelling it first if still active
    pub fn release(&self, ctx: &Scheduler) {
        if let Some(key) = self.key {
            ctx.release(key, self.generation);
        }
    }

    /// Restart if completed, for payloads that reuse their children
    pub fn restart_if_completed(&self, ctx: &Scheduler) -> Result<Operation> {
        if self.is_initialized() && !self.is_expired(ctx) && self.is_completed(ctx) {
            self.restart(ctx)
        } else {
            Ok(*self)
        }
    }

    /// Pause and disable auto-release so a composite can drive this
    /// operation
    pub fn adopt(&self, ctx: &Scheduler) {
        self.set_auto_release(ctx, false);
        self.set_paused(ctx, true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Idle;
    use crate::error::TweenError;
    use futures::FutureExt;

    #[test]
    fn test_default_handle_reads_completed() {
        let scheduler = Scheduler::new();
        let op = Operation::default();
        assert!(!op.is_initialized());
        assert!(op.is_expired(&scheduler));
        assert!(op.is_completed(&scheduler));
        assert!(!op.is_running(&scheduler));
        assert_eq!(op.duration(&scheduler), 0.0);
        assert_eq!(op.time(&scheduler), 0.0);
        assert!(!op.paused(&scheduler));
        assert!(op.set_time(&scheduler, 1.0).is_ok());
        assert_eq!(op.restart(&scheduler).unwrap(), op);
    }

    #[test]
    fn test_stale_handle_is_inert() {
        let scheduler = Scheduler::new();
        let op = scheduler.prepare(Idle, 1.0).unwrap();
        op.ran_to_end(&scheduler);
        assert!(op.is_expired(&scheduler));

        // Reuse the slot so the stale handle points at a live driver
        let fresh = scheduler.prepare(Idle, 2.0).unwrap();
        assert_eq!(op.key(), fresh.key());

        assert!(op.is_completed(&scheduler));
        assert_eq!(op.duration(&scheduler), 0.0);
        assert_eq!(op.time(&scheduler), 0.0);
        assert_eq!(op.normalized_time(&scheduler), 0.0);
        assert!(!op.paused(&scheduler));

        assert!(op.set_time(&scheduler, 0.5).is_ok());
        op.set_paused(&scheduler, true);
        op.cancel(&scheduler);
        op.ran_to_end(&scheduler);
        op.release(&scheduler);
        op.set_auto_release(&scheduler, false);
        assert!(op.restart(&scheduler).is_ok());

        assert_eq!(fresh.status(&scheduler), Some(TweenStatus::Prepared));
        assert_eq!(fresh.time(&scheduler), 0.0);
        assert!(!fresh.paused(&scheduler));
        assert!(fresh.auto_release(&scheduler));
    }

    #[test]
    fn test_ran_to_end_from_any_active_time() {
        let scheduler = Scheduler::new();
        for start in [None, Some(0.0), Some(0.7)] {
            let op = scheduler.prepare(Idle, 2.0).unwrap();
            op.set_auto_release(&scheduler, false);
            if let Some(time) = start {
                op.set_time(&scheduler, time).unwrap();
            }
            op.ran_to_end(&scheduler);
            assert_eq!(op.time(&scheduler), 2.0);
            assert_eq!(op.status(&scheduler), Some(TweenStatus::Succeeded));
        }
    }

    #[test]
    fn test_set_time_on_completed_fails() {
        let scheduler = Scheduler::new();
        let op = scheduler.prepare(Idle, 1.0).unwrap();
        op.set_auto_release(&scheduler, false);
        op.cancel(&scheduler);
        assert!(op.is_cancelled(&scheduler));
        assert!(matches!(
            op.set_time(&scheduler, 0.5),
            Err(TweenError::InvalidState { .. })
        ));
        // Completed operations ignore cancel and ran_to_end
        op.ran_to_end(&scheduler);
        assert!(op.is_cancelled(&scheduler));
    }

    #[test]
    fn test_set_normalized_time() {
        let scheduler = Scheduler::new();
        let op = scheduler.prepare(Idle, 4.0).unwrap();
        op.set_normalized_time(&scheduler, 0.25).unwrap();
        assert_eq!(op.time(&scheduler), 1.0);
        assert_eq!(op.normalized_time(&scheduler), 0.25);
        assert!(op.is_running(&scheduler));
    }

    #[test]
    fn test_pause_and_resume() {
        let scheduler = Scheduler::new();
        let op = scheduler.prepare(Idle, 2.0).unwrap();
        scheduler.tick(0.5, 1.0);

        op.set_paused(&scheduler, true);
        assert!(op.paused(&scheduler));
        scheduler.tick(0.5, 1.0);
        scheduler.tick(0.5, 1.0);
        assert_eq!(op.time(&scheduler), 0.5);
        assert_eq!(scheduler.stats().ticking, 0);

        op.set_paused(&scheduler, false);
        scheduler.tick(0.5, 1.0);
        assert_eq!(op.time(&scheduler), 1.0);
    }

    #[test]
    fn test_completion_future() {
        let scheduler = Scheduler::new();
        let op = scheduler.prepare(Idle, 1.0).unwrap();
        let future = op.completion(&scheduler);
        assert!(future.is_pending());

        scheduler.tick(1.0, 1.0);
        assert_eq!(future.now_or_never(), Some(TweenOutcome::Succeeded));

        // Stale handle resolves immediately
        assert_eq!(
            op.completion(&scheduler).now_or_never(),
            Some(TweenOutcome::Succeeded)
        );
    }

    #[test]
    fn test_completion_of_cancelled_live_driver() {
        let scheduler = Scheduler::new();
        let op = scheduler.prepare(Idle, 1.0).unwrap();
        op.set_auto_release(&scheduler, false);
        op.cancel(&scheduler);
        assert_eq!(
            op.completion(&scheduler).now_or_never(),
            Some(TweenOutcome::Cancelled)
        );
    }

    #[test]
    fn test_on_complete_after_completion_runs_immediately() {
        let scheduler = Scheduler::new();
        let op = scheduler.prepare(Idle, 1.0).unwrap();
        op.ran_to_end(&scheduler);

        let called = std::rc::Rc::new(std::cell::Cell::new(None));
        let slot = called.clone();
        op.on_complete(&scheduler, move |outcome| slot.set(Some(outcome)));
        assert_eq!(called.get(), Some(TweenOutcome::Succeeded));
    }

    #[test]
    fn test_adopt() {
        let scheduler = Scheduler::new();
        let op = scheduler.prepare(Idle, 1.0).unwrap();
        op.adopt(&scheduler);
        assert!(op.paused(&scheduler));
        assert!(!op.auto_release(&scheduler));

        scheduler.tick(5.0, 1.0);
        assert_eq!(op.time(&scheduler), 0.0);
    }
}

//! Operation scheduler
//!
//! Owns the driver pool, the tick registry and the generation allocator for
//! one independent set of operations. The host calls [`Scheduler::tick`] once
//! per frame; every registered driver advances, updates its payload and, on
//! reaching its duration, completes, fires its continuations and goes back to
//! the pool.
//!
//! The scheduler is single-threaded. Payload hooks and continuations run
//! while no internal borrow is held, so they may freely call back into the
//! scheduler (composites drive their children this way).

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use slotmap::new_key_type;

use crate::action::TweenAction;
use crate::completion::TweenOutcome;
use crate::config::{SchedulerConfig, TweenOptions};
use crate::driver::{ActionState, Continuation, Driver, TweenStatus};
use crate::error::{Result, TweenError};
use crate::generation::{Generation, GenerationAllocator};
use crate::guard::{run_guarded, ActionResult};
use crate::operation::Operation;
use crate::pool::Pool;
use crate::ticker::{TickData, TickRegistry};

new_key_type! {
    /// Slot of a pooled driver
    pub struct DriverKey;
}

// ============================================================================
// Scheduler
// ============================================================================

struct SchedulerInner {
    drivers: RefCell<Pool<DriverKey, Driver>>,
    ticker: TickRegistry<DriverKey>,
    generations: GenerationAllocator,
    last_tick: Cell<TickData>,
    config: SchedulerConfig,
}

/// Snapshot of scheduler bookkeeping
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Driver slots ever built
    pub allocated: usize,
    /// Driver slots parked in the pool
    pub pooled: usize,
    /// Driver slots holding an operation
    pub active: usize,
    /// Drivers registered for ticking
    pub ticking: usize,
}

/// Frame-driven operation scheduler
///
/// Cheap to clone; clones share the same state. Use [`SchedulerHandle`]
/// when a payload needs to keep a reference without owning the scheduler.
///
/// ```ignore
/// let scheduler = Scheduler::new();
/// let op = scheduler.prepare(MyAction::default(), TweenOptions::new(0.5))?;
///
/// // Once per frame
/// scheduler.tick(frame_delta, 1.0);
/// ```
#[derive(Clone)]
pub struct Scheduler {
    inner: Rc<SchedulerInner>,
}

/// Weak reference to a [`Scheduler`]
///
/// Does not keep the scheduler alive.
#[derive(Clone)]
pub struct SchedulerHandle {
    inner: Weak<SchedulerInner>,
}

impl SchedulerHandle {
    pub fn upgrade(&self) -> Option<Scheduler> {
        self.inner.upgrade().map(|inner| Scheduler { inner })
    }

    /// The scheduler, or [`TweenError::SchedulerDropped`]
    pub fn scheduler(&self) -> Result<Scheduler> {
        self.upgrade().ok_or(TweenError::SchedulerDropped)
    }

    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self::with_config(SchedulerConfig::default())
    }

    pub fn with_config(config: SchedulerConfig) -> Self {
        let drivers = Pool::with_capacity(config.initial_capacity, Driver::default);
        tracing::debug!(
            initial_capacity = config.initial_capacity,
            "tween scheduler created"
        );
        Self {
            inner: Rc::new(SchedulerInner {
                drivers: RefCell::new(drivers),
                ticker: TickRegistry::new(),
                generations: GenerationAllocator::new(),
                last_tick: Cell::new(TickData::default()),
                config,
            }),
        }
    }

    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.inner.config
    }

    /// Options used by builders that are not given any
    pub fn default_options(&self) -> TweenOptions {
        self.inner.config.default_options
    }

    /// Timing of the most recent tick
    pub fn last_tick(&self) -> TickData {
        self.inner.last_tick.get()
    }

    pub fn stats(&self) -> SchedulerStats {
        let drivers = self.inner.drivers.borrow();
        SchedulerStats {
            allocated: drivers.allocations(),
            pooled: drivers.pooled(),
            active: drivers.in_use(),
            ticking: self.inner.ticker.len(),
        }
    }

    // ========================================================================
    // Prepare / tick
    // ========================================================================

    /// Start a new operation driven by `action`
    ///
    /// The operation is registered for ticking immediately and starts on the
    /// next tick or time change.
    pub fn prepare<A: TweenAction>(
        &self,
        action: A,
        options: impl Into<TweenOptions>,
    ) -> Result<Operation> {
        self.prepare_boxed(Box::new(action), options.into())
    }

    pub fn prepare_boxed(
        &self,
        action: Box<dyn TweenAction>,
        options: TweenOptions,
    ) -> Result<Operation> {
        // f32::MAX is the unbounded marker; infinity would never complete
        if !options.duration.is_finite() || options.duration < 0.0 {
            return Err(TweenError::invalid_argument(format!(
                "tween duration must be finite and non-negative, got {}",
                options.duration
            )));
        }

        let generation = self.inner.generations.next();
        let key = {
            let mut drivers = self.inner.drivers.borrow_mut();
            let (key, driver) = drivers.request(Driver::default);
            let status = driver.state.status;
            if status != TweenStatus::NotPrepared {
                drivers.release(key);
                return Err(TweenError::invalid_state("NotPrepared", status));
            }
            driver.prepare(action, &options, generation);
            key
        };
        self.register_tick(key);
        Ok(Operation::new(key, generation, options.duration))
    }

    /// Advance every registered operation
    ///
    /// Returns the number of drivers visited.
    pub fn tick(&self, unscaled_delta: f32, time_scale: f32) -> usize {
        self.tick_with(TickData::new(unscaled_delta, time_scale))
    }

    pub fn tick_with(&self, data: TickData) -> usize {
        self.inner.last_tick.set(data);
        let visited = self.inner.ticker.dispatch(|key| {
            self.tick_driver(key, data);
            Ok(())
        });
        tracing::trace!(visited, "tween tick");
        visited
    }

    fn tick_driver(&self, key: DriverKey, data: TickData) {
        let next = self.with_driver(key, |driver| {
            if driver.paused || !driver.state.status.is_active() {
                return None;
            }
            let delta = if driver.ignore_time_scale {
                data.unscaled_delta
            } else {
                data.scaled_delta()
            };
            Some((driver.generation, driver.state.elapsed + delta))
        });
        if let Some(Some((generation, elapsed))) = next {
            if let Err(err) = self.set_elapsed(key, generation, elapsed) {
                tracing::warn!(error = %err, "tick on inactive tween");
            }
        }
    }

    /// Read a payload of concrete type `A`
    ///
    /// Returns `None` if the operation is stale, its payload is not an `A`,
    /// or the payload is busy in one of its own callbacks. `f` must not call
    /// back into the scheduler.
    pub fn inspect<A: TweenAction, R>(&self, op: Operation, f: impl FnOnce(&A) -> R) -> Option<R> {
        let key = op.key()?;
        let drivers = self.inner.drivers.borrow();
        let driver = drivers.get(key)?;
        if !driver.is_live(op.generation()) {
            return None;
        }
        let action = driver.action.as_ref()?;
        (**action).as_any().downcast_ref::<A>().map(f)
    }

    // ========================================================================
    // Driver access
    // ========================================================================

    fn with_driver<R>(&self, key: DriverKey, f: impl FnOnce(&mut Driver) -> R) -> Option<R> {
        let mut drivers = self.inner.drivers.borrow_mut();
        drivers.get_mut(key).map(f)
    }

    /// Run `f` on the driver if it still carries `generation`
    fn with_live<R>(
        &self,
        key: DriverKey,
        generation: Generation,
        f: impl FnOnce(&mut Driver) -> R,
    ) -> Option<R> {
        let mut drivers = self.inner.drivers.borrow_mut();
        drivers
            .get_mut(key)
            .filter(|driver| driver.is_live(generation))
            .map(f)
    }

    pub(crate) fn state_of(&self, key: DriverKey, generation: Generation) -> Option<ActionState> {
        let drivers = self.inner.drivers.borrow();
        drivers
            .get(key)
            .filter(|driver| driver.is_live(generation))
            .map(|driver| driver.state)
    }

    pub(crate) fn is_live(&self, key: DriverKey, generation: Generation) -> bool {
        self.state_of(key, generation).is_some()
    }

    pub(crate) fn paused_of(&self, key: DriverKey, generation: Generation) -> Option<bool> {
        let drivers = self.inner.drivers.borrow();
        drivers
            .get(key)
            .filter(|driver| driver.is_live(generation))
            .map(|driver| driver.paused)
    }

    pub(crate) fn auto_release_of(&self, key: DriverKey, generation: Generation) -> Option<bool> {
        let drivers = self.inner.drivers.borrow();
        drivers
            .get(key)
            .filter(|driver| driver.is_live(generation))
            .map(|driver| driver.auto_release)
    }

    fn register_tick(&self, key: DriverKey) {
        let added = self.with_driver(key, |driver| !std::mem::replace(&mut driver.ticking, true));
        if added == Some(true) {
            self.inner.ticker.add(key);
        }
    }

    fn unregister_tick(&self, key: DriverKey) {
        let removed = self.with_driver(key, |driver| std::mem::replace(&mut driver.ticking, false));
        if removed == Some(true) {
            self.inner.ticker.remove(key);
        }
    }

    // ========================================================================
    // Payload check-out
    // ========================================================================

    /// Call a payload hook with the payload moved out of its slot
    ///
    /// Returns false if the hook failed. A hook for a payload that is already
    /// checked out (a reentrant call) is skipped.
    fn invoke_action(
        &self,
        key: DriverKey,
        generation: Generation,
        label: &'static str,
        f: impl FnOnce(&mut dyn TweenAction, &Scheduler) -> ActionResult,
    ) -> bool {
        let taken = self.with_live(key, generation, |driver| {
            if driver.checked_out {
                return Err(());
            }
            let action = driver.action.take();
            driver.checked_out = action.is_some();
            Ok(action)
        });
        let mut action = match taken {
            Some(Ok(Some(action))) => action,
            Some(Err(())) => {
                tracing::warn!(callback = label, "reentrant tween callback skipped");
                return true;
            }
            _ => return true,
        };

        let ok = run_guarded(label, || f(&mut *action, self));
        self.check_in(key, action);
        ok
    }

    fn check_in(&self, key: DriverKey, action: Box<dyn TweenAction>) {
        let deferred = self.with_driver(key, |driver| {
            driver.action = Some(action);
            driver.checked_out = false;
            let completion = std::mem::take(&mut driver.completion_deferred);
            let release = driver.completing != Some(driver.generation)
                && std::mem::take(&mut driver.release_deferred);
            (driver.generation, completion, release)
        });
        let Some((generation, completion, release)) = deferred else {
            return;
        };
        if completion {
            self.fire_on_complete(key, generation);
        }
        if release {
            self.recycle(key, generation);
        }
    }

    // ========================================================================
    // Lifecycle transitions
    // ========================================================================

    /// Set elapsed time, starting, updating and completing as needed
    pub(crate) fn set_elapsed(
        &self,
        key: DriverKey,
        generation: Generation,
        elapsed: f32,
    ) -> Result<()> {
        let Some(state) = self.state_of(key, generation) else {
            return Ok(());
        };
        match state.status {
            TweenStatus::Prepared => {
                self.start(key, generation);
                let still_running = self
                    .state_of(key, generation)
                    .is_some_and(|state| state.status == TweenStatus::Running);
                if !still_running {
                    return Ok(());
                }
            }
            TweenStatus::Running => {}
            status => return Err(TweenError::invalid_state("Prepared or Running", status)),
        }

        let Some(state) = self.with_live(key, generation, |driver| {
            driver.state.elapsed = if elapsed >= driver.state.duration {
                driver.state.duration
            } else {
                elapsed
            };
            driver.state
        }) else {
            return Ok(());
        };

        if !self.invoke_action(key, generation, "update", |action, ctx| {
            action.update(ctx, &state)
        }) {
            tracing::warn!("tween update failed, cancelling");
            return self.cancel(key, generation);
        }

        let reached_end = self.state_of(key, generation).is_some_and(|state| {
            state.status == TweenStatus::Running && state.elapsed >= state.duration
        });
        if reached_end {
            self.succeed(key, generation);
        }
        Ok(())
    }

    fn start(&self, key: DriverKey, generation: Generation) {
        self.with_live(key, generation, |driver| {
            driver.state.status = TweenStatus::Running;
        });
        self.invoke_action(key, generation, "start", |action, ctx| action.start(ctx));
    }

    /// Jump to the end: one final update at full duration, then succeed
    pub(crate) fn ran_to_end(&self, key: DriverKey, generation: Generation) -> Result<()> {
        let Some(state) = self.state_of(key, generation) else {
            return Ok(());
        };
        self.set_elapsed(key, generation, state.duration)
    }

    /// Cancel without a final update
    pub(crate) fn cancel(&self, key: DriverKey, generation: Generation) -> Result<()> {
        let Some(status) = self.with_live(key, generation, |driver| {
            let status = driver.state.status;
            if status.is_active() {
                driver.state.status = TweenStatus::Cancelled;
            }
            status
        }) else {
            return Ok(());
        };
        if !status.is_active() {
            return Err(TweenError::invalid_state("Prepared or Running", status));
        }
        self.fire_on_complete(key, generation);
        Ok(())
    }

    fn succeed(&self, key: DriverKey, generation: Generation) {
        self.with_live(key, generation, |driver| {
            driver.state.status = TweenStatus::Succeeded;
        });
        self.fire_on_complete(key, generation);
    }

    /// Completion path: unregister, `complete` hook, continuations, recycle
    fn fire_on_complete(&self, key: DriverKey, generation: Generation) {
        let ready = self.with_live(key, generation, |driver| {
            if !driver.state.status.is_terminal() || driver.completing == Some(generation) {
                return None;
            }
            if driver.checked_out {
                driver.completion_deferred = true;
                return None;
            }
            driver.completing = Some(generation);
            Some((driver.state, std::mem::take(&mut driver.continuations)))
        });
        let Some(Some((state, continuations))) = ready else {
            return;
        };

        self.unregister_tick(key);
        self.invoke_action(key, generation, "complete", |action, ctx| {
            action.complete(ctx, &state)
        });

        let outcome = TweenOutcome::from_status(state.status);
        for continuation in continuations {
            run_guarded("continuation", || {
                continuation(outcome);
                Ok(())
            });
        }

        // A restart from a continuation moves the driver to a new generation,
        // which then owns the slot.
        let recycle = self.with_driver(key, |driver| {
            if driver.completing == Some(generation) {
                driver.completing = None;
            }
            driver.is_live(generation)
                && (driver.auto_release || std::mem::take(&mut driver.release_deferred))
        });
        if recycle == Some(true) {
            self.recycle(key, generation);
        }
    }

    /// `pre_release` hook, then back to the pool
    fn recycle(&self, key: DriverKey, generation: Generation) {
        let proceed = self.with_live(key, generation, |driver| {
            if driver.checked_out || driver.completing == Some(generation) {
                driver.release_deferred = true;
                false
            } else {
                true
            }
        });
        if proceed != Some(true) {
            return;
        }

        self.unregister_tick(key);
        self.invoke_action(key, generation, "pre_release", |action, ctx| {
            action.pre_release(ctx)
        });

        let payload = {
            let mut drivers = self.inner.drivers.borrow_mut();
            let payload = match drivers.get_mut(key) {
                Some(driver) if driver.is_live(generation) && !driver.checked_out => {
                    driver.recycle()
                }
                _ => return,
            };
            drivers.release(key);
            payload
        };
        // Dropped outside the borrow; payload destructors may touch the scheduler
        drop(payload);
    }

    /// Release an operation: cancel if still active, then recycle
    pub(crate) fn release(&self, key: DriverKey, generation: Generation) {
        let Some(status) = self.with_live(key, generation, |driver| {
            driver.auto_release = true;
            driver.state.status
        }) else {
            return;
        };
        if status.is_active() {
            // Cancelling with auto-release on recycles through the completion path
            if let Err(err) = self.cancel(key, generation) {
                tracing::warn!(error = %err, "release could not cancel tween");
            }
        } else {
            self.recycle(key, generation);
        }
    }

    /// Rewind a terminal, non-auto-release operation under a new generation
    pub(crate) fn restart(&self, key: DriverKey, generation: Generation) -> Result<Generation> {
        let restarted = self.with_live(key, generation, |driver| {
            let status = driver.state.status;
            if !status.is_terminal() {
                return Err(TweenError::invalid_state("Succeeded or Cancelled", status));
            }
            if driver.auto_release {
                return Err(TweenError::invalid_state(
                    "a completed tween with auto-release disabled",
                    status,
                ));
            }
            let next = self.inner.generations.next();
            driver.state.elapsed = 0.0;
            driver.state.status = TweenStatus::Prepared;
            driver.generation = next;
            driver.release_deferred = false;
            Ok((next, !driver.paused))
        });
        match restarted {
            Some(Ok((next, tick))) => {
                if tick {
                    self.register_tick(key);
                }
                Ok(next)
            }
            Some(Err(err)) => Err(err),
            None => Ok(generation),
        }
    }

    pub(crate) fn set_paused(&self, key: DriverKey, generation: Generation, paused: bool) {
        let Some(status) = self.with_live(key, generation, |driver| {
            driver.paused = paused;
            driver.state.status
        }) else {
            return;
        };
        if paused {
            self.unregister_tick(key);
        } else if status.is_active() {
            self.register_tick(key);
        }
    }

    pub(crate) fn set_auto_release(&self, key: DriverKey, generation: Generation, auto: bool) {
        self.with_live(key, generation, |driver| driver.auto_release = auto);
    }

    pub(crate) fn set_ignore_time_scale(&self, key: DriverKey, generation: Generation, ignore: bool) {
        self.with_live(key, generation, |driver| driver.ignore_time_scale = ignore);
    }

    /// Register a continuation for a non-terminal operation
    pub(crate) fn add_on_complete(
        &self,
        key: DriverKey,
        generation: Generation,
        continuation: Continuation,
    ) -> std::result::Result<(), Continuation> {
        let mut continuation = Some(continuation);
        self.with_live(key, generation, |driver| {
            if !driver.state.status.is_terminal() {
                driver.continuations.extend(continuation.take());
            }
        });
        match continuation {
            None => Ok(()),
            Some(continuation) => Err(continuation),
        }
    }
}

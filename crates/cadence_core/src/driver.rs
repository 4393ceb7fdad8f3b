//! Driver state
//!
//! A driver owns one operation's timing, payload and lifecycle flags. It is
//! plain data; the transitions live on [`Scheduler`](crate::Scheduler) so a
//! driver is never borrowed while user code runs.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::action::TweenAction;
use crate::completion::TweenOutcome;
use crate::config::TweenOptions;
use crate::easing::Easing;
use crate::generation::Generation;

/// Lifecycle of an operation
///
/// `NotPrepared → Prepared → Running → {Succeeded | Cancelled}`. Terminal
/// drivers go back to `NotPrepared` only when their slot is recycled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TweenStatus {
    #[default]
    NotPrepared,
    Prepared,
    Running,
    Succeeded,
    Cancelled,
}

impl TweenStatus {
    /// Prepared or running
    pub fn is_active(self) -> bool {
        matches!(self, TweenStatus::Prepared | TweenStatus::Running)
    }

    /// Succeeded or cancelled
    pub fn is_terminal(self) -> bool {
        matches!(self, TweenStatus::Succeeded | TweenStatus::Cancelled)
    }
}

/// Timing snapshot handed to payload callbacks
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActionState {
    pub duration: f32,
    pub ease: Easing,
    pub elapsed: f32,
    pub status: TweenStatus,
}

impl Default for ActionState {
    fn default() -> Self {
        Self {
            duration: 0.0,
            ease: Easing::Linear,
            elapsed: 0.0,
            status: TweenStatus::NotPrepared,
        }
    }
}

impl ActionState {
    /// `elapsed / duration` clamped to `[0, 1]`
    ///
    /// A zero-length operation is always at its end.
    pub fn normalized_time(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    /// Normalized time with the easing applied
    pub fn interpolated_time(&self) -> f32 {
        self.ease.apply(self.normalized_time())
    }

    pub fn is_completed(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Completion continuation
pub type Continuation = Box<dyn FnOnce(TweenOutcome)>;

pub(crate) struct Driver {
    pub state: ActionState,
    pub action: Option<Box<dyn TweenAction>>,
    pub generation: Generation,
    pub paused: bool,
    pub auto_release: bool,
    pub ignore_time_scale: bool,
    pub continuations: SmallVec<[Continuation; 2]>,
    /// Registered with the tick registry
    pub ticking: bool,
    /// Payload is out of its slot while a callback runs
    pub checked_out: bool,
    /// Generation whose completion path is currently running
    pub completing: Option<Generation>,
    pub completion_deferred: bool,
    pub release_deferred: bool,
}

impl Default for Driver {
    fn default() -> Self {
        Self {
            state: ActionState::default(),
            action: None,
            generation: Generation::NONE,
            paused: false,
            auto_release: true,
            ignore_time_scale: false,
            continuations: SmallVec::new(),
            ticking: false,
            checked_out: false,
            completing: None,
            completion_deferred: false,
            release_deferred: false,
        }
    }
}

impl Driver {
    /// Stamp a pooled driver for a new operation
    pub fn prepare(
        &mut self,
        action: Box<dyn TweenAction>,
        options: &TweenOptions,
        generation: Generation,
    ) {
        self.state = ActionState {
            duration: options.duration,
            ease: options.ease,
            elapsed: 0.0,
            status: TweenStatus::Prepared,
        };
        self.action = Some(action);
        self.generation = generation;
        self.paused = false;
        self.auto_release = true;
        self.ignore_time_scale = options.ignore_time_scale;
    }

    /// Reset to the pooled state, handing back the payload to drop
    pub fn recycle(&mut self) -> Option<Box<dyn TweenAction>> {
        let action = self.action.take();
        self.state = ActionState::default();
        self.generation = Generation::NONE;
        self.paused = false;
        self.auto_release = true;
        self.ignore_time_scale = false;
        self.continuations.clear();
        self.completing = None;
        self.completion_deferred = false;
        self.release_deferred = false;
        action
    }

    pub fn is_live(&self, generation: Generation) -> bool {
        !generation.is_none() && self.generation == generation
    }
}

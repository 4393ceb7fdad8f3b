//! Cadence Core Runtime
//!
//! The scheduling core of the Cadence tween library:
//!
//! - **Drivers**: pooled, generation-tagged state machines, one per
//!   operation, moving through `Prepared → Running → Succeeded | Cancelled`
//! - **Operations**: `Copy` handles that expire when their driver is recycled
//! - **Tick dispatch**: a reentrant-safe registry visited once per frame
//! - **Completion**: futures and continuations resolved when an operation
//!   finishes
//!
//! Value tweens and composite operations live in `cadence_animation`, built
//! on [`TweenAction`] payloads.
//!
//! # Example
//!
//! ```ignore
//! use cadence_core::{Scheduler, TweenOptions, Easing, Idle};
//!
//! let scheduler = Scheduler::new();
//! let op = scheduler.prepare(Idle, TweenOptions::new(0.5).with_ease(Easing::OutQuad))?;
//! let done = op.completion(&scheduler);
//!
//! while done.is_pending() {
//!     scheduler.tick(1.0 / 60.0, 1.0);
//! }
//! ```

pub mod action;
pub mod completion;
pub mod config;
pub mod driver;
pub mod easing;
pub mod error;
pub mod generation;
pub mod guard;
pub mod operation;
pub mod pool;
pub mod scheduler;
pub mod ticker;

pub use action::{AsAny, Idle, TweenAction};
pub use completion::{CompletionStatus, TweenFuture, TweenOutcome};
pub use config::{SchedulerConfig, TweenOptions, DEFAULT_DURATION};
pub use driver::{ActionState, Continuation, TweenStatus};
pub use easing::Easing;
pub use error::{Result, TweenError};
pub use generation::{Generation, GenerationAllocator};
pub use guard::{run_guarded, ActionResult};
pub use operation::Operation;
pub use pool::Pool;
pub use scheduler::{DriverKey, Scheduler, SchedulerHandle, SchedulerStats};
pub use ticker::{TickData, TickRegistry};

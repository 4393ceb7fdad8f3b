//! Cadence Animation
//!
//! Tweens and composite operations on top of the `cadence_core` scheduler.
//!
//! # Features
//!
//! - **Value Tweens**: `to`, `from`, `by`, `range` and multi-point `values`
//!   over any [`Interpolate`] type
//! - **Property Accessors**: typed get/set pairs into shared targets, plus
//!   derived ones for single components, orbit angles and distances
//! - **Composites**: `sequence`, `parallel`, `repeat`, `repeat_forever` and
//!   lazily built `dynamic` operations
//! - **Fast-forward**: a large tick skips whole repeat iterations in one step
//! - **Math Types**: `Vec2`/`Vec3`/`Vec4`, `Color` and `Quat` values
//!
//! # Example
//!
//! ```ignore
//! use cadence_animation::*;
//! use cadence_core::Scheduler;
//!
//! const ALPHA: Property<Sprite, f32> = Property::new(|s| s.alpha, |s, v| s.alpha = v);
//!
//! let scheduler = Scheduler::new();
//! let sprite = target(Sprite::default());
//!
//! let blink = sequence(&scheduler, [
//!     to(0.0).property(&scheduler, &sprite, ALPHA, 0.25)?,
//!     to(1.0).property(&scheduler, &sprite, ALPHA, 0.25)?,
//! ])?
//! .repeat(&scheduler, 3)?;
//!
//! blink.completion(&scheduler).await;
//! ```

pub mod composite;
pub mod derived;
pub mod dynamic;
pub mod ext;
pub mod math;
pub mod property;
pub mod repeat;
pub mod tween;
pub mod utility;
pub mod values;

pub use composite::{parallel, sequence, Children, ParallelAction, SequenceAction};
pub use derived::{component, degrees_around, distance_to, Component, DegreesAround, DistanceTo};
pub use dynamic::{dynamic, DynamicAction, OperationFactory};
pub use ext::OperationExt;
pub use math::{Color, Quat, Vec2, Vec3, Vec4};
pub use property::{accessor, target, Accessor, Binding, Property, PropertyAccessor, Target};
pub use repeat::{repeat, repeat_forever, RepeatAction, RepeatForeverAction};
pub use tween::{by, from, range, to, values, ByTween, FromTween, RangeTween, ToTween, ValueSequence};
pub use utility::{callback, delay};
pub use values::{Distance, Interpolate};

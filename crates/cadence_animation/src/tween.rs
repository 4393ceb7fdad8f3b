//! Value tweens
//!
//! Builders that interpolate a property of a shared target:
//!
//! - [`to`] - from the value found at start to a fixed destination
//! - [`from`] - from a fixed value back to the value found at start
//! - [`by`] - from the value found at start to that value plus a delta
//! - [`range`] - between two fixed values, into a property or a callback
//! - [`values`] - through several points, paced by distance
//!
//! # Example
//!
//! ```ignore
//! const X: Property<Node, f32> = Property::new(|n| n.x, |n, v| n.x = v);
//!
//! let node = target(Node::default());
//! let op = to(100.0).property(&scheduler, &node, X, TweenOptions::new(0.5))?;
//! ```

use cadence_core::{
    ActionResult, ActionState, Operation, Result, Scheduler, TweenAction, TweenError,
    TweenOptions,
};

use crate::property::{Binding, PropertyAccessor, Target};
use crate::values::{Distance, Interpolate};

// ============================================================================
// To
// ============================================================================

/// Tween towards a fixed value
#[derive(Clone, Debug)]
pub struct ToTween<V> {
    value: V,
}

pub fn to<V: Interpolate>(value: V) -> ToTween<V> {
    ToTween { value }
}

impl<V: Interpolate> ToTween<V> {
    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn property<T, P>(
        &self,
        ctx: &Scheduler,
        target: &Target<T>,
        accessor: P,
        options: impl Into<TweenOptions>,
    ) -> Result<Operation>
    where
        T: 'static,
        P: PropertyAccessor<T, Value = V>,
    {
        let action = ToAction {
            binding: Binding::new(target, accessor),
            from: None,
            to: self.value.clone(),
        };
        ctx.prepare(action, options)
    }

    /// Tween with the scheduler's default options
    pub fn property_default<T, P>(
        &self,
        ctx: &Scheduler,
        target: &Target<T>,
        accessor: P,
    ) -> Result<Operation>
    where
        T: 'static,
        P: PropertyAccessor<T, Value = V>,
    {
        self.property(ctx, target, accessor, ctx.default_options())
    }
}

struct ToAction<T, P: PropertyAccessor<T>> {
    binding: Binding<T, P>,
    from: Option<P::Value>,
    to: P::Value,
}

impl<T: 'static, P: PropertyAccessor<T>> TweenAction for ToAction<T, P> {
    fn start(&mut self, _ctx: &Scheduler) -> ActionResult {
        self.from = Some(self.binding.get()?);
        Ok(())
    }

    fn update(&mut self, _ctx: &Scheduler, state: &ActionState) -> ActionResult {
        let from = match &self.from {
            Some(from) => from.clone(),
            None => self.binding.get()?,
        };
        self.binding
            .set(from.lerp(&self.to, state.interpolated_time()))
    }
}

// ============================================================================
// From
// ============================================================================

/// Tween from a fixed value back to the current one
#[derive(Clone, Debug)]
pub struct FromTween<V> {
    value: V,
}

pub fn from<V: Interpolate>(value: V) -> FromTween<V> {
    FromTween { value }
}

impl<V: Interpolate> FromTween<V> {
    pub fn value(&self) -> &V {
        &self.value
    }

    /// The property jumps to the start value as soon as the tween starts
    pub fn property<T, P>(
        &self,
        ctx: &Scheduler,
        target: &Target<T>,
        accessor: P,
        options: impl Into<TweenOptions>,
    ) -> Result<Operation>
    where
        T: 'static,
        P: PropertyAccessor<T, Value = V>,
    {
        let action = FromAction {
            binding: Binding::new(target, accessor),
            from: self.value.clone(),
            to: None,
        };
        ctx.prepare(action, options)
    }

    pub fn property_default<T, P>(
        &self,
        ctx: &Scheduler,
        target: &Target<T>,
        accessor: P,
    ) -> Result<Operation>
    where
        T: 'static,
        P: PropertyAccessor<T, Value = V>,
    {
        self.property(ctx, target, accessor, ctx.default_options())
    }
}

struct FromAction<T, P: PropertyAccessor<T>> {
    binding: Binding<T, P>,
    from: P::Value,
    to: Option<P::Value>,
}

impl<T: 'static, P: PropertyAccessor<T>> TweenAction for FromAction<T, P> {
    fn start(&mut self, _ctx: &Scheduler) -> ActionResult {
        self.to = Some(self.binding.get()?);
        self.binding.set(self.from.clone())
    }

    fn update(&mut self, _ctx: &Scheduler, state: &ActionState) -> ActionResult {
        let Some(to) = &self.to else {
            anyhow::bail!("from-tween destination was never captured");
        };
        self.binding
            .set(self.from.lerp(to, state.interpolated_time()))
    }
}

// ============================================================================
// By
// ============================================================================

/// Tween the current value by a relative delta
#[derive(Clone, Debug)]
pub struct ByTween<V> {
    delta: V,
}

pub fn by<V: Interpolate>(delta: V) -> ByTween<V> {
    ByTween { delta }
}

impl<V: Interpolate> ByTween<V> {
    pub fn delta(&self) -> &V {
        &self.delta
    }

    pub fn property<T, P>(
        &self,
        ctx: &Scheduler,
        target: &Target<T>,
        accessor: P,
        options: impl Into<TweenOptions>,
    ) -> Result<Operation>
    where
        T: 'static,
        P: PropertyAccessor<T, Value = V>,
    {
        let action = ByAction {
            binding: Binding::new(target, accessor),
            delta: self.delta.clone(),
            endpoints: None,
        };
        ctx.prepare(action, options)
    }

    pub fn property_default<T, P>(
        &self,
        ctx: &Scheduler,
        target: &Target<T>,
        accessor: P,
    ) -> Result<Operation>
    where
        T: 'static,
        P: PropertyAccessor<T, Value = V>,
    {
        self.property(ctx, target, accessor, ctx.default_options())
    }
}

struct ByAction<T, P: PropertyAccessor<T>> {
    binding: Binding<T, P>,
    delta: P::Value,
    endpoints: Option<(P::Value, P::Value)>,
}

impl<T: 'static, P: PropertyAccessor<T>> TweenAction for ByAction<T, P> {
    fn start(&mut self, _ctx: &Scheduler) -> ActionResult {
        let from = self.binding.get()?;
        let to = from.add(&self.delta);
        self.endpoints = Some((from, to));
        Ok(())
    }

    fn update(&mut self, _ctx: &Scheduler, state: &ActionState) -> ActionResult {
        let Some((from, to)) = &self.endpoints else {
            anyhow::bail!("by-tween start value was never captured");
        };
        self.binding.set(from.lerp(to, state.interpolated_time()))
    }
}

// ============================================================================
// Range
// ============================================================================

/// Tween between two fixed values
#[derive(Clone, Debug)]
pub struct RangeTween<V> {
    from: V,
    to: V,
}

pub fn range<V: Interpolate>(from: V, to: V) -> RangeTween<V> {
    RangeTween { from, to }
}

impl<V: Interpolate> RangeTween<V> {
    pub fn from(&self) -> &V {
        &self.from
    }

    pub fn to(&self) -> &V {
        &self.to
    }

    pub fn property<T, P>(
        &self,
        ctx: &Scheduler,
        target: &Target<T>,
        accessor: P,
        options: impl Into<TweenOptions>,
    ) -> Result<Operation>
    where
        T: 'static,
        P: PropertyAccessor<T, Value = V>,
    {
        let binding = Binding::new(target, accessor);
        self.action(ctx, move |value| binding.set(value), options)
    }

    /// Feed every interpolated value to `on_update`
    ///
    /// ```ignore
    /// range(0.0, 1.0).action(&scheduler, |v| { volume.set(v); Ok(()) }, 2.0)?;
    /// ```
    pub fn action<F>(
        &self,
        ctx: &Scheduler,
        on_update: F,
        options: impl Into<TweenOptions>,
    ) -> Result<Operation>
    where
        F: FnMut(V) -> ActionResult + 'static,
    {
        let action = RangeAction {
            from: self.from.clone(),
            to: self.to.clone(),
            on_update,
        };
        ctx.prepare(action, options)
    }
}

struct RangeAction<V, F> {
    from: V,
    to: V,
    on_update: F,
}

impl<V, F> TweenAction for RangeAction<V, F>
where
    V: Interpolate,
    F: FnMut(V) -> ActionResult + 'static,
{
    fn update(&mut self, _ctx: &Scheduler, state: &ActionState) -> ActionResult {
        (self.on_update)(self.from.lerp(&self.to, state.interpolated_time()))
    }
}

// ============================================================================
// Value sequence
// ============================================================================

/// Tween through several values
///
/// Progress is spread by distance, so equal time covers equal ground
/// regardless of how the points are spaced.
#[derive(Clone, Debug)]
pub struct ValueSequence<V> {
    points: Vec<V>,
}

/// Build a value sequence; at least two points are required
pub fn values<V: Distance>(points: impl IntoIterator<Item = V>) -> Result<ValueSequence<V>> {
    let points: Vec<V> = points.into_iter().collect();
    if points.len() < 2 {
        return Err(TweenError::invalid_argument(format!(
            "value sequence needs at least two points, got {}",
            points.len()
        )));
    }
    Ok(ValueSequence { points })
}

impl<V: Distance> ValueSequence<V> {
    pub fn points(&self) -> &[V] {
        &self.points
    }

    pub fn property<T, P>(
        &self,
        ctx: &Scheduler,
        target: &Target<T>,
        accessor: P,
        options: impl Into<TweenOptions>,
    ) -> Result<Operation>
    where
        T: 'static,
        P: PropertyAccessor<T, Value = V>,
    {
        let action = SequenceOfValuesAction {
            binding: Binding::new(target, accessor),
            points: self.points.clone(),
            segment: Segment::default(),
            total: 0.0,
        };
        ctx.prepare(action, options)
    }

    pub fn property_default<T, P>(
        &self,
        ctx: &Scheduler,
        target: &Target<T>,
        accessor: P,
    ) -> Result<Operation>
    where
        T: 'static,
        P: PropertyAccessor<T, Value = V>,
    {
        self.property(ctx, target, accessor, ctx.default_options())
    }
}

/// Current segment `points[index]..points[index + 1]` and its distance span
#[derive(Clone, Copy, Debug, Default)]
struct Segment {
    index: usize,
    start: f32,
    end: f32,
}

struct SequenceOfValuesAction<T, P: PropertyAccessor<T>> {
    binding: Binding<T, P>,
    points: Vec<P::Value>,
    segment: Segment,
    total: f32,
}

impl<T, P> SequenceOfValuesAction<T, P>
where
    P: PropertyAccessor<T>,
    P::Value: Distance,
{
    fn segment_length(&self, index: usize) -> f32 {
        self.points[index].distance(&self.points[index + 1])
    }

    fn next_segment(&mut self) -> bool {
        if self.segment.index + 2 >= self.points.len() {
            return false;
        }
        self.segment.index += 1;
        self.segment.start = self.segment.end;
        self.segment.end = self.segment.start + self.segment_length(self.segment.index);
        true
    }

    fn previous_segment(&mut self) -> bool {
        if self.segment.index == 0 {
            return false;
        }
        self.segment.index -= 1;
        self.segment.end = self.segment.start;
        self.segment.start = self.segment.end - self.segment_length(self.segment.index);
        true
    }
}

impl<T: 'static, P> TweenAction for SequenceOfValuesAction<T, P>
where
    P: PropertyAccessor<T>,
    P::Value: Distance,
{
    fn start(&mut self, _ctx: &Scheduler) -> ActionResult {
        self.segment = Segment {
            index: 0,
            start: 0.0,
            end: self.segment_length(0),
        };
        self.total = (0..self.points.len() - 1)
            .map(|index| self.segment_length(index))
            .sum();
        Ok(())
    }

    fn update(&mut self, _ctx: &Scheduler, state: &ActionState) -> ActionResult {
        let target = self.total * state.interpolated_time();
        while target > self.segment.end && self.next_segment() {}
        while target < self.segment.start && self.previous_segment() {}

        let span = self.segment.end - self.segment.start;
        let t = if span > 0.0 {
            (target - self.segment.start) / span
        } else {
            1.0
        };
        let index = self.segment.index;
        let value = self.points[index].lerp(&self.points[index + 1], t);
        self.binding.set(value)
    }
}

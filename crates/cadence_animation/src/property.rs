//! Property accessors
//!
//! Value tweens write into a shared target through an accessor. The target
//! is a [`Target`] (`Rc<RefCell<T>>`) so the embedding code keeps ownership;
//! a target that is already borrowed when a tween updates makes that update
//! fail, which cancels the tween.

use std::cell::RefCell;
use std::marker::PhantomData;
use std::rc::Rc;

use anyhow::Context;

use crate::values::Interpolate;

/// Shared, mutable tween target
pub type Target<T> = Rc<RefCell<T>>;

/// Wrap a value as a tween target
pub fn target<T>(value: T) -> Target<T> {
    Rc::new(RefCell::new(value))
}

/// Reads and writes one value on a target of type `T`
pub trait PropertyAccessor<T>: 'static {
    type Value: Interpolate;

    fn get(&self, target: &T) -> Self::Value;
    fn set(&self, target: &mut T, value: Self::Value);
}

/// Accessor built from a pair of function pointers
///
/// Usable in `const` items:
///
/// ```ignore
/// const OPACITY: Property<Sprite, f32> =
///     Property::new(|s| s.opacity, |s, v| s.opacity = v);
/// ```
pub struct Property<T, V> {
    get: fn(&T) -> V,
    set: fn(&mut T, V),
}

impl<T, V> Property<T, V> {
    pub const fn new(get: fn(&T) -> V, set: fn(&mut T, V)) -> Self {
        Self { get, set }
    }
}

impl<T, V> Clone for Property<T, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, V> Copy for Property<T, V> {}

impl<T: 'static, V: Interpolate> PropertyAccessor<T> for Property<T, V> {
    type Value = V;

    fn get(&self, target: &T) -> V {
        (self.get)(target)
    }

    fn set(&self, target: &mut T, value: V) {
        (self.set)(target, value)
    }
}

/// Accessor built from a pair of closures
pub struct Accessor<T, V, G, S> {
    get: G,
    set: S,
    _marker: PhantomData<fn(&mut T, V)>,
}

/// Build an accessor from closures
pub fn accessor<T, V, G, S>(get: G, set: S) -> Accessor<T, V, G, S>
where
    G: Fn(&T) -> V + 'static,
    S: Fn(&mut T, V) + 'static,
{
    Accessor {
        get,
        set,
        _marker: PhantomData,
    }
}

impl<T, V, G, S> PropertyAccessor<T> for Accessor<T, V, G, S>
where
    T: 'static,
    V: Interpolate,
    G: Fn(&T) -> V + 'static,
    S: Fn(&mut T, V) + 'static,
{
    type Value = V;

    fn get(&self, target: &T) -> V {
        (self.get)(target)
    }

    fn set(&self, target: &mut T, value: V) {
        (self.set)(target, value)
    }
}

/// A target paired with one of its properties
pub struct Binding<T, P> {
    target: Target<T>,
    accessor: P,
}

impl<T: 'static, P: PropertyAccessor<T>> Binding<T, P> {
    pub fn new(target: &Target<T>, accessor: P) -> Self {
        Self {
            target: target.clone(),
            accessor,
        }
    }

    pub fn get(&self) -> anyhow::Result<P::Value> {
        let target = self
            .target
            .try_borrow()
            .context("tween target is mutably borrowed")?;
        Ok(self.accessor.get(&target))
    }

    pub fn set(&self, value: P::Value) -> anyhow::Result<()> {
        let mut target = self
            .target
            .try_borrow_mut()
            .context("tween target is already borrowed")?;
        self.accessor.set(&mut target, value);
        Ok(())
    }
}

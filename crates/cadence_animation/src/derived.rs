//! Derived property accessors
//!
//! Accessors built on top of other accessors: a single component of a vector
//! or color property, an angle around a center point, and the distance to a
//! reference target. Each one is itself a [`PropertyAccessor`], so it plugs
//! into every tween builder.
//!
//! ```ignore
//! use cadence_animation::derived::{component, vec3};
//!
//! // Lift only the height of a node, leaving x and z alone
//! to(2.0).property(&scheduler, &node, component(POSITION, vec3::Y), 0.5)?;
//! ```

use crate::math::Vec2;
use crate::property::{PropertyAccessor, Target};
use crate::values::{Distance, Interpolate};

// ============================================================================
// Components
// ============================================================================

/// One part of the value read by `parent`
///
/// Setting reads the whole parent value, replaces the part and writes the
/// parent value back.
#[derive(Clone, Copy)]
pub struct Component<P, Q> {
    parent: P,
    part: Q,
}

/// Narrow `parent` down to `part`
pub fn component<P, Q>(parent: P, part: Q) -> Component<P, Q> {
    Component { parent, part }
}

impl<T, P, Q> PropertyAccessor<T> for Component<P, Q>
where
    T: 'static,
    P: PropertyAccessor<T>,
    Q: PropertyAccessor<P::Value>,
{
    type Value = Q::Value;

    fn get(&self, target: &T) -> Q::Value {
        self.part.get(&self.parent.get(target))
    }

    fn set(&self, target: &mut T, value: Q::Value) {
        let mut whole = self.parent.get(target);
        self.part.set(&mut whole, value);
        self.parent.set(target, whole);
    }
}

/// Parts of a [`Vec2`]
pub mod vec2 {
    use crate::math::Vec2;
    use crate::property::Property;

    pub const X: Property<Vec2, f32> = Property::new(|v| v.x, |v, x| v.x = x);
    pub const Y: Property<Vec2, f32> = Property::new(|v| v.y, |v, y| v.y = y);
}

/// Parts of a [`Vec3`](crate::math::Vec3)
pub mod vec3 {
    use crate::math::{Vec2, Vec3};
    use crate::property::Property;

    pub const X: Property<Vec3, f32> = Property::new(|v| v.x, |v, x| v.x = x);
    pub const Y: Property<Vec3, f32> = Property::new(|v| v.y, |v, y| v.y = y);
    pub const Z: Property<Vec3, f32> = Property::new(|v| v.z, |v, z| v.z = z);

    pub const XY: Property<Vec3, Vec2> = Property::new(
        |v| Vec2::new(v.x, v.y),
        |v, p| {
            v.x = p.x;
            v.y = p.y;
        },
    );

    pub const YZ: Property<Vec3, Vec2> = Property::new(
        |v| Vec2::new(v.y, v.z),
        |v, p| {
            v.y = p.x;
            v.z = p.y;
        },
    );

    pub const XZ: Property<Vec3, Vec2> = Property::new(
        |v| Vec2::new(v.x, v.z),
        |v, p| {
            v.x = p.x;
            v.z = p.y;
        },
    );
}

/// Parts of a [`Vec4`](crate::math::Vec4)
pub mod vec4 {
    use crate::math::Vec4;
    use crate::property::Property;

    pub const X: Property<Vec4, f32> = Property::new(|v| v.x, |v, x| v.x = x);
    pub const Y: Property<Vec4, f32> = Property::new(|v| v.y, |v, y| v.y = y);
    pub const Z: Property<Vec4, f32> = Property::new(|v| v.z, |v, z| v.z = z);
    pub const W: Property<Vec4, f32> = Property::new(|v| v.w, |v, w| v.w = w);
}

/// Channels of a [`Color`](crate::math::Color)
pub mod color {
    use crate::math::{Color, Vec3};
    use crate::property::Property;

    pub const R: Property<Color, f32> = Property::new(|c| c.r, |c, r| c.r = r);
    pub const G: Property<Color, f32> = Property::new(|c| c.g, |c, g| c.g = g);
    pub const B: Property<Color, f32> = Property::new(|c| c.b, |c, b| c.b = b);
    pub const A: Property<Color, f32> = Property::new(|c| c.a, |c, a| c.a = a);

    /// Color channels without alpha
    pub const RGB: Property<Color, Vec3> = Property::new(
        |c| Vec3::new(c.r, c.g, c.b),
        |c, v| {
            c.r = v.x;
            c.g = v.y;
            c.b = v.z;
        },
    );
}

// ============================================================================
// Angle around a center
// ============================================================================

/// Signed angle in degrees of a 2D position around a center
///
/// Reading gives the angle from the positive x axis to `position - center`,
/// in `(-180, 180]`. Writing places the position on the circle of `radius`
/// around `center` at that angle.
#[derive(Clone, Copy)]
pub struct DegreesAround<P> {
    position: P,
    center: Vec2,
    radius: f32,
}

/// Orbit a [`Vec2`] property around `center`
pub fn degrees_around<P>(position: P, center: Vec2, radius: f32) -> DegreesAround<P> {
    DegreesAround {
        position,
        center,
        radius,
    }
}

impl<T, P> PropertyAccessor<T> for DegreesAround<P>
where
    T: 'static,
    P: PropertyAccessor<T, Value = Vec2>,
{
    type Value = f32;

    fn get(&self, target: &T) -> f32 {
        let offset = self.position.get(target) - self.center;
        offset.y.atan2(offset.x).to_degrees()
    }

    fn set(&self, target: &mut T, degrees: f32) {
        let (sin, cos) = degrees.to_radians().sin_cos();
        let position = self.center + Vec2::new(cos, sin) * self.radius;
        self.position.set(target, position);
    }
}

// ============================================================================
// Distance to a reference
// ============================================================================

/// Distance between a property on the tweened target and the same property
/// on a reference target
///
/// Writing a distance moves the tweened value along the straight line toward
/// the reference value. Tweening it `to(0.0)` closes the gap, and the path
/// follows the reference if it moves meanwhile.
///
/// The reference is borrowed on every access. While it is mutably borrowed
/// (or is the tweened target itself) reads give `0.0` and writes do nothing.
pub struct DistanceTo<T, P> {
    reference: Target<T>,
    property: P,
}

/// Measure `property` against `reference`
pub fn distance_to<T, P>(reference: &Target<T>, property: P) -> DistanceTo<T, P>
where
    T: 'static,
    P: PropertyAccessor<T>,
    P::Value: Distance,
{
    DistanceTo {
        reference: reference.clone(),
        property,
    }
}

impl<T, P> PropertyAccessor<T> for DistanceTo<T, P>
where
    T: 'static,
    P: PropertyAccessor<T>,
    P::Value: Distance,
{
    type Value = f32;

    fn get(&self, target: &T) -> f32 {
        let Ok(reference) = self.reference.try_borrow() else {
            return 0.0;
        };
        self.property
            .get(target)
            .distance(&self.property.get(&reference))
    }

    fn set(&self, target: &mut T, value: f32) {
        let Ok(reference) = self.reference.try_borrow() else {
            return;
        };
        let from = self.property.get(target);
        let to = self.property.get(&reference);
        let span = from.distance(&to);
        if span <= 0.0 {
            return;
        }
        self.property.set(target, from.lerp(&to, 1.0 - value / span));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Color, Vec3, Vec4};
    use crate::property::{target, Binding, Property};
    use crate::tween::to;
    use cadence_core::Scheduler;

    #[derive(Clone, Debug, Default)]
    struct Node {
        position: Vec3,
        anchor: Vec2,
        tint: Color,
    }

    const POSITION: Property<Node, Vec3> = Property::new(|n| n.position, |n, v| n.position = v);
    const ANCHOR: Property<Node, Vec2> = Property::new(|n| n.anchor, |n, v| n.anchor = v);
    const TINT: Property<Node, Color> = Property::new(|n| n.tint, |n, v| n.tint = v);

    fn assert_near(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < 1e-4,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_component_leaves_other_parts() {
        let node = target(Node {
            position: Vec3::new(1.0, 2.0, 3.0),
            ..Node::default()
        });
        let height = Binding::new(&node, component(POSITION, vec3::Y));
        assert_eq!(height.get().unwrap(), 2.0);

        height.set(7.0).unwrap();
        assert_eq!(node.borrow().position, Vec3::new(1.0, 7.0, 3.0));

        let ground = Binding::new(&node, component(POSITION, vec3::XZ));
        assert_eq!(ground.get().unwrap(), Vec2::new(1.0, 3.0));
        ground.set(Vec2::new(-1.0, -3.0)).unwrap();
        assert_eq!(node.borrow().position, Vec3::new(-1.0, 7.0, -3.0));
    }

    #[test]
    fn test_parts_on_plain_values() {
        let corner = target(Vec4::new(1.0, 2.0, 3.0, 4.0));
        Binding::new(&corner, vec4::W).set(0.0).unwrap();
        assert_eq!(*corner.borrow(), Vec4::new(1.0, 2.0, 3.0, 0.0));

        let plane = target(Vec3::ZERO);
        Binding::new(&plane, vec3::YZ).set(Vec2::new(5.0, 6.0)).unwrap();
        assert_eq!(*plane.borrow(), Vec3::new(0.0, 5.0, 6.0));

        let point = target(Vec2::ZERO);
        Binding::new(&point, vec2::X).set(2.0).unwrap();
        assert_eq!(*point.borrow(), Vec2::new(2.0, 0.0));
    }

    #[test]
    fn test_tween_one_component() {
        let scheduler = Scheduler::new();
        let node = target(Node {
            position: Vec3::new(1.0, 0.0, 3.0),
            ..Node::default()
        });
        to(4.0)
            .property(&scheduler, &node, component(POSITION, vec3::Y), 1.0)
            .unwrap();

        scheduler.tick(0.5, 1.0);
        let position = node.borrow().position;
        assert_near(position.y, 2.0);
        assert_eq!(position.x, 1.0);
        assert_eq!(position.z, 3.0);
    }

    #[test]
    fn test_fade_alpha_only() {
        let scheduler = Scheduler::new();
        let node = target(Node {
            tint: Color::RED,
            ..Node::default()
        });
        to(0.0)
            .property(&scheduler, &node, component(TINT, color::A), 1.0)
            .unwrap();

        scheduler.tick(0.25, 1.0);
        let tint = node.borrow().tint;
        assert_near(tint.a, 0.75);
        assert_eq!(color::RGB.get(&tint), Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_degrees_around_reads_signed_angle() {
        let orbit = degrees_around(ANCHOR, Vec2::new(1.0, 1.0), 2.0);
        let mut node = Node {
            anchor: Vec2::new(1.0, 3.0),
            ..Node::default()
        };
        assert_near(orbit.get(&node), 90.0);
        node.anchor = Vec2::new(1.0, -1.0);
        assert_near(orbit.get(&node), -90.0);
        node.anchor = Vec2::new(-1.0, 1.0);
        assert_near(orbit.get(&node), 180.0);
    }

    #[test]
    fn test_degrees_around_writes_on_circle() {
        let orbit = degrees_around(ANCHOR, Vec2::new(1.0, 1.0), 2.0);
        let mut node = Node::default();
        orbit.set(&mut node, 90.0);
        assert_near(node.anchor.x, 1.0);
        assert_near(node.anchor.y, 3.0);
        orbit.set(&mut node, 180.0);
        assert_near(node.anchor.x, -1.0);
        assert_near(node.anchor.y, 1.0);
    }

    #[test]
    fn test_tween_around_a_circle() {
        let scheduler = Scheduler::new();
        let node = target(Node {
            anchor: Vec2::new(2.0, 0.0),
            ..Node::default()
        });
        to(90.0)
            .property(&scheduler, &node, degrees_around(ANCHOR, Vec2::ZERO, 2.0), 1.0)
            .unwrap();

        scheduler.tick(0.5, 1.0);
        let anchor = node.borrow().anchor;
        assert_near(anchor.length(), 2.0);
        assert_near(anchor.x, anchor.y);
    }

    #[test]
    fn test_distance_to_reference() {
        let goal = target(Node {
            position: Vec3::new(0.0, 0.0, 10.0),
            ..Node::default()
        });
        let gap = distance_to(&goal, POSITION);
        let mut node = Node::default();
        assert_near(gap.get(&node), 10.0);

        gap.set(&mut node, 4.0);
        assert_near(node.position.z, 6.0);
        assert_near(gap.get(&node), 4.0);
    }

    #[test]
    fn test_distance_to_coincident_reference_is_a_no_op() {
        let goal = target(Node::default());
        let gap = distance_to(&goal, POSITION);
        let mut node = Node::default();
        gap.set(&mut node, 3.0);
        assert_eq!(node.position, Vec3::ZERO);
        assert_eq!(gap.get(&node), 0.0);
    }

    #[test]
    fn test_distance_to_borrowed_reference() {
        let goal = target(Node {
            position: Vec3::ONE,
            ..Node::default()
        });
        let gap = distance_to(&goal, POSITION);
        let mut node = Node::default();
        let _guard = goal.borrow_mut();
        assert_eq!(gap.get(&node), 0.0);
        gap.set(&mut node, 0.0);
        assert_eq!(node.position, Vec3::ZERO);
    }

    #[test]
    fn test_tween_closes_distance() {
        let scheduler = Scheduler::new();
        let node = target(Node::default());
        let goal = target(Node {
            position: Vec3::new(8.0, 0.0, 0.0),
            ..Node::default()
        });
        let op = to(0.0)
            .property(&scheduler, &node, distance_to(&goal, POSITION), 1.0)
            .unwrap();

        scheduler.tick(0.5, 1.0);
        assert_near(node.borrow().position.x, 4.0);

        // The path follows a moving reference
        goal.borrow_mut().position = Vec3::new(4.0, 4.0, 0.0);
        scheduler.tick(0.5, 1.0);
        assert!(op.is_expired(&scheduler));
        let position = node.borrow().position;
        assert_near(position.x, 4.0);
        assert_near(position.y, 4.0);
    }
}

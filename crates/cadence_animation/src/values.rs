//! Interpolation protocol
//!
//! [`Interpolate`] is what every value tween needs: blend two values, add a
//! delta (for relative tweens), compare with a tolerance. [`Distance`] is the
//! extra capability required by multi-point value sequences.

use crate::math::{Color, Quat, Vec2, Vec3, Vec4};

/// Trait for values that can be tweened
pub trait Interpolate: Clone + 'static {
    /// Interpolate between self and other by factor t (0.0 to 1.0)
    fn lerp(&self, other: &Self, t: f32) -> Self;

    /// Combine a value with a delta
    fn add(&self, other: &Self) -> Self;

    /// Check if two values are approximately equal
    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool;
}

/// Values with a metric, used to pace multi-point sequences
pub trait Distance: Interpolate {
    fn distance(&self, other: &Self) -> f32;
}

// ============================================================================
// Scalars
// ============================================================================

impl Interpolate for f32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }

    fn add(&self, other: &Self) -> Self {
        self + other
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self - other).abs() < epsilon
    }
}

impl Distance for f32 {
    fn distance(&self, other: &Self) -> f32 {
        (other - self).abs()
    }
}

impl Interpolate for f64 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        let t = f64::from(t);
        self + (other - self) * t
    }

    fn add(&self, other: &Self) -> Self {
        self + other
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self - other).abs() < f64::from(epsilon)
    }
}

impl Distance for f64 {
    fn distance(&self, other: &Self) -> f32 {
        (other - self).abs() as f32
    }
}

/// Each endpoint is weighted and truncated separately
impl Interpolate for i32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        (*self as f32 * (1.0 - t)) as i32 + (*other as f32 * t) as i32
    }

    fn add(&self, other: &Self) -> Self {
        self.wrapping_add(*other)
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        ((self - other).abs() as f32) < epsilon.max(1.0)
    }
}

impl Distance for i32 {
    fn distance(&self, other: &Self) -> f32 {
        (*other as f32 - *self as f32).abs()
    }
}

// ============================================================================
// Vectors
// ============================================================================

macro_rules! impl_vector_interpolate {
    ($ty:ident { $($field:ident),+ }) => {
        impl Interpolate for $ty {
            fn lerp(&self, other: &Self, t: f32) -> Self {
                $ty { $($field: self.$field + (other.$field - self.$field) * t),+ }
            }

            fn add(&self, other: &Self) -> Self {
                *self + *other
            }

            fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
                true $(&& (self.$field - other.$field).abs() < epsilon)+
            }
        }

        impl Distance for $ty {
            fn distance(&self, other: &Self) -> f32 {
                (*other - *self).length()
            }
        }
    };
}

impl_vector_interpolate!(Vec2 { x, y });
impl_vector_interpolate!(Vec3 { x, y, z });
impl_vector_interpolate!(Vec4 { x, y, z, w });

// ============================================================================
// Color
// ============================================================================

impl Interpolate for Color {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Color::lerp_unclamped(self, other, t)
    }

    fn add(&self, other: &Self) -> Self {
        *self + *other
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self.r - other.r).abs() < epsilon
            && (self.g - other.g).abs() < epsilon
            && (self.b - other.b).abs() < epsilon
            && (self.a - other.a).abs() < epsilon
    }
}

// ============================================================================
// Rotation
// ============================================================================

/// Normalized lerp along the shorter arc; `add` composes rotations
impl Interpolate for Quat {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        let sign = if self.dot(other) < 0.0 { -1.0 } else { 1.0 };
        let s = 1.0 - t;
        let t = t * sign;
        Quat::new(
            self.x * s + other.x * t,
            self.y * s + other.y * t,
            self.z * s + other.z * t,
            self.w * s + other.w * t,
        )
        .normalize()
    }

    fn add(&self, other: &Self) -> Self {
        *self * *other
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        1.0 - self.dot(other).abs() < epsilon
    }
}

/// Angle between rotations, in degrees
impl Distance for Quat {
    fn distance(&self, other: &Self) -> f32 {
        self.angle_to(other)
    }
}

//! Easing curves
//!
//! An easing remaps normalized time `[0, 1]` onto an interpolation factor.
//! The driver only ever calls [`Easing::apply`]; the built-in curves are a
//! convenience and [`Easing::Custom`] plugs in anything else.

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Time remapping curve
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub enum Easing {
    #[default]
    Linear,
    /// Rises to 1 at the midpoint and falls back to 0
    InOutLinear,
    InQuad,
    OutQuad,
    InOutQuad,
    InCubic,
    OutCubic,
    /// Symmetric cubic: `4t³` on the first half, mirrored on the second
    ///
    /// Some engines use a quartic term on the second half of their in-out
    /// cubic; this curve does not, so values past the midpoint differ from
    /// those implementations.
    InOutCubic,
    InBack,
    OutBack,
    InElastic,
    OutElastic,
    /// Decaying oscillation around 0
    Shake,
    /// Any plain function; not serializable
    #[serde(skip)]
    Custom(fn(f32) -> f32),
}

const BACK_OVERSHOOT: f32 = 1.70158;
const ELASTIC_PERIOD: f32 = 0.3;

impl Easing {
    /// Apply the curve to normalized time `t`
    pub fn apply(&self, t: f32) -> f32 {
        match self {
            Easing::Linear => t,
            Easing::InOutLinear => {
                let t = t * 2.0;
                if t < 1.0 {
                    t
                } else {
                    2.0 - t
                }
            }
            Easing::InQuad => t * t,
            Easing::OutQuad => -t * (t - 2.0),
            Easing::InOutQuad => {
                let t = t * 2.0;
                if t < 1.0 {
                    0.5 * t * t
                } else {
                    let t = t - 1.0;
                    -0.5 * (t * (t - 2.0) - 1.0)
                }
            }
            Easing::InCubic => t * t * t,
            Easing::OutCubic => {
                let t = t - 1.0;
                t * t * t + 1.0
            }
            Easing::InOutCubic => {
                let t = t * 2.0;
                if t < 1.0 {
                    0.5 * t * t * t
                } else {
                    let t = t - 2.0;
                    0.5 * (t * t * t + 2.0)
                }
            }
            Easing::InBack => t * t * ((BACK_OVERSHOOT + 1.0) * t - BACK_OVERSHOOT),
            Easing::OutBack => {
                let t = t - 1.0;
                t * t * ((BACK_OVERSHOOT + 1.0) * t + BACK_OVERSHOOT) + 1.0
            }
            Easing::InElastic => {
                if t == 0.0 || t == 1.0 {
                    return t;
                }
                let t = t - 1.0;
                -(2f32.powf(10.0 * t)) * (t * 2.0 * PI / ELASTIC_PERIOD).sin()
            }
            Easing::OutElastic => {
                if t == 0.0 || t == 1.0 {
                    return t;
                }
                let s = ELASTIC_PERIOD / 4.0;
                2f32.powf(-10.0 * t) * ((t - s) * 2.0 * PI / ELASTIC_PERIOD).sin() + 1.0
            }
            Easing::Shake => {
                if t == 0.0 {
                    return 0.0;
                }
                (t * 2.0 * PI * 5.0).sin() * (1.0 - t)
            }
            Easing::Custom(f) => f(t),
        }
    }
}

/// Built-in curves compare by variant.
///
/// `Custom` curves compare by function address, which is best-effort: the
/// same function may have distinct addresses across codegen units and
/// distinct functions may be merged into one.
impl PartialEq for Easing {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Easing::Custom(a), Easing::Custom(b)) => *a as usize == *b as usize,
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

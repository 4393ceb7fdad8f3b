//! Tween options and scheduler configuration

use serde::{Deserialize, Serialize};

use crate::easing::Easing;
use crate::error::Result;

/// Default duration for builders that do not take one
pub const DEFAULT_DURATION: f32 = 1.0;

/// Per-operation timing options
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TweenOptions {
    /// Length of the operation in seconds
    pub duration: f32,
    /// Curve applied to normalized time
    pub ease: Easing,
    /// Advance by the unscaled delta instead of the scaled one
    pub ignore_time_scale: bool,
}

impl Default for TweenOptions {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION)
    }
}

impl TweenOptions {
    /// Linear options with the given duration
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            ease: Easing::Linear,
            ignore_time_scale: false,
        }
    }

    pub fn with_duration(mut self, duration: f32) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_ease(mut self, ease: Easing) -> Self {
        self.ease = ease;
        self
    }

    /// Advance this operation by unscaled time
    pub fn ignoring_time_scale(mut self) -> Self {
        self.ignore_time_scale = true;
        self
    }
}

impl From<f32> for TweenOptions {
    fn from(duration: f32) -> Self {
        Self::new(duration)
    }
}

/// Configuration for a [`Scheduler`](crate::Scheduler)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Driver slots built up front and parked in the pool
    pub initial_capacity: usize,
    /// Options used by builders that are only given a target
    pub default_options: TweenOptions,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl SchedulerConfig {
    /// Standard configuration for general use.
    pub fn standard() -> Self {
        Self {
            initial_capacity: 0,
            default_options: TweenOptions::default(),
        }
    }

    /// Pre-warmed pool for scenes that start many tweens at once.
    pub fn prewarmed(capacity: usize) -> Self {
        Self {
            initial_capacity: capacity,
            ..Self::standard()
        }
    }

    /// Testing configuration with a small pre-warmed pool.
    pub fn testing() -> Self {
        Self {
            initial_capacity: 8,
            ..Self::standard()
        }
    }

    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    pub fn with_default_options(mut self, options: TweenOptions) -> Self {
        self.default_options = options;
        self
    }

    /// Parse a configuration from TOML
    ///
    /// Missing keys fall back to [`SchedulerConfig::standard`].
    ///
    /// ```ignore
    /// let config = SchedulerConfig::from_toml_str(r#"
    ///     initial_capacity = 64
    ///
    ///     [default_options]
    ///     duration = 0.25
    ///     ease = "OutCubic"
    /// "#)?;
    /// ```
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Serialize this configuration as TOML
    ///
    /// Fails if the default easing is [`Easing::Custom`].
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_builders() {
        let options = TweenOptions::new(2.0)
            .with_ease(Easing::OutQuad)
            .ignoring_time_scale();
        assert_eq!(options.duration, 2.0);
        assert_eq!(options.ease, Easing::OutQuad);
        assert!(options.ignore_time_scale);
        assert_eq!(TweenOptions::from(0.5).duration, 0.5);
    }

    #[test]
    fn test_default_duration() {
        assert_eq!(TweenOptions::default().duration, DEFAULT_DURATION);
        assert_eq!(TweenOptions::default().ease, Easing::Linear);
    }

    #[test]
    fn test_from_toml() {
        let config = SchedulerConfig::from_toml_str(
            r#"
            initial_capacity = 64

            [default_options]
            duration = 0.25
            ease = "OutCubic"
            "#,
        )
        .unwrap();
        assert_eq!(config.initial_capacity, 64);
        assert_eq!(config.default_options.duration, 0.25);
        assert_eq!(config.default_options.ease, Easing::OutCubic);
        assert!(!config.default_options.ignore_time_scale);
    }

    #[test]
    fn test_from_toml_empty_uses_standard() {
        let config = SchedulerConfig::from_toml_str("").unwrap();
        assert_eq!(config, SchedulerConfig::standard());
    }

    #[test]
    fn test_from_toml_rejects_bad_types() {
        let err = SchedulerConfig::from_toml_str("initial_capacity = \"many\"");
        assert!(matches!(err, Err(crate::TweenError::Config(_))));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = SchedulerConfig::prewarmed(16)
            .with_default_options(TweenOptions::new(0.5).with_ease(Easing::InQuad));
        let parsed = SchedulerConfig::from_toml_str(&config.to_toml_string().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }
}

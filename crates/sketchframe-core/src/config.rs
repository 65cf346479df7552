//! Tunable engine parameters.
//!
//! Every distance here is in canvas units, every duration in milliseconds.
//! None of them scale with the camera zoom.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Factor applied by a single zoom-in / zoom-out step.
    pub zoom_step: f64,
    /// Lower zoom clamp.
    pub min_zoom: f64,
    /// Upper zoom clamp.
    pub max_zoom: f64,
    /// Factor applied per wheel event.
    pub wheel_zoom_step: f64,
    /// Screen padding kept around content by fit-to-screen.
    pub fit_padding: f64,
    /// Fit-to-screen never zooms in past this.
    pub fit_max_zoom: f64,
    /// Duration of the reset-zoom animation.
    pub reset_animation_ms: u64,
    /// Frames smaller than this in either dimension are dropped on release.
    pub min_frame_size: f64,
    /// Simplification tolerance applied to finalized strokes.
    pub storage_tolerance: f64,
    /// Simplification tolerance applied to real-time stroke updates.
    pub realtime_tolerance: f64,
    /// Pointer travel required before another real-time update goes out.
    pub throttle_distance: f64,
    /// Minimum gap between two pen auto-switches on the same stroke.
    pub activation_guard_ms: u64,
    /// Hit slop for strokes and text boxes.
    pub hit_tolerance: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            zoom_step: 1.3,
            min_zoom: 0.05,
            max_zoom: 8.0,
            wheel_zoom_step: 1.1,
            fit_padding: 50.0,
            fit_max_zoom: 2.0,
            reset_animation_ms: 300,
            min_frame_size: 20.0,
            storage_tolerance: 2.0,
            realtime_tolerance: 3.0,
            throttle_distance: 5.0,
            activation_guard_ms: 100,
            hit_tolerance: 5.0,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a config from JSON. Missing fields take defaults.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the values describe a usable engine.
    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.min_zoom > 0.0) {
            return Err(invalid("min_zoom", "must be greater than zero"));
        }
        if !(self.max_zoom >= self.min_zoom) {
            return Err(invalid("max_zoom", "must not be below min_zoom"));
        }
        for (field, value) in [
            ("zoom_step", self.zoom_step),
            ("wheel_zoom_step", self.wheel_zoom_step),
        ] {
            if !(value > 1.0) {
                return Err(invalid(field, "must be greater than 1"));
            }
        }
        if !(self.fit_max_zoom > 0.0) {
            return Err(invalid("fit_max_zoom", "must be greater than zero"));
        }
        for (field, value) in [
            ("fit_padding", self.fit_padding),
            ("min_frame_size", self.min_frame_size),
            ("storage_tolerance", self.storage_tolerance),
            ("realtime_tolerance", self.realtime_tolerance),
            ("throttle_distance", self.throttle_distance),
            ("hit_tolerance", self.hit_tolerance),
        ] {
            if !(value >= 0.0) || !value.is_finite() {
                return Err(invalid(field, "must be a finite, non-negative number"));
            }
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = EngineConfig::from_json(r#"{ "throttle_distance": 8.0 }"#).unwrap();
        assert!((config.throttle_distance - 8.0).abs() < f64::EPSILON);
        assert!((config.zoom_step - 1.3).abs() < f64::EPSILON);
        assert_eq!(config.activation_guard_ms, 100);
    }

    #[test]
    fn test_rejects_inverted_zoom_range() {
        let err = EngineConfig::from_json(r#"{ "min_zoom": 4.0, "max_zoom": 2.0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "max_zoom", .. }));
    }

    #[test]
    fn test_rejects_zero_min_zoom() {
        let err = EngineConfig::from_json(r#"{ "min_zoom": 0.0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "min_zoom", .. }));
    }

    #[test]
    fn test_rejects_negative_tolerance() {
        let err = EngineConfig::from_json(r#"{ "storage_tolerance": -1.0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "storage_tolerance", .. }));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = EngineConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::RgbaColor;
use crate::error::HueRingError;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings json")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] HueRingError),
}

/// Initial state and styling of a [`HueRingPicker`](crate::color_ring::HueRingPicker).
///
/// Every field is optional in JSON; missing fields take the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HueRingSettings {
    pub value: f64,
    pub minimum: f64,
    pub maximum: f64,
    pub ring_thickness: f64,
    pub thumb_arc_angle: f64,
    pub thumb_border_thickness: f64,
    /// Thumb outline color. When unset the outline follows the selected hue.
    pub thumb_border_brush: Option<RgbaColor>,
    pub thumb_background: Option<RgbaColor>,
    /// Pause before re-checking a container that is too small for the ring.
    pub recheck_delay_ms: u64,
}

impl Default for HueRingSettings {
    fn default() -> Self {
        Self {
            value: 0.0,
            minimum: 0.0,
            maximum: 360.0,
            ring_thickness: 20.0,
            thumb_arc_angle: 30.0,
            thumb_border_thickness: 2.0,
            thumb_border_brush: None,
            thumb_background: None,
            recheck_delay_ms: 50,
        }
    }
}

impl HueRingSettings {
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let settings = Self::from_json(&json)?;
        tracing::debug!(path = %path.display(), "loaded hue ring settings");
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), HueRingError> {
        if self.ring_thickness.is_nan() || self.ring_thickness < 0.0 {
            return Err(HueRingError::NegativeThickness {
                name: "ring thickness",
                value: self.ring_thickness,
            });
        }
        if self.thumb_border_thickness.is_nan() || self.thumb_border_thickness < 0.0 {
            return Err(HueRingError::NegativeThickness {
                name: "thumb border thickness",
                value: self.thumb_border_thickness,
            });
        }
        if !(0.0..=180.0).contains(&self.thumb_arc_angle) {
            return Err(HueRingError::ThumbArcAngleOutOfRange(self.thumb_arc_angle));
        }
        Ok(())
    }

    pub fn recheck_delay(&self) -> Duration {
        Duration::from_millis(self.recheck_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_json() {
        let settings = HueRingSettings::from_json("{}").unwrap();
        assert_eq!(settings, HueRingSettings::default());
        assert_eq!(settings.recheck_delay(), Duration::from_millis(50));
    }

    #[test]
    fn test_partial_json_with_colors() {
        let settings = HueRingSettings::from_json(
            r##"{
                "value": 120,
                "ring_thickness": 12.5,
                "thumb_border_brush": "#FF8000",
                "thumb_background": "#00000080"
            }"##,
        )
        .unwrap();

        assert_eq!(settings.value, 120.0);
        assert_eq!(settings.ring_thickness, 12.5);
        assert_eq!(settings.thumb_arc_angle, 30.0);
        assert_eq!(
            settings.thumb_border_brush,
            Some(RgbaColor::opaque(255, 128, 0))
        );
        assert_eq!(settings.thumb_background, Some(RgbaColor::new(0, 0, 0, 128)));
    }

    #[test]
    fn test_serialize_round_trip() {
        let settings = HueRingSettings {
            thumb_border_brush: Some(RgbaColor::opaque(1, 2, 3)),
            ..Default::default()
        };
        let json = serde_json::to_string(&settings).unwrap();
        assert!(json.contains("\"#010203FF\""));
        assert_eq!(HueRingSettings::from_json(&json).unwrap(), settings);
    }

    #[test]
    fn test_validation_errors() {
        let err = HueRingSettings::from_json(r#"{ "thumb_arc_angle": 200 }"#).unwrap_err();
        assert!(matches!(
            err,
            SettingsError::Invalid(HueRingError::ThumbArcAngleOutOfRange(_))
        ));

        let err = HueRingSettings::from_json(r#"{ "ring_thickness": -1 }"#).unwrap_err();
        assert!(matches!(
            err,
            SettingsError::Invalid(HueRingError::NegativeThickness {
                name: "ring thickness",
                ..
            })
        ));

        let err = HueRingSettings::from_json(r#"{ "thumb_background": "red" }"#).unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = HueRingSettings::load("/nonexistent/hue-ring.json").unwrap_err();
        assert!(matches!(err, SettingsError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/hue-ring.json"));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("hue-ring-settings-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "maximum": 270, "recheck_delay_ms": 5 }"#).unwrap();

        let settings = HueRingSettings::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(settings.maximum, 270.0);
        assert_eq!(settings.recheck_delay(), Duration::from_millis(5));
    }
}

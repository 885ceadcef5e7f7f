//! Visitor preferences model
//!
//! Shared by the preferences endpoint and the preferences resource.
//! Partial updates are validated in full before anything is applied.

use crate::config::{MAX_VOLUME, MIN_VOLUME, VALID_THEMES};
use crate::device::{ConnectionQuality, DeviceContext, DeviceTier};
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Visual theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Theme {
    #[default]
    LuxuryDark,
    LuxuryLight,
    Celebration,
    Minimal,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::LuxuryDark => "luxury-dark",
            Theme::LuxuryLight => "luxury-light",
            Theme::Celebration => "celebration",
            Theme::Minimal => "minimal",
        }
    }
}

impl FromStr for Theme {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "luxury-dark" => Ok(Theme::LuxuryDark),
            "luxury-light" => Ok(Theme::LuxuryLight),
            "celebration" => Ok(Theme::Celebration),
            "minimal" => Ok(Theme::Minimal),
            other => Err(AppError::validation(format!(
                "Invalid theme {:?}. Must be one of: {}",
                other,
                VALID_THEMES.join(", ")
            ))),
        }
    }
}

/// Full preference set.
///
/// Decoding goes through [`PreferencesPatch`], so a stored or received
/// set is held to the same rules as an update: missing fields take the
/// defaults, an out-of-range volume or unknown theme is rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "PreferencesPatch")]
pub struct Preferences {
    pub music_enabled: bool,
    pub autoplay: bool,
    /// 0..=100
    pub volume: u8,
    pub theme: Theme,
    pub reduced_motion: bool,
    pub high_contrast: bool,
}

fn default_volume() -> u8 {
    50
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            music_enabled: true,
            autoplay: false,
            volume: default_volume(),
            theme: Theme::default(),
            reduced_motion: false,
            high_contrast: false,
        }
    }
}

impl Preferences {
    /// Defaults tuned to the visitor's device
    pub fn for_device(ctx: &DeviceContext) -> Self {
        let mut prefs = Self {
            reduced_motion: ctx.reduced_motion,
            ..Self::default()
        };

        if ctx.tier == DeviceTier::Mobile {
            prefs.volume = 40;
        }

        // Don't stream audio on constrained connections unless asked
        if ctx.connection == ConnectionQuality::Slow {
            prefs.music_enabled = false;
        }

        prefs
    }

    /// Validate `patch` and return the merged result. On error `self`
    /// is untouched and nothing is partially applied.
    pub fn merged(&self, patch: &PreferencesPatch) -> Result<Preferences> {
        let validated = patch.validate()?;

        Ok(Preferences {
            music_enabled: patch.music_enabled.unwrap_or(self.music_enabled),
            autoplay: patch.autoplay.unwrap_or(self.autoplay),
            volume: validated.volume.unwrap_or(self.volume),
            theme: validated.theme.unwrap_or(self.theme),
            reduced_motion: patch.reduced_motion.unwrap_or(self.reduced_motion),
            high_contrast: patch.high_contrast.unwrap_or(self.high_contrast),
        })
    }
}

impl TryFrom<PreferencesPatch> for Preferences {
    type Error = AppError;

    fn try_from(patch: PreferencesPatch) -> Result<Self> {
        Preferences::default().merged(&patch)
    }
}

/// Partial preference update as received from clients.
///
/// Volume and theme are kept loosely typed so out-of-range numbers and
/// unknown names produce a descriptive validation error instead of a
/// deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub music_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autoplay: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reduced_motion: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_contrast: Option<bool>,
}

struct ValidatedFields {
    volume: Option<u8>,
    theme: Option<Theme>,
}

impl PreferencesPatch {
    fn validate(&self) -> Result<ValidatedFields> {
        let volume = match self.volume {
            Some(v) if !(MIN_VOLUME..=MAX_VOLUME).contains(&v) => {
                return Err(AppError::validation(format!(
                    "Volume must be between {} and {}",
                    MIN_VOLUME, MAX_VOLUME
                )));
            }
            // In range, so the narrowing cannot fail
            Some(v) => Some(u8::try_from(v).map_err(|e| AppError::validation(e.to_string()))?),
            None => None,
        };

        let theme = self.theme.as_deref().map(Theme::from_str).transpose()?;

        Ok(ValidatedFields { volume, theme })
    }

    /// Check the patch without applying it
    pub fn check(&self) -> Result<()> {
        self.validate().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{NetworkHints, ViewportSample};

    #[test]
    fn test_defaults() {
        let prefs = Preferences::default();
        assert!(prefs.music_enabled);
        assert!(!prefs.autoplay);
        assert_eq!(prefs.volume, 50);
        assert_eq!(prefs.theme, Theme::LuxuryDark);
    }

    #[test]
    fn test_volume_bounds() {
        let prefs = Preferences::default();

        for bad in [-1, 101] {
            let patch = PreferencesPatch {
                volume: Some(bad),
                ..Default::default()
            };
            assert!(matches!(prefs.merged(&patch), Err(AppError::Validation(_))));
        }

        for good in [0, 100] {
            let patch = PreferencesPatch {
                volume: Some(good),
                ..Default::default()
            };
            assert_eq!(prefs.merged(&patch).unwrap().volume as i64, good);
        }
    }

    #[test]
    fn test_theme_must_be_known() {
        let prefs = Preferences::default();

        let bad = PreferencesPatch {
            theme: Some("neon".to_string()),
            ..Default::default()
        };
        let err = prefs.merged(&bad).unwrap_err();
        assert!(err.to_string().contains("luxury-dark"));

        for name in VALID_THEMES {
            let patch = PreferencesPatch {
                theme: Some(name.to_string()),
                ..Default::default()
            };
            assert_eq!(prefs.merged(&patch).unwrap().theme.as_str(), *name);
        }
    }

    #[test]
    fn test_invalid_patch_applies_nothing() {
        let prefs = Preferences::default();
        let patch = PreferencesPatch {
            autoplay: Some(true),
            volume: Some(150),
            ..Default::default()
        };

        assert!(prefs.merged(&patch).is_err());
        assert!(!prefs.autoplay);
    }

    #[test]
    fn test_partial_merge_keeps_other_fields() {
        let prefs = Preferences {
            high_contrast: true,
            ..Preferences::default()
        };
        let merged = prefs
            .merged(&PreferencesPatch {
                volume: Some(80),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(merged.volume, 80);
        assert!(merged.high_contrast);
    }

    #[test]
    fn test_device_defaults() {
        let phone_on_2g = DeviceContext::from_sample(ViewportSample {
            width: 375,
            height: 667,
            max_touch_points: 5,
            prefers_reduced_motion: true,
            network: Some(NetworkHints {
                effective_type: Some("2g".to_string()),
                save_data: false,
            }),
        });

        let prefs = Preferences::for_device(&phone_on_2g);
        assert_eq!(prefs.volume, 40);
        assert!(!prefs.music_enabled);
        assert!(prefs.reduced_motion);

        let desktop = Preferences::for_device(&DeviceContext::default());
        assert_eq!(desktop, Preferences::default());
    }

    #[test]
    fn test_decoding_validates_like_an_update() {
        let decoded: Preferences =
            serde_json::from_str(r#"{"volume": 70, "theme": "minimal"}"#).unwrap();
        assert_eq!(decoded.volume, 70);
        assert_eq!(decoded.theme, Theme::Minimal);
        assert!(decoded.music_enabled);

        assert!(serde_json::from_str::<Preferences>(r#"{"volume": 200}"#).is_err());
        assert!(serde_json::from_str::<Preferences>(r#"{"volume": -3}"#).is_err());
        assert!(serde_json::from_str::<Preferences>(r#"{"theme": "neon"}"#).is_err());
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let json = serde_json::to_value(Preferences::default()).unwrap();
        assert_eq!(json["musicEnabled"], true);
        assert_eq!(json["theme"], "luxury-dark");
    }
}

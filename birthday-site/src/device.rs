//! Device and context probe
//!
//! Classifies the visitor's viewport, input and network conditions.
//! The result only parameterises defaults (preferences, image sizes);
//! it is never authoritative state.

use crate::config::{MOBILE_BREAKPOINT_PX, TABLET_BREAKPOINT_PX};
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tokio::sync::watch;

/// Device class derived from viewport width
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceTier {
    Mobile,
    Tablet,
    Desktop,
}

impl DeviceTier {
    pub const ALL: [DeviceTier; 3] = [DeviceTier::Mobile, DeviceTier::Tablet, DeviceTier::Desktop];

    pub fn from_width(width: u32) -> Self {
        if width < MOBILE_BREAKPOINT_PX {
            DeviceTier::Mobile
        } else if width < TABLET_BREAKPOINT_PX {
            DeviceTier::Tablet
        } else {
            DeviceTier::Desktop
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceTier::Mobile => "mobile",
            DeviceTier::Tablet => "tablet",
            DeviceTier::Desktop => "desktop",
        }
    }
}

impl FromStr for DeviceTier {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mobile" => Ok(DeviceTier::Mobile),
            "tablet" => Ok(DeviceTier::Tablet),
            "desktop" => Ok(DeviceTier::Desktop),
            other => Err(AppError::validation(format!(
                "Unknown device {:?}, expected mobile, tablet or desktop",
                other
            ))),
        }
    }
}

/// Coarse network quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionQuality {
    Slow,
    Moderate,
    Fast,
}

/// Network hints exposed by some platforms (Network Information API)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkHints {
    /// "slow-2g", "2g", "3g" or "4g"
    pub effective_type: Option<String>,
    #[serde(default)]
    pub save_data: bool,
}

impl NetworkHints {
    pub fn quality(&self) -> ConnectionQuality {
        if self.save_data {
            return ConnectionQuality::Slow;
        }
        match self.effective_type.as_deref() {
            Some("slow-2g") | Some("2g") => ConnectionQuality::Slow,
            Some("3g") => ConnectionQuality::Moderate,
            _ => ConnectionQuality::Fast,
        }
    }
}

/// Raw observations from the platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportSample {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub max_touch_points: u32,
    #[serde(default)]
    pub prefers_reduced_motion: bool,
    /// Absent when the platform exposes no network information
    #[serde(default)]
    pub network: Option<NetworkHints>,
}

impl Default for ViewportSample {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 800,
            max_touch_points: 0,
            prefers_reduced_motion: false,
            network: None,
        }
    }
}

/// Derived device context
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceContext {
    pub tier: DeviceTier,
    pub is_touch: bool,
    pub reduced_motion: bool,
    pub connection: ConnectionQuality,
    pub save_data: bool,
    pub sample: ViewportSample,
}

impl DeviceContext {
    pub fn from_sample(sample: ViewportSample) -> Self {
        let hints = sample.network.clone().unwrap_or_default();
        Self {
            tier: DeviceTier::from_width(sample.width),
            is_touch: sample.max_touch_points > 0,
            reduced_motion: sample.prefers_reduced_motion,
            connection: hints.quality(),
            save_data: hints.save_data,
            sample,
        }
    }

    /// Image size/quality to request for gallery images
    pub fn image_hints(&self) -> ImageHints {
        let max_width = match self.tier {
            DeviceTier::Mobile => 640,
            DeviceTier::Tablet => 1024,
            DeviceTier::Desktop => 1920,
        };
        let quality = match self.connection {
            ConnectionQuality::Slow => 50,
            ConnectionQuality::Moderate => 70,
            ConnectionQuality::Fast => 85,
        };
        ImageHints { max_width, quality }
    }
}

impl Default for DeviceContext {
    fn default() -> Self {
        Self::from_sample(ViewportSample::default())
    }
}

/// Requested image dimensions and encoder quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageHints {
    pub max_width: u32,
    pub quality: u8,
}

/// Keeps the device context current as the platform reports changes
pub struct DeviceProbe {
    context: watch::Sender<DeviceContext>,
}

impl DeviceProbe {
    pub fn new(sample: ViewportSample) -> Self {
        let (context, _) = watch::channel(DeviceContext::from_sample(sample));
        Self { context }
    }

    pub fn context(&self) -> DeviceContext {
        self.context.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DeviceContext> {
        self.context.subscribe()
    }

    /// Viewport resized
    pub fn on_resize(&self, width: u32, height: u32) {
        self.recompute(|sample| {
            sample.width = width;
            sample.height = height;
        });
    }

    /// Connection type or data-saver flag changed
    pub fn on_connection_change(&self, network: Option<NetworkHints>) {
        self.recompute(|sample| sample.network = network);
    }

    /// Reduced-motion media query flipped
    pub fn on_motion_preference_change(&self, prefers_reduced_motion: bool) {
        self.recompute(|sample| sample.prefers_reduced_motion = prefers_reduced_motion);
    }

    fn recompute(&self, change: impl FnOnce(&mut ViewportSample)) {
        self.context.send_if_modified(|ctx| {
            let mut sample = ctx.sample.clone();
            change(&mut sample);
            let next = DeviceContext::from_sample(sample);
            if next == *ctx {
                return false;
            }
            if next.tier != ctx.tier {
                tracing::debug!("Device tier changed: {:?} -> {:?}", ctx.tier, next.tier);
            }
            *ctx = next;
            true
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_breakpoints() {
        assert_eq!(DeviceTier::from_width(320), DeviceTier::Mobile);
        assert_eq!(DeviceTier::from_width(767), DeviceTier::Mobile);
        assert_eq!(DeviceTier::from_width(768), DeviceTier::Tablet);
        assert_eq!(DeviceTier::from_width(1023), DeviceTier::Tablet);
        assert_eq!(DeviceTier::from_width(1024), DeviceTier::Desktop);
    }

    #[test]
    fn test_connection_quality() {
        let hints = |t: &str, save_data| NetworkHints {
            effective_type: Some(t.to_string()),
            save_data,
        };
        assert_eq!(hints("4g", false).quality(), ConnectionQuality::Fast);
        assert_eq!(hints("3g", false).quality(), ConnectionQuality::Moderate);
        assert_eq!(hints("2g", false).quality(), ConnectionQuality::Slow);
        assert_eq!(hints("4g", true).quality(), ConnectionQuality::Slow);
        assert_eq!(NetworkHints::default().quality(), ConnectionQuality::Fast);
    }

    #[test]
    fn test_image_hints() {
        let phone = DeviceContext::from_sample(ViewportSample {
            width: 390,
            height: 844,
            max_touch_points: 5,
            prefers_reduced_motion: false,
            network: Some(NetworkHints {
                effective_type: Some("3g".to_string()),
                save_data: false,
            }),
        });

        assert!(phone.is_touch);
        assert_eq!(
            phone.image_hints(),
            ImageHints {
                max_width: 640,
                quality: 70
            }
        );
    }

    #[tokio::test]
    async fn test_probe_recomputes_on_resize() {
        let probe = DeviceProbe::new(ViewportSample::default());
        let mut rx = probe.subscribe();
        assert_eq!(probe.context().tier, DeviceTier::Desktop);

        probe.on_resize(600, 900);

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().tier, DeviceTier::Mobile);
    }

    #[test]
    fn test_probe_ignores_no_op_changes() {
        let probe = DeviceProbe::new(ViewportSample::default());
        let rx = probe.subscribe();

        probe.on_connection_change(None);

        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_device_parse() {
        assert_eq!("tablet".parse::<DeviceTier>().unwrap(), DeviceTier::Tablet);
        assert!("watch".parse::<DeviceTier>().is_err());
    }
}

//! Site configuration
//!
//! Constants for validation boundaries and defaults, plus the
//! environment-driven runtime configuration.

use crate::error::{AppError, Result};
use std::path::PathBuf;
use std::time::Duration;

// ===== Preference Limits =====

/// Minimum playback volume
pub const MIN_VOLUME: i64 = 0;

/// Maximum playback volume
pub const MAX_VOLUME: i64 = 100;

/// Theme names accepted by the preferences endpoint and hook
pub const VALID_THEMES: &[&str] = &["luxury-dark", "luxury-light", "celebration", "minimal"];

/// Key under which preferences are cached locally
pub const PREFERENCES_CACHE_KEY: &str = "birthday-preferences";

// ===== Device Breakpoints =====

/// Viewports narrower than this are mobile
pub const MOBILE_BREAKPOINT_PX: u32 = 768;

/// Viewports narrower than this (and not mobile) are tablets
pub const TABLET_BREAKPOINT_PX: u32 = 1024;

// ===== Content =====

/// Caption given to photos whose caption is cleared
pub const UNTITLED_CAPTION: &str = "Untitled";

/// Artist recorded for playlist tracks added without one
pub const DEFAULT_TRACK_ARTIST: &str = "Custom";

/// Site setting holding the admin password
pub const ADMIN_PASSWORD_SETTING: &str = "admin_password";

// ===== Local Backend =====

/// SQLite file inside the local data directory
pub const DATABASE_FILE_NAME: &str = "birthday-site.db";

/// Connections shared by the resources and the analytics endpoint
pub const DATABASE_POOL_SIZE: u32 = 5;

/// How long a writer waits on a locked database before failing
pub const DATABASE_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

// ===== Network =====

/// Default port for the HTTP server
pub const DEFAULT_PORT: u16 = 3000;

/// Per-request timeout for calls to the managed backend and email relay.
/// Remote calls have no required deadline; this only bounds hung sockets.
pub const REMOTE_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Default object storage bucket for uploaded photos
pub const DEFAULT_STORAGE_BUCKET: &str = "photos";

/// Where the data layer reads and writes photos, wishes and settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendConfig {
    /// Managed backend reached over REST
    Rest {
        url: String,
        anon_key: String,
        bucket: String,
    },
    /// Local SQLite database plus blob directory
    Sqlite { data_dir: PathBuf },
    /// No backend: static fallback mode
    Unconfigured,
}

/// External email relay used by the send-wish endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    pub url: String,
    pub access_key: String,
}

/// Runtime configuration resolved from the environment
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub port: u16,
    pub backend: BackendConfig,
    pub admin_password: Option<String>,
    pub relay: Option<RelayConfig>,
    /// Base URL used when building links to locally stored media
    pub public_base_url: String,
}

impl SiteConfig {
    /// Load configuration from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match var("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|e| AppError::Generic(format!("Invalid PORT value {:?}: {}", raw, e)))?,
            None => {
                tracing::info!("PORT not set, using default: {}", DEFAULT_PORT);
                DEFAULT_PORT
            }
        };

        let backend = match (var("BACKEND_URL"), var("BACKEND_ANON_KEY")) {
            (Some(url), Some(anon_key)) => BackendConfig::Rest {
                url: url.trim_end_matches('/').to_string(),
                anon_key,
                bucket: var("STORAGE_BUCKET")
                    .unwrap_or_else(|| DEFAULT_STORAGE_BUCKET.to_string()),
            },
            (Some(_), None) | (None, Some(_)) => {
                tracing::warn!(
                    "BACKEND_URL and BACKEND_ANON_KEY must both be set, ignoring partial backend config"
                );
                Self::local_backend(&var)
            }
            (None, None) => Self::local_backend(&var),
        };

        let admin_password = var("ADMIN_PASSWORD");
        if admin_password.is_none() {
            tracing::info!("ADMIN_PASSWORD not set, admin login depends on site settings");
        }

        let relay = match (var("EMAIL_RELAY_URL"), var("EMAIL_RELAY_KEY")) {
            (Some(url), Some(access_key)) => Some(RelayConfig { url, access_key }),
            _ => {
                tracing::warn!("Email relay not configured, send-wish requests will fail");
                None
            }
        };

        let public_base_url = var("PUBLIC_BASE_URL")
            .unwrap_or_else(|| format!("http://localhost:{}", port))
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            port,
            backend,
            admin_password,
            relay,
            public_base_url,
        })
    }

    fn local_backend(var: &dyn Fn(&str) -> Option<String>) -> BackendConfig {
        match var("SITE_DATA_DIR") {
            Some(dir) => BackendConfig::Sqlite {
                data_dir: PathBuf::from(dir),
            },
            None => {
                tracing::warn!("No backend configured, serving static fallback data");
                BackendConfig::Unconfigured
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_empty_environment_is_static_fallback_mode() {
        let config = SiteConfig::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.backend, BackendConfig::Unconfigured);
        assert!(config.admin_password.is_none());
        assert!(config.relay.is_none());
        assert_eq!(config.public_base_url, "http://localhost:3000");
    }

    #[test]
    fn test_rest_backend_requires_url_and_key() {
        let config = SiteConfig::from_lookup(lookup(&[
            ("BACKEND_URL", "https://project.example.co/"),
            ("BACKEND_ANON_KEY", "anon"),
        ]))
        .unwrap();

        assert_eq!(
            config.backend,
            BackendConfig::Rest {
                url: "https://project.example.co".to_string(),
                anon_key: "anon".to_string(),
                bucket: DEFAULT_STORAGE_BUCKET.to_string(),
            }
        );

        let partial =
            SiteConfig::from_lookup(lookup(&[("BACKEND_URL", "https://project.example.co")]))
                .unwrap();
        assert_eq!(partial.backend, BackendConfig::Unconfigured);
    }

    #[test]
    fn test_sqlite_backend_and_relay() {
        let config = SiteConfig::from_lookup(lookup(&[
            ("PORT", "8080"),
            ("SITE_DATA_DIR", "/var/lib/birthday"),
            ("EMAIL_RELAY_URL", "https://relay.example.com/submit"),
            ("EMAIL_RELAY_KEY", "key"),
            ("ADMIN_PASSWORD", "  s3cret  "),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(
            config.backend,
            BackendConfig::Sqlite {
                data_dir: PathBuf::from("/var/lib/birthday")
            }
        );
        assert_eq!(config.admin_password.as_deref(), Some("s3cret"));
        assert_eq!(config.relay.unwrap().access_key, "key");
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let result = SiteConfig::from_lookup(lookup(&[("PORT", "eighty")]));
        assert!(result.is_err());
    }
}

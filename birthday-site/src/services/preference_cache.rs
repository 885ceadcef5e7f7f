//! Local preferences cache
//!
//! Persists the visitor's last known preferences as a JSON file named
//! after the cache key, so a reload without the backend still shows
//! their choices.

use crate::config::PREFERENCES_CACHE_KEY;
use crate::error::{AppError, Result};
use crate::preferences::Preferences;
use std::path::PathBuf;
use tokio::fs;

#[derive(Clone)]
pub struct PreferenceCache {
    cache_path: PathBuf,
}

impl PreferenceCache {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self {
            cache_path: cache_dir.join(format!("{}.json", PREFERENCES_CACHE_KEY)),
        }
    }

    /// Cached preferences, or `None` when nothing was cached yet
    pub async fn load(&self) -> Result<Option<Preferences>> {
        if !fs::try_exists(&self.cache_path).await? {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.cache_path).await?;
        let prefs: Preferences = serde_json::from_str(&content)
            .map_err(|e| AppError::Generic(format!("Failed to parse cached preferences: {}", e)))?;

        Ok(Some(prefs))
    }

    pub async fn save(&self, prefs: &Preferences) -> Result<()> {
        if let Some(parent) = self.cache_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(prefs)?;
        fs::write(&self.cache_path, content).await?;
        tracing::debug!("Preferences cached to {:?}", self.cache_path);

        Ok(())
    }

    pub async fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.cache_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::Theme;
    use tempfile::TempDir;

    fn create_test_cache() -> (PreferenceCache, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let cache = PreferenceCache::new(temp_dir.path().to_path_buf());
        (cache, temp_dir)
    }

    #[tokio::test]
    async fn test_empty_cache() {
        let (cache, _temp) = create_test_cache();
        assert!(cache.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cache_persistence() {
        let temp_dir = TempDir::new().unwrap();
        let prefs = Preferences {
            volume: 15,
            theme: Theme::Celebration,
            ..Preferences::default()
        };

        {
            let cache = PreferenceCache::new(temp_dir.path().to_path_buf());
            cache.save(&prefs).await.unwrap();
        }

        {
            let cache = PreferenceCache::new(temp_dir.path().to_path_buf());
            assert_eq!(cache.load().await.unwrap(), Some(prefs));
        }

        assert!(temp_dir.path().join("birthday-preferences.json").exists());
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let (cache, _temp) = create_test_cache();
        cache.save(&Preferences::default()).await.unwrap();

        cache.clear().await.unwrap();
        cache.clear().await.unwrap();

        assert!(cache.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_cache_is_an_error() {
        let (cache, temp) = create_test_cache();
        std::fs::write(temp.path().join("birthday-preferences.json"), "{not json").unwrap();

        assert!(cache.load().await.is_err());
    }

    #[tokio::test]
    async fn test_out_of_range_cache_is_an_error() {
        let (cache, temp) = create_test_cache();
        std::fs::write(temp.path().join("birthday-preferences.json"), r#"{"volume":200}"#).unwrap();

        let err = cache.load().await.unwrap_err();
        assert!(err.to_string().contains("Volume must be between 0 and 100"));
    }
}

//! Music playlist service

use crate::config::DEFAULT_TRACK_ARTIST;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub name: String,
    pub url: String,
    pub artist: String,
}

/// Track as submitted by a client; artist is optional
#[derive(Debug, Clone, Deserialize)]
pub struct NewTrack {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub artist: Option<String>,
}

impl NewTrack {
    fn into_track(self) -> Result<Track> {
        let name = self.name.trim().to_string();
        let url = self.url.trim().to_string();
        if name.is_empty() || url.is_empty() {
            return Err(AppError::validation("Track name and url are required"));
        }

        let artist = self
            .artist
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| DEFAULT_TRACK_ARTIST.to_string());

        Ok(Track { name, url, artist })
    }
}

/// Tracks bundled with the site
pub fn default_tracks() -> Vec<Track> {
    [
        ("Birthday Vibes", "/music/birthday-vibes.mp3", "Celebration Mix"),
        ("Chill Moments", "/music/chill-moments.mp3", "Lounge Session"),
        ("Happy Day", "/music/happy-day.mp3", "Good Times Band"),
    ]
    .into_iter()
    .map(|(name, url, artist)| Track {
        name: name.to_string(),
        url: url.to_string(),
        artist: artist.to_string(),
    })
    .collect()
}

#[async_trait]
pub trait PlaylistStore: Send + Sync {
    async fn tracks(&self) -> Result<Vec<Track>>;
    /// Append a track, returning the new playlist
    async fn add(&self, track: NewTrack) -> Result<Vec<Track>>;
    /// Remove every track with this name; `NotFound` if there is none
    async fn remove(&self, name: &str) -> Result<Vec<Track>>;
    /// Replace the playlist with the named tracks in the given order.
    /// Names that match no track are dropped.
    async fn reorder(&self, names: &[String]) -> Result<Vec<Track>>;
}

pub struct InMemoryPlaylist {
    tracks: RwLock<Vec<Track>>,
}

impl InMemoryPlaylist {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self {
            tracks: RwLock::new(tracks),
        }
    }
}

impl Default for InMemoryPlaylist {
    fn default() -> Self {
        Self::new(default_tracks())
    }
}

#[async_trait]
impl PlaylistStore for InMemoryPlaylist {
    async fn tracks(&self) -> Result<Vec<Track>> {
        Ok(self.tracks.read().await.clone())
    }

    async fn add(&self, track: NewTrack) -> Result<Vec<Track>> {
        let track = track.into_track()?;
        let mut tracks = self.tracks.write().await;
        tracing::info!("Adding track {:?} by {}", track.name, track.artist);
        tracks.push(track);
        Ok(tracks.clone())
    }

    async fn remove(&self, name: &str) -> Result<Vec<Track>> {
        let mut tracks = self.tracks.write().await;
        if !tracks.iter().any(|t| t.name == name) {
            return Err(AppError::NotFound(format!("Track not found: {}", name)));
        }

        tracks.retain(|t| t.name != name);
        tracing::info!("Removed track {:?}", name);
        Ok(tracks.clone())
    }

    async fn reorder(&self, names: &[String]) -> Result<Vec<Track>> {
        let mut tracks = self.tracks.write().await;
        let reordered: Vec<Track> = names
            .iter()
            .filter_map(|name| tracks.iter().find(|t| &t.name == name).cloned())
            .collect();

        tracing::info!("Reordered playlist: {} of {} tracks kept", reordered.len(), tracks.len());
        *tracks = reordered;
        Ok(tracks.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_track(name: &str, artist: Option<&str>) -> NewTrack {
        NewTrack {
            name: name.to_string(),
            url: format!("/music/{}.mp3", name.to_lowercase()),
            artist: artist.map(str::to_string),
        }
    }

    fn names(tracks: &[Track]) -> Vec<&str> {
        tracks.iter().map(|t| t.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_add_defaults_artist() {
        let playlist = InMemoryPlaylist::default();

        let tracks = playlist.add(new_track("Encore", None)).await.unwrap();

        let added = tracks.last().unwrap();
        assert_eq!(added.name, "Encore");
        assert_eq!(added.artist, "Custom");
        assert_eq!(playlist.tracks().await.unwrap(), tracks);
    }

    #[tokio::test]
    async fn test_add_requires_name_and_url() {
        let playlist = InMemoryPlaylist::default();
        let before = playlist.tracks().await.unwrap();

        let result = playlist
            .add(NewTrack {
                name: "".to_string(),
                url: "/music/x.mp3".to_string(),
                artist: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(playlist.tracks().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_remove_missing_is_not_found() {
        let playlist = InMemoryPlaylist::default();
        let before = playlist.tracks().await.unwrap();

        let result = playlist.remove("Nope").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert_eq!(playlist.tracks().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_remove() {
        let playlist = InMemoryPlaylist::default();

        let tracks = playlist.remove("Chill Moments").await.unwrap();

        assert_eq!(names(&tracks), vec!["Birthday Vibes", "Happy Day"]);
    }

    #[tokio::test]
    async fn test_reorder_is_exact() {
        let playlist = InMemoryPlaylist::default();

        let order = vec![
            "Chill Moments".to_string(),
            "Ghost Track".to_string(),
            "Birthday Vibes".to_string(),
        ];
        let tracks = playlist.reorder(&order).await.unwrap();

        assert_eq!(names(&tracks), vec!["Chill Moments", "Birthday Vibes"]);
        assert_eq!(playlist.tracks().await.unwrap(), tracks);
    }
}

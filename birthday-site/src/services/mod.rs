//! Services module
//!
//! Stores and gateways behind the HTTP endpoints, plus the local
//! preferences cache used by the preferences resource.

pub mod admin;
pub mod analytics;
pub mod contact;
pub mod email_relay;
pub mod playlist;
pub mod preference_cache;
pub mod preference_store;

pub use admin::AdminGate;
pub use analytics::{AnalyticsEvent, AnalyticsStore, AnalyticsSummary, InMemoryAnalytics, SqliteAnalytics};
pub use contact::{ContactInbox, ContactMessage, InMemoryInbox};
pub use email_relay::{EmailRelay, HttpEmailRelay, UnconfiguredRelay, WishEmail};
pub use playlist::{InMemoryPlaylist, NewTrack, PlaylistStore, Track};
pub use preference_cache::PreferenceCache;
pub use preference_store::{InMemoryPreferences, PreferenceStore};

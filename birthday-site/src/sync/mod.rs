//! Resource hooks
//!
//! Each resource owns a cached copy of one kind of data with its loading
//! and error flags, and decides per [`SyncPolicy`] what to show when the
//! backend misbehaves.

pub mod fallback;
pub mod photos;
pub mod preferences;
pub mod resource;
pub mod site_settings;
pub mod wishes;

pub use fallback::fallback_photos;
pub use photos::PhotoResource;
pub use preferences::PreferencesResource;
pub use resource::{LoadOutcome, ReadFallback, Resource, ResourceState, SyncPolicy, WriteFailure};
pub use site_settings::SettingsResource;
pub use wishes::WishResource;

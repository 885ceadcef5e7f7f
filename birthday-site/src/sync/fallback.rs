//! Bundled gallery shown when no backend is available

use crate::database::Photo;
use chrono::{DateTime, Utc};

const FALLBACK_GALLERY: [(&str, &str); 18] = [
    ("/images/gallery/01-first-smile.jpg", "The first smile"),
    ("/images/gallery/02-baby-steps.jpg", "Baby steps"),
    ("/images/gallery/03-first-birthday.jpg", "First birthday cake"),
    ("/images/gallery/04-beach-day.jpg", "Beach day"),
    ("/images/gallery/05-school-uniform.jpg", "First day of school"),
    ("/images/gallery/06-family-picnic.jpg", "Family picnic"),
    ("/images/gallery/07-sweet-sixteen.jpg", "Sweet sixteen"),
    ("/images/gallery/08-road-trip.jpg", "The great road trip"),
    ("/images/gallery/09-graduation.jpg", "Graduation day"),
    ("/images/gallery/10-best-friends.jpg", "Best friends forever"),
    ("/images/gallery/11-concert-night.jpg", "Concert night"),
    ("/images/gallery/12-mountain-top.jpg", "On top of the world"),
    ("/images/gallery/13-city-lights.jpg", "City lights"),
    ("/images/gallery/14-dinner-party.jpg", "Dinner party"),
    ("/images/gallery/15-sunset-walk.jpg", "Sunset walk"),
    ("/images/gallery/16-dance-floor.jpg", "Owning the dance floor"),
    ("/images/gallery/17-surprise-party.jpg", "The surprise party"),
    ("/images/gallery/18-another-year.jpg", "Here's to another year"),
];

/// The static gallery, in display order
pub fn fallback_photos() -> Vec<Photo> {
    FALLBACK_GALLERY
        .iter()
        .enumerate()
        .map(|(i, (url, caption))| Photo {
            id: format!("fallback-{}", i + 1),
            url: url.to_string(),
            caption: caption.to_string(),
            order_index: i as i64,
            storage_path: None,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        })
        .collect()
}

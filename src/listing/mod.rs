//! Listing domain: drafts, validation, the wizard state machine, and the
//! persisted catalog.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod draft;
pub mod query;
pub mod store;
pub mod validate;
pub mod wizard;

pub use draft::{Draft, DraftStore, Field, FieldValue, ImageSlot, UnknownFieldError};
pub use query::{ListingQuery, SortOrder};
pub use store::{Catalog, CollectionStore, CommitError, JsonFileStore, StoreError};
pub use wizard::{StepController, StepOutcome, ValidationState, WizardStep};

/// Fixed set of listing categories offered in the wizard.
pub const CATEGORIES: &[&str] = &[
    "Apartment",
    "House",
    "Villa",
    "Cabin",
    "Studio",
    "Penthouse",
    "Farmhouse",
    "Guesthouse",
];

/// Maximum accepted size for an uploaded image blob.
pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

/// Whether a listing is offered for rent or for purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingType {
    Rent,
    Purchase,
}

impl ListingType {
    pub fn all() -> &'static [ListingType] {
        &[ListingType::Rent, ListingType::Purchase]
    }

    pub fn label(&self) -> &'static str {
        match self {
            ListingType::Rent => "For rent",
            ListingType::Purchase => "For purchase",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ListingType::Rent => "rent",
            ListingType::Purchase => "purchase",
        }
    }
}

impl fmt::Display for ListingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rent" => Ok(ListingType::Rent),
            "purchase" => Ok(ListingType::Purchase),
            other => Err(format!("unknown listing type '{other}'")),
        }
    }
}

/// Lifecycle status of a committed listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    #[default]
    Active,
    Draft,
    Pending,
}

impl ListingStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ListingStatus::Active => "active",
            ListingStatus::Draft => "draft",
            ListingStatus::Pending => "pending",
        }
    }

    /// Next status in the cycle used by the browser's status key.
    pub fn next(&self) -> ListingStatus {
        match self {
            ListingStatus::Active => ListingStatus::Pending,
            ListingStatus::Pending => ListingStatus::Draft,
            ListingStatus::Draft => ListingStatus::Active,
        }
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One image attached to a listing: either a URL that is taken as already
/// valid, or a local file blob whose MIME type and size the validator checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageRef {
    Url { url: String },
    Blob { mime: String, size_bytes: u64, path: PathBuf },
}

impl ImageRef {
    pub fn url(url: impl Into<String>) -> Self {
        ImageRef::Url { url: url.into() }
    }

    /// Build a blob reference from a local file, reading its size from disk
    /// and guessing the MIME type from the extension. The validator is what
    /// rejects non-image types and oversized files, not this constructor.
    pub fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let size_bytes = std::fs::metadata(path)?.len();
        Ok(ImageRef::Blob {
            mime: mime_for_extension(path),
            size_bytes,
            path: path.to_path_buf(),
        })
    }

    /// Short label for display in forms and summaries.
    pub fn describe(&self) -> String {
        match self {
            ImageRef::Url { url } => url.clone(),
            ImageRef::Blob { path, size_bytes, .. } => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| path.display().to_string());
                format!("{name} ({} KiB)", size_bytes / 1024)
            }
        }
    }
}

fn mime_for_extension(path: &Path) -> String {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
    .to_string()
}

/// A committed listing. Immutable once created except for the explicit
/// status/delete operations on [`Catalog`]; the wizard never touches it
/// again after commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedListing {
    pub id: String,
    pub title: String,
    pub description: String,
    pub city: String,
    pub landmark: String,
    pub category: String,
    pub listing_type: ListingType,
    /// Monthly rent or asking price, kept as the numeric string the draft
    /// carried so committed fields round-trip exactly.
    pub rent: String,
    pub images: [Option<ImageRef>; 3],
    /// Guest capacity as an optional numeric string.
    #[serde(default)]
    pub guests: String,
    #[serde(default)]
    pub amenities: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub status: ListingStatus,
}

impl PersistedListing {
    /// Rent parsed for price comparisons. Committed listings have passed
    /// validation, so a parse failure only happens on hand-edited data and
    /// sorts/filters it as zero.
    pub fn rent_value(&self) -> i64 {
        self.rent.trim().parse().unwrap_or(0)
    }

    /// Guest capacity, if the listing recorded one.
    pub fn guest_capacity(&self) -> Option<u32> {
        let trimmed = self.guests.trim();
        if trimmed.is_empty() {
            None
        } else {
            trimmed.parse().ok()
        }
    }
}

/// Fully-valid committed listing for tests across the crate.
#[cfg(test)]
pub(crate) fn sample_listing() -> PersistedListing {
    PersistedListing {
        id: "test-0001".to_string(),
        title: "Cozy Cabin Retreat".to_string(),
        description: "A lovely 20+ character description here".to_string(),
        city: "Goa".to_string(),
        landmark: "Near the main beach road".to_string(),
        category: "Cabin".to_string(),
        listing_type: ListingType::Rent,
        rent: "1200".to_string(),
        images: [Some(ImageRef::url("https://img.example/cabin.jpg")), None, None],
        guests: String::new(),
        amenities: Vec::new(),
        created_at: Utc::now(),
        status: ListingStatus::Active,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_type_round_trips_through_str() {
        for lt in ListingType::all() {
            assert_eq!(lt.as_str().parse::<ListingType>().unwrap(), *lt);
        }
        assert!("lease".parse::<ListingType>().is_err());
    }

    #[test]
    fn listing_type_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ListingType::Rent).unwrap(), "\"rent\"");
        assert_eq!(
            serde_json::to_string(&ListingType::Purchase).unwrap(),
            "\"purchase\""
        );
    }

    #[test]
    fn status_defaults_to_active() {
        assert_eq!(ListingStatus::default(), ListingStatus::Active);
    }

    #[test]
    fn status_cycle_visits_all_states() {
        let start = ListingStatus::Active;
        let mut seen = vec![start];
        let mut cur = start.next();
        while cur != start {
            seen.push(cur);
            cur = cur.next();
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn mime_guessed_from_extension() {
        assert_eq!(mime_for_extension(Path::new("cabin.JPG")), "image/jpeg");
        assert_eq!(mime_for_extension(Path::new("cabin.png")), "image/png");
        assert_eq!(
            mime_for_extension(Path::new("cabin.pdf")),
            "application/octet-stream"
        );
    }

    #[test]
    fn rent_value_parses_or_zeroes() {
        let mut listing = sample_listing();
        assert_eq!(listing.rent_value(), 1200);
        listing.rent = "not-a-number".to_string();
        assert_eq!(listing.rent_value(), 0);
    }

    #[test]
    fn guest_capacity_empty_is_none() {
        let mut listing = sample_listing();
        assert_eq!(listing.guest_capacity(), None);
        listing.guests = "4".to_string();
        assert_eq!(listing.guest_capacity(), Some(4));
    }
}

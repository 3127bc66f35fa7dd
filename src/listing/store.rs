//! Durable persistence for the listing collection.
//!
//! The durable boundary is whole-collection: one read returning every
//! listing, one write replacing them all. [`Catalog`] layers the commit
//! semantics on top — validate, mint, append, write through, and only then
//! touch the in-memory collection and the draft.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use super::draft::{DraftStore, Field};
use super::query::{ListingQuery, SortOrder};
use super::validate;
use super::{ListingStatus, PersistedListing};

/// Failure at the durable-store boundary. Transient from the caller's point
/// of view: the draft survives and `commit` may simply be retried.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read listing collection: {0}")]
    Read(#[source] std::io::Error),
    #[error("failed to write listing collection: {0}")]
    Write(#[source] std::io::Error),
    #[error("listing collection is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Why a commit did not happen.
#[derive(Debug, Error)]
pub enum CommitError {
    /// The draft does not validate; fix the listed fields and try again.
    /// Nothing was mutated.
    #[error("draft failed validation on {} field(s)", .0.len())]
    Validation(BTreeMap<Field, String>),
    /// The durable write failed; the draft is preserved for retry.
    #[error(transparent)]
    Persistence(#[from] StoreError),
}

/// The durable-store boundary: load the full collection, save the full
/// collection. No partial writes.
pub trait CollectionStore: Send {
    fn load(&self) -> Result<Vec<PersistedListing>, StoreError>;
    fn save(&self, listings: &[PersistedListing]) -> Result<(), StoreError>;
}

/// Production store: pretty-printed JSON in a single file under the data
/// directory.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CollectionStore for JsonFileStore {
    fn load(&self) -> Result<Vec<PersistedListing>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(&self.path).map_err(StoreError::Read)?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn save(&self, listings: &[PersistedListing]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(StoreError::Write)?;
        }
        let contents = serde_json::to_string_pretty(listings)?;
        fs::write(&self.path, contents).map_err(StoreError::Write)
    }
}

/// The listing collection plus its durable store.
pub struct Catalog {
    store: Box<dyn CollectionStore>,
    listings: Vec<PersistedListing>,
}

impl Catalog {
    /// Load the collection through the given store.
    pub fn open(store: Box<dyn CollectionStore>) -> anyhow::Result<Self> {
        let listings = store.load().context("Failed to load listing collection")?;
        tracing::debug!(count = listings.len(), "listing collection loaded");
        Ok(Self { store, listings })
    }

    /// Convenience constructor over a [`JsonFileStore`].
    pub fn open_file(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        Self::open(Box::new(JsonFileStore::new(path)))
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&PersistedListing> {
        self.listings.iter().find(|l| l.id == id)
    }

    /// Read-only projection with filters and sort applied. Never mutates
    /// the collection; safe to call repeatedly.
    pub fn list(&self, query: &ListingQuery, sort: SortOrder) -> Vec<&PersistedListing> {
        query.apply(&self.listings, sort)
    }

    /// Freeze a fully valid draft into a new listing.
    ///
    /// Full validation runs first; on failure nothing is mutated. On
    /// success the new listing is appended and written through the durable
    /// store, and only a successful write resets the draft — a failed
    /// write leaves both the collection and the draft exactly as they
    /// were, so the commit can be retried without data loss.
    pub fn commit(&mut self, drafts: &mut DraftStore) -> Result<PersistedListing, CommitError> {
        let draft = drafts.snapshot();

        let errors = validate::validate_all(&draft);
        if !errors.is_empty() {
            tracing::debug!(fields = errors.len(), "commit refused by validation");
            return Err(CommitError::Validation(errors));
        }

        let amenities = draft.amenity_list();
        let listing = PersistedListing {
            id: mint_id(),
            title: draft.title,
            description: draft.description,
            city: draft.city,
            landmark: draft.landmark,
            category: draft.category,
            // Validation guarantees the type is set.
            listing_type: draft.listing_type.unwrap_or(super::ListingType::Rent),
            rent: draft.rent,
            amenities,
            images: draft.images,
            guests: draft.guests,
            created_at: Utc::now(),
            status: ListingStatus::Active,
        };

        let mut updated = self.listings.clone();
        updated.push(listing.clone());
        self.store.save(&updated)?;

        self.listings = updated;
        drafts.reset();
        tracing::info!(id = %listing.id, title = %listing.title, "listing committed");
        Ok(listing)
    }

    /// Set the status of an existing listing. Write-through with the same
    /// all-or-nothing rule as commit.
    pub fn set_status(&mut self, id: &str, status: ListingStatus) -> Result<bool, StoreError> {
        let Some(pos) = self.listings.iter().position(|l| l.id == id) else {
            return Ok(false);
        };
        let mut updated = self.listings.clone();
        updated[pos].status = status;
        self.store.save(&updated)?;
        self.listings = updated;
        Ok(true)
    }

    /// Remove a listing entirely.
    pub fn remove(&mut self, id: &str) -> Result<bool, StoreError> {
        let mut updated = self.listings.clone();
        let before = updated.len();
        updated.retain(|l| l.id != id);
        if updated.len() == before {
            return Ok(false);
        }
        self.store.save(&updated)?;
        self.listings = updated;
        tracing::info!(%id, "listing removed");
        Ok(true)
    }
}

/// Opaque listing id: millisecond timestamp plus a random suffix. Unique
/// within one collection; nothing more is promised.
fn mint_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", Utc::now().timestamp_millis(), &suffix[..8])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::{FieldValue, ImageRef, ImageSlot, ListingType};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn valid_draft_store() -> DraftStore {
        let mut store = DraftStore::new();
        store.set_field(Field::Title, FieldValue::text("Cozy Cabin Retreat"));
        store.set_field(
            Field::Description,
            FieldValue::text("A lovely 20+ character description here"),
        );
        store.set_field(Field::City, FieldValue::text("Goa"));
        store.set_field(Field::Landmark, FieldValue::text("Near the main beach road"));
        store.set_field(Field::Category, FieldValue::text("Cabin"));
        store.set_field(Field::ListingType, FieldValue::Choice(Some(ListingType::Rent)));
        store.set_field(Field::Rent, FieldValue::text("1200"));
        store.set_field(
            Field::Image(ImageSlot::First),
            FieldValue::Image(Some(ImageRef::url("https://img.example/cabin.jpg"))),
        );
        store
    }

    /// In-memory store whose saves can be made to fail on demand.
    struct FlakyStore {
        fail: Arc<AtomicBool>,
    }

    impl CollectionStore for FlakyStore {
        fn load(&self) -> Result<Vec<PersistedListing>, StoreError> {
            Ok(Vec::new())
        }

        fn save(&self, _listings: &[PersistedListing]) -> Result<(), StoreError> {
            if self.fail.load(Ordering::SeqCst) {
                Err(StoreError::Write(std::io::Error::other("disk full")))
            } else {
                Ok(())
            }
        }
    }

    fn flaky_catalog(fail: &Arc<AtomicBool>) -> Catalog {
        Catalog::open(Box::new(FlakyStore { fail: Arc::clone(fail) })).unwrap()
    }

    #[test]
    fn commit_of_valid_draft_appends_and_resets() {
        let mut drafts = valid_draft_store();
        let snapshot = drafts.snapshot();
        let fail = Arc::new(AtomicBool::new(false));
        let mut catalog = flaky_catalog(&fail);

        let listing = catalog.commit(&mut drafts).unwrap();

        assert!(!listing.id.is_empty());
        assert_eq!(listing.status, ListingStatus::Active);
        assert_eq!(listing.title, snapshot.title);
        assert_eq!(listing.description, snapshot.description);
        assert_eq!(listing.city, snapshot.city);
        assert_eq!(listing.rent, snapshot.rent);
        assert_eq!(listing.listing_type, ListingType::Rent);
        assert_eq!(catalog.len(), 1);
        assert!(drafts.snapshot().is_empty());
    }

    #[test]
    fn commit_refuses_invalid_draft_without_mutation() {
        let mut drafts = valid_draft_store();
        drafts.set_field(Field::Rent, FieldValue::text("banana"));
        let before = drafts.snapshot();
        let fail = Arc::new(AtomicBool::new(false));
        let mut catalog = flaky_catalog(&fail);

        let err = catalog.commit(&mut drafts).unwrap_err();
        match err {
            CommitError::Validation(errors) => assert!(errors.contains_key(&Field::Rent)),
            CommitError::Persistence(_) => panic!("expected validation failure"),
        }
        assert_eq!(catalog.len(), 0);
        assert_eq!(drafts.snapshot(), before);
    }

    #[test]
    fn failed_write_preserves_draft_and_collection() {
        let mut drafts = valid_draft_store();
        let before = drafts.snapshot();
        let fail = Arc::new(AtomicBool::new(true));
        let mut catalog = flaky_catalog(&fail);

        let err = catalog.commit(&mut drafts).unwrap_err();
        assert!(matches!(err, CommitError::Persistence(_)));
        assert_eq!(catalog.len(), 0);
        assert_eq!(drafts.snapshot(), before);

        // Storage recovers; the same draft commits cleanly.
        fail.store(false, Ordering::SeqCst);
        let listing = catalog.commit(&mut drafts).unwrap();
        assert_eq!(listing.title, before.title);
        assert_eq!(catalog.len(), 1);
        assert!(drafts.snapshot().is_empty());
    }

    #[test]
    fn json_store_round_trips_through_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("listings.json");

        let mut drafts = valid_draft_store();
        let mut catalog = Catalog::open_file(&path).unwrap();
        let committed = catalog.commit(&mut drafts).unwrap();

        let reloaded = Catalog::open_file(&path).unwrap();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.get(&committed.id).unwrap(), &committed);
    }

    #[test]
    fn missing_file_loads_as_empty_collection() {
        let dir = TempDir::new().unwrap();
        let catalog = Catalog::open_file(dir.path().join("never-written.json")).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn corrupt_file_is_a_load_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("listings.json");
        std::fs::write(&path, "{{ not json").unwrap();
        assert!(Catalog::open_file(&path).is_err());
    }

    #[test]
    fn set_status_and_remove_write_through() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("listings.json");

        let mut drafts = valid_draft_store();
        let mut catalog = Catalog::open_file(&path).unwrap();
        let committed = catalog.commit(&mut drafts).unwrap();

        assert!(catalog.set_status(&committed.id, ListingStatus::Pending).unwrap());
        assert!(!catalog.set_status("no-such-id", ListingStatus::Pending).unwrap());

        let reloaded = Catalog::open_file(&path).unwrap();
        assert_eq!(reloaded.get(&committed.id).unwrap().status, ListingStatus::Pending);

        assert!(catalog.remove(&committed.id).unwrap());
        assert!(!catalog.remove(&committed.id).unwrap());
        assert!(Catalog::open_file(&path).unwrap().is_empty());
    }

    #[test]
    fn minted_ids_are_unique_and_opaque() {
        let a = mint_id();
        let b = mint_id();
        assert_ne!(a, b);
        assert!(a.contains('-'));
    }
}

//! The draft store: mutable in-progress listing state for the active wizard
//! session. One draft per session; validation never happens here, it is
//! pulled by the step controller and the catalog at advance/commit time.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::{ImageRef, ListingType};

/// One of the three image slots on a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ImageSlot {
    First,
    Second,
    Third,
}

impl ImageSlot {
    pub fn all() -> &'static [ImageSlot] {
        &[ImageSlot::First, ImageSlot::Second, ImageSlot::Third]
    }

    pub fn index(self) -> usize {
        match self {
            ImageSlot::First => 0,
            ImageSlot::Second => 1,
            ImageSlot::Third => 2,
        }
    }
}

/// A draft field. Closed enum rather than a string-keyed bag so a typo in
/// an integration is a compile error, not a silent miss; the string
/// boundary for UI layers lives in [`Field::from_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Title,
    Description,
    City,
    Landmark,
    Category,
    ListingType,
    Rent,
    Guests,
    Amenities,
    Image(ImageSlot),
}

impl Field {
    /// Every field, in the order full validation reports them.
    pub fn all() -> &'static [Field] {
        &[
            Field::Title,
            Field::Description,
            Field::City,
            Field::Landmark,
            Field::Category,
            Field::ListingType,
            Field::Rent,
            Field::Guests,
            Field::Amenities,
            Field::Image(ImageSlot::First),
            Field::Image(ImageSlot::Second),
            Field::Image(ImageSlot::Third),
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Description => "description",
            Field::City => "city",
            Field::Landmark => "landmark",
            Field::Category => "category",
            Field::ListingType => "listing_type",
            Field::Rent => "rent",
            Field::Guests => "guests",
            Field::Amenities => "amenities",
            Field::Image(ImageSlot::First) => "image_1",
            Field::Image(ImageSlot::Second) => "image_2",
            Field::Image(ImageSlot::Third) => "image_3",
        }
    }

    /// Human label used by forms and error listings.
    pub fn label(&self) -> &'static str {
        match self {
            Field::Title => "Title",
            Field::Description => "Description",
            Field::City => "City",
            Field::Landmark => "Landmark",
            Field::Category => "Category",
            Field::ListingType => "Listing type",
            Field::Rent => "Rent",
            Field::Guests => "Guests",
            Field::Amenities => "Amenities",
            Field::Image(ImageSlot::First) => "Photo 1",
            Field::Image(ImageSlot::Second) => "Photo 2",
            Field::Image(ImageSlot::Third) => "Photo 3",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Referencing a field by a name the draft does not have. This is a caller
/// bug, not user input, so it surfaces as a hard error rather than an
/// inline validation message.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown draft field '{0}'")]
pub struct UnknownFieldError(pub String);

impl FromStr for Field {
    type Err = UnknownFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let field = match s {
            "title" => Field::Title,
            "description" => Field::Description,
            "city" => Field::City,
            "landmark" => Field::Landmark,
            "category" => Field::Category,
            "listing_type" => Field::ListingType,
            "rent" => Field::Rent,
            "guests" => Field::Guests,
            "amenities" => Field::Amenities,
            "image_1" => Field::Image(ImageSlot::First),
            "image_2" => Field::Image(ImageSlot::Second),
            "image_3" => Field::Image(ImageSlot::Third),
            other => return Err(UnknownFieldError(other.to_string())),
        };
        Ok(field)
    }
}

/// A value being written into a draft field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Choice(Option<ListingType>),
    Image(Option<ImageRef>),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }
}

/// The in-progress listing. All fields start empty; `category` and the
/// numeric fields stay plain strings until validation looks at them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Draft {
    pub title: String,
    pub description: String,
    pub city: String,
    pub landmark: String,
    pub category: String,
    pub listing_type: Option<ListingType>,
    pub rent: String,
    pub guests: String,
    /// Comma-separated amenity names as typed; parsed at commit.
    pub amenities: String,
    pub images: [Option<ImageRef>; 3],
}

impl Draft {
    pub fn image(&self, slot: ImageSlot) -> Option<&ImageRef> {
        self.images[slot.index()].as_ref()
    }

    /// Amenities split out of the comma-separated raw value.
    pub fn amenity_list(&self) -> Vec<String> {
        self.amenities
            .split(',')
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(ToString::to_string)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        *self == Draft::default()
    }
}

/// Owns the single active [`Draft`]. Constructor-injected into the wizard's
/// composition root; there is no global draft.
#[derive(Debug, Default)]
pub struct DraftStore {
    draft: Draft,
}

impl DraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite a field unconditionally. Always succeeds and never
    /// validates. A value of the wrong shape for the field (for example a
    /// `Choice` written to `title`) is dropped with a warning, since the
    /// write cannot mean anything.
    pub fn set_field(&mut self, field: Field, value: FieldValue) {
        match (field, value) {
            (Field::Title, FieldValue::Text(v)) => self.draft.title = v,
            (Field::Description, FieldValue::Text(v)) => self.draft.description = v,
            (Field::City, FieldValue::Text(v)) => self.draft.city = v,
            (Field::Landmark, FieldValue::Text(v)) => self.draft.landmark = v,
            (Field::Category, FieldValue::Text(v)) => self.draft.category = v,
            (Field::Rent, FieldValue::Text(v)) => self.draft.rent = v,
            (Field::Guests, FieldValue::Text(v)) => self.draft.guests = v,
            (Field::Amenities, FieldValue::Text(v)) => self.draft.amenities = v,
            (Field::ListingType, FieldValue::Choice(v)) => self.draft.listing_type = v,
            (Field::Image(slot), FieldValue::Image(v)) => {
                self.draft.images[slot.index()] = v;
            }
            (field, value) => {
                tracing::warn!(%field, ?value, "dropped mismatched field write");
            }
        }
    }

    /// Restore every field to its empty default. Idempotent; used after a
    /// successful commit and on explicit cancel.
    pub fn reset(&mut self) {
        self.draft = Draft::default();
    }

    /// An owned copy of the current draft. Callers never observe later
    /// mutation through it.
    pub fn snapshot(&self) -> Draft {
        self.draft.clone()
    }
}

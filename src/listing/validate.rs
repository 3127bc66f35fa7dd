//! Pure field validation. Every function maps a draft snapshot to error
//! messages without touching any state, so calling twice with the same
//! input always yields the same output.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use super::draft::{Draft, Field, ImageSlot};
use super::wizard::WizardStep;
use super::{CATEGORIES, MAX_IMAGE_BYTES};

/// Ordered field → message map for one validation pass. Empty means valid.
pub type FieldErrors = BTreeMap<Field, String>;

static TITLE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^[A-Za-z0-9 .,'"&()!?:;\-]+$"#).expect("title pattern"));

static CITY_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\p{L} '\-]+$").expect("city pattern"));

/// Fields a given step gates on. The first two steps check only their own
/// fields; the review step re-checks everything before commit.
pub fn step_fields(step: WizardStep) -> &'static [Field] {
    match step {
        WizardStep::Basics => &[
            Field::Title,
            Field::Description,
            Field::Image(ImageSlot::First),
            Field::ListingType,
        ],
        WizardStep::Details => &[Field::Category, Field::ListingType],
        WizardStep::Review => Field::all(),
    }
}

/// Validate the subset of fields belonging to `step`.
pub fn validate_step(step: WizardStep, draft: &Draft) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for field in step_fields(step) {
        if let Some(message) = validate_field(*field, draft) {
            errors.insert(*field, message);
        }
    }
    errors
}

/// Validate the whole draft, i.e. the review step's gate.
pub fn validate_all(draft: &Draft) -> FieldErrors {
    validate_step(WizardStep::Review, draft)
}

/// Validate a single field against the draft snapshot. `None` means the
/// field passes.
pub fn validate_field(field: Field, draft: &Draft) -> Option<String> {
    match field {
        Field::Title => validate_title(&draft.title),
        Field::Description => validate_description(&draft.description),
        Field::City => validate_city(&draft.city),
        Field::Landmark => validate_landmark(&draft.landmark),
        Field::Category => validate_category(&draft.category),
        Field::ListingType => {
            if draft.listing_type.is_none() {
                Some("Select whether the listing is for rent or purchase".to_string())
            } else {
                None
            }
        }
        Field::Rent => validate_rent(&draft.rent),
        Field::Guests => validate_guests(&draft.guests),
        // Free-form tags; nothing to check.
        Field::Amenities => None,
        Field::Image(slot) => validate_image(slot, draft),
    }
}

fn validate_title(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some("Title is required".to_string());
    }
    if trimmed.len() < 5 || trimmed.len() > 100 {
        return Some("Title must be 5-100 characters".to_string());
    }
    if !TITLE_CHARS.is_match(trimmed) {
        return Some("Title may only use letters, digits and basic punctuation".to_string());
    }
    None
}

fn validate_description(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some("Description is required".to_string());
    }
    if trimmed.len() < 20 || trimmed.len() > 1000 {
        return Some("Description must be 20-1000 characters".to_string());
    }
    None
}

fn validate_city(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some("City is required".to_string());
    }
    if trimmed.chars().count() < 2 || trimmed.chars().count() > 50 {
        return Some("City must be 2-50 characters".to_string());
    }
    if !CITY_CHARS.is_match(trimmed) {
        return Some("City may only use letters, spaces, hyphens and apostrophes".to_string());
    }
    None
}

fn validate_landmark(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some("Landmark is required".to_string());
    }
    if trimmed.len() < 5 || trimmed.len() > 100 {
        return Some("Landmark must be 5-100 characters".to_string());
    }
    None
}

fn validate_category(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some("Pick a category".to_string());
    }
    if !CATEGORIES.contains(&trimmed) {
        return Some(format!("'{trimmed}' is not one of the offered categories"));
    }
    None
}

fn validate_rent(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some("Rent is required".to_string());
    }
    let Ok(amount) = trimmed.parse::<i64>() else {
        return Some("Rent must be a whole number".to_string());
    };
    if !(100..=100_000).contains(&amount) {
        return Some("Rent must be between 100 and 100000".to_string());
    }
    None
}

fn validate_guests(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        // Optional field.
        return None;
    }
    let Ok(count) = trimmed.parse::<u32>() else {
        return Some("Guest capacity must be a whole number".to_string());
    };
    if !(1..=50).contains(&count) {
        return Some("Guest capacity must be between 1 and 50".to_string());
    }
    None
}

fn validate_image(slot: ImageSlot, draft: &Draft) -> Option<String> {
    match draft.image(slot) {
        None => {
            if slot == ImageSlot::First {
                Some("A primary photo is required".to_string())
            } else {
                None
            }
        }
        // Pre-existing URLs are treated as already valid.
        Some(super::ImageRef::Url { .. }) => None,
        Some(super::ImageRef::Blob { mime, size_bytes, .. }) => {
            if !mime.starts_with("image/") {
                return Some(format!("'{mime}' is not an image type"));
            }
            if *size_bytes > MAX_IMAGE_BYTES {
                return Some("Photo is larger than 5 MiB".to_string());
            }
            None
        }
    }
}

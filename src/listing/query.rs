//! Read-only projection over the listing collection: AND-combined filters
//! plus a stable sort.

use std::fmt;

use clap::ValueEnum;

use super::PersistedListing;

/// Display ordering. `newest`/`oldest` compare creation time; ties keep
/// insertion order (the sorts are stable).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    PriceAsc,
    PriceDesc,
    TitleAsc,
}

impl SortOrder {
    pub fn all() -> &'static [SortOrder] {
        &[
            SortOrder::Newest,
            SortOrder::Oldest,
            SortOrder::PriceAsc,
            SortOrder::PriceDesc,
            SortOrder::TitleAsc,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortOrder::Newest => "newest",
            SortOrder::Oldest => "oldest",
            SortOrder::PriceAsc => "price ↑",
            SortOrder::PriceDesc => "price ↓",
            SortOrder::TitleAsc => "title",
        }
    }

    /// Next order in the cycle used by the browser's sort key.
    pub fn next(&self) -> SortOrder {
        let all = Self::all();
        let pos = all.iter().position(|s| s == self).unwrap_or(0);
        all[(pos + 1) % all.len()]
    }
}

// Written as the CLI value names so clap defaults render correctly.
impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SortOrder::Newest => "newest",
            SortOrder::Oldest => "oldest",
            SortOrder::PriceAsc => "price-asc",
            SortOrder::PriceDesc => "price-desc",
            SortOrder::TitleAsc => "title-asc",
        };
        f.write_str(name)
    }
}

/// Filters for [`super::Catalog::list`]. Every populated filter must match
/// (AND); `None` or an empty value means no constraint on that dimension.
#[derive(Debug, Clone, Default)]
pub struct ListingQuery {
    /// Case-insensitive substring match on the city.
    pub city_contains: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    /// Minimum guest capacity. Listings that never recorded a capacity do
    /// not match when this is set.
    pub min_guests: Option<u32>,
    /// Every named amenity must be present on the listing.
    pub required_amenities: Vec<String>,
}

impl ListingQuery {
    pub fn is_unconstrained(&self) -> bool {
        self.city_contains.as_deref().map_or(true, |c| c.trim().is_empty())
            && self.category.as_deref().map_or(true, |c| c.trim().is_empty())
            && self.min_price.is_none()
            && self.max_price.is_none()
            && self.min_guests.is_none()
            && self.required_amenities.is_empty()
    }

    pub fn matches(&self, listing: &PersistedListing) -> bool {
        if let Some(needle) = self.city_contains.as_deref() {
            let needle = needle.trim();
            if !needle.is_empty()
                && !listing.city.to_lowercase().contains(&needle.to_lowercase())
            {
                return false;
            }
        }
        if let Some(category) = self.category.as_deref() {
            if !category.trim().is_empty() && listing.category != category.trim() {
                return false;
            }
        }
        if let Some(min) = self.min_price {
            if listing.rent_value() < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if listing.rent_value() > max {
                return false;
            }
        }
        if let Some(min_guests) = self.min_guests {
            match listing.guest_capacity() {
                Some(capacity) if capacity >= min_guests => {}
                _ => return false,
            }
        }
        for amenity in &self.required_amenities {
            if !listing.amenities.iter().any(|a| a == amenity) {
                return false;
            }
        }
        true
    }

    /// Filter and sort, returning references in display order. The input
    /// slice is the collection in insertion order and is never mutated.
    pub fn apply<'a>(
        &self,
        listings: &'a [PersistedListing],
        sort: SortOrder,
    ) -> Vec<&'a PersistedListing> {
        let mut matched: Vec<&PersistedListing> =
            listings.iter().filter(|l| self.matches(l)).collect();

        // Vec::sort_by is stable, which is what keeps insertion order on ties.
        match sort {
            SortOrder::Newest => matched.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortOrder::Oldest => matched.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            SortOrder::PriceAsc => matched.sort_by_key(|l| l.rent_value()),
            SortOrder::PriceDesc => matched.sort_by(|a, b| b.rent_value().cmp(&a.rent_value())),
            SortOrder::TitleAsc => {
                matched.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));
            }
        }
        matched
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::itinerary::ListingWithCreator;

pub const DEFAULT_COLLECTION_TITLE: &str = "Untitled Collection";

/// A creator-curated, ordered grouping of listings referenced by id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarketplaceCollection {
    pub id: Uuid,
    pub creator_id: Uuid,
    pub title: String,
    pub description: String,
    pub cover_image: String,
    pub itinerary_ids: Vec<Uuid>,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied fields for a new collection. Missing fields fall back to defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewCollection {
    pub title: Option<String>,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub itinerary_ids: Option<Vec<Uuid>>,
}

/// A new collection with every default applied, ready to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionDraft {
    pub title: String,
    pub description: String,
    pub cover_image: String,
    pub itinerary_ids: Vec<Uuid>,
}

impl NewCollection {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn resolve(self, default_cover_image: &str) -> CollectionDraft {
        CollectionDraft {
            title: self
                .title
                .unwrap_or_else(|| DEFAULT_COLLECTION_TITLE.to_string()),
            description: self.description.unwrap_or_default(),
            cover_image: self
                .cover_image
                .unwrap_or_else(|| default_cover_image.to_string()),
            itinerary_ids: self.itinerary_ids.unwrap_or_default(),
        }
    }
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectionPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub itinerary_ids: Option<Vec<Uuid>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i32>,
}

impl CollectionPatch {
    pub fn apply(self, collection: &mut MarketplaceCollection, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            collection.title = title;
        }
        if let Some(description) = self.description {
            collection.description = description;
        }
        if let Some(cover_image) = self.cover_image {
            collection.cover_image = cover_image;
        }
        if let Some(ids) = self.itinerary_ids {
            collection.itinerary_ids = ids;
        }
        if let Some(order) = self.sort_order {
            collection.sort_order = order;
        }
        collection.updated_at = now;
    }
}

/// Collection with its member ids resolved into full listings, in member order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollectionWithItineraries {
    #[serde(flatten)]
    pub collection: MarketplaceCollection,
    pub itineraries: Vec<ListingWithCreator>,
}

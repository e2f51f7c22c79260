use async_trait::async_trait;
use roam_shared::{
    CollectionDraft, CollectionPatch, ListingWithCreator, MarketplaceCollection, MarketplaceCreator,
    Profile, ProfilePatch,
};
use uuid::Uuid;

use crate::filter::MarketplaceQuery;
use crate::subscription::ProfileSubscription;
use crate::CoreResult;

/// Repository trait for marketplace listings. Every listing comes back joined with its creator.
#[async_trait]
pub trait ItineraryRepository: Send + Sync {
    async fn search(&self, query: &MarketplaceQuery) -> CoreResult<Vec<ListingWithCreator>>;

    async fn featured(&self, limit: i64) -> CoreResult<Vec<ListingWithCreator>>;

    /// Trending listings, most viewed first.
    async fn trending(&self, limit: i64) -> CoreResult<Vec<ListingWithCreator>>;

    /// Batched id-in-set lookup. Order of the result is unspecified.
    async fn find_by_ids(&self, ids: &[Uuid]) -> CoreResult<Vec<ListingWithCreator>>;
}

#[async_trait]
pub trait CreatorRepository: Send + Sync {
    /// Creators ordered by rating, best first.
    async fn top_creators(&self, limit: i64) -> CoreResult<Vec<MarketplaceCreator>>;
}

#[async_trait]
pub trait CollectionRepository: Send + Sync {
    /// All collections, ascending sort order.
    async fn list_collections(&self) -> CoreResult<Vec<MarketplaceCollection>>;

    async fn list_for_creator(&self, creator_id: Uuid) -> CoreResult<Vec<MarketplaceCollection>>;

    /// Inserts with `sort_order` one past the creator's current maximum (or 0).
    /// Implementations must assign the order atomically with the insert.
    async fn create_collection(
        &self,
        creator_id: Uuid,
        draft: CollectionDraft,
    ) -> CoreResult<MarketplaceCollection>;

    async fn update_collection(
        &self,
        id: Uuid,
        patch: CollectionPatch,
    ) -> CoreResult<Option<MarketplaceCollection>>;

    /// Returns whether a row was removed.
    async fn delete_collection(&self, id: Uuid) -> CoreResult<bool>;
}

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn get_profile(&self, id: Uuid) -> CoreResult<Option<Profile>>;

    /// Applies the patch and stamps `updated_at`. `None` when no row has this id.
    async fn update_profile(&self, id: Uuid, patch: ProfilePatch) -> CoreResult<Option<Profile>>;

    /// Change feed scoped to a single profile row.
    async fn subscribe(&self, id: Uuid) -> CoreResult<ProfileSubscription>;
}

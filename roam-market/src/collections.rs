use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use roam_core::repository::{CollectionRepository, ItineraryRepository};
use roam_shared::{CollectionPatch, CollectionWithItineraries, MarketplaceCollection, NewCollection};

use crate::marketplace::resolve_collections;
use crate::state::{Loadable, MutationStatus};

/// Create/update/delete of collections plus the per-creator collection view.
///
/// Failures never propagate to callers: operations return `None`/`false` and
/// the message is kept in [`MutationStatus`].
pub struct CollectionManager {
    collections: Arc<dyn CollectionRepository>,
    itineraries: Arc<dyn ItineraryRepository>,
    default_cover_image: String,
    status: watch::Sender<MutationStatus>,
    creator_collections: watch::Sender<Loadable<Vec<CollectionWithItineraries>>>,
}

impl CollectionManager {
    pub fn new(
        collections: Arc<dyn CollectionRepository>,
        itineraries: Arc<dyn ItineraryRepository>,
        default_cover_image: impl Into<String>,
    ) -> Self {
        let (status, _) = watch::channel(MutationStatus::default());
        let (creator_collections, _) = watch::channel(Loadable::default());
        Self {
            collections,
            itineraries,
            default_cover_image: default_cover_image.into(),
            status,
            creator_collections,
        }
    }

    /// Creates a collection one past the creator's highest sort order (0 for the first).
    pub async fn create_collection(
        &self,
        creator_id: Uuid,
        data: NewCollection,
    ) -> Option<MarketplaceCollection> {
        self.status.send_modify(|s| s.begin());
        let draft = data.resolve(&self.default_cover_image);

        match self.collections.create_collection(creator_id, draft).await {
            Ok(collection) => {
                info!(
                    "Created collection {} for creator {} at position {}",
                    collection.id, creator_id, collection.sort_order
                );
                self.status.send_modify(|s| s.finish(None));
                Some(collection)
            }
            Err(e) => {
                error!("Error creating collection: {}", e);
                self.status.send_modify(|s| s.finish(Some(e.to_string())));
                None
            }
        }
    }

    pub async fn update_collection(
        &self,
        id: Uuid,
        patch: CollectionPatch,
    ) -> Option<MarketplaceCollection> {
        self.status.send_modify(|s| s.begin());

        match self.collections.update_collection(id, patch).await {
            Ok(Some(collection)) => {
                self.status.send_modify(|s| s.finish(None));
                Some(collection)
            }
            Ok(None) => {
                warn!("Collection {} not found for update", id);
                self.status
                    .send_modify(|s| s.missing(format!("Collection {} not found", id)));
                None
            }
            Err(e) => {
                error!("Error updating collection: {}", e);
                self.status.send_modify(|s| s.finish(Some(e.to_string())));
                None
            }
        }
    }

    /// Deletes unconditionally; succeeds even when no row had this id.
    pub async fn delete_collection(&self, id: Uuid) -> bool {
        self.status.send_modify(|s| s.begin());

        match self.collections.delete_collection(id).await {
            Ok(removed) => {
                if !removed {
                    debug!("Delete of collection {} matched no row", id);
                }
                self.status.send_modify(|s| s.finish(None));
                true
            }
            Err(e) => {
                error!("Error deleting collection: {}", e);
                self.status.send_modify(|s| s.finish(Some(e.to_string())));
                false
            }
        }
    }

    /// Loads a creator's collections with members resolved.
    pub async fn load_creator_collections(
        &self,
        creator_id: Uuid,
    ) -> Option<Vec<CollectionWithItineraries>> {
        self.creator_collections.send_modify(|s| s.begin());

        let result = match self.collections.list_for_creator(creator_id).await {
            Ok(collections) => resolve_collections(self.itineraries.as_ref(), collections).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(resolved) => {
                self.creator_collections
                    .send_modify(|s| s.succeed(resolved.clone()));
                Some(resolved)
            }
            Err(e) => {
                error!("Error fetching creator collections: {}", e);
                self.creator_collections
                    .send_modify(|s| s.fail(e.to_string()));
                None
            }
        }
    }

    pub fn status(&self) -> MutationStatus {
        self.status.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.status.borrow().loading
    }

    pub fn error(&self) -> Option<String> {
        self.status.borrow().error.clone()
    }

    pub fn creator_collections(&self) -> Loadable<Vec<CollectionWithItineraries>> {
        self.creator_collections.borrow().clone()
    }
}

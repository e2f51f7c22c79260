//! In-process backend implementing every repository trait.
//!
//! Used by tests and local development. Row changes to profiles are published
//! on a broadcast channel the same way the Postgres trigger publishes them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{broadcast, mpsc, Mutex};
use uuid::Uuid;

use roam_core::repository::{
    CollectionRepository, CreatorRepository, ItineraryRepository, ProfileRepository,
};
use roam_core::{CoreError, CoreResult, MarketplaceQuery, ProfileSubscription, SortKey};
use roam_shared::{
    CollectionDraft, CollectionPatch, ListingWithCreator, MarketplaceCollection, MarketplaceCreator,
    MarketplaceItinerary, Profile, ProfileChange, ProfilePatch,
};

#[derive(Default)]
struct MemoryState {
    itineraries: Vec<MarketplaceItinerary>,
    creators: HashMap<Uuid, MarketplaceCreator>,
    collections: Vec<MarketplaceCollection>,
    profiles: HashMap<Uuid, Profile>,
}

impl MemoryState {
    fn join(&self, itinerary: &MarketplaceItinerary) -> ListingWithCreator {
        ListingWithCreator {
            itinerary: itinerary.clone(),
            creator: self.creators.get(&itinerary.creator_id).cloned(),
        }
    }
}

pub struct InMemoryStore {
    state: Mutex<MemoryState>,
    changes: broadcast::Sender<ProfileChange>,
    offline: AtomicBool,
    id_lookups: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(64);
        Self {
            state: Mutex::new(MemoryState::default()),
            changes,
            offline: AtomicBool::new(false),
            id_lookups: AtomicUsize::new(0),
        }
    }

    /// While offline every repository call fails with a backend error.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of `find_by_ids` round trips served so far.
    pub fn id_lookups(&self) -> usize {
        self.id_lookups.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> CoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(CoreError::BackendError("memory store is offline".to_string()));
        }
        Ok(())
    }

    pub async fn insert_itinerary(&self, itinerary: MarketplaceItinerary) {
        self.state.lock().await.itineraries.push(itinerary);
    }

    pub async fn insert_creator(&self, creator: MarketplaceCreator) {
        self.state.lock().await.creators.insert(creator.id, creator);
    }

    pub async fn insert_collection(&self, collection: MarketplaceCollection) {
        self.state.lock().await.collections.push(collection);
    }

    pub async fn insert_profile(&self, profile: Profile) {
        self.state.lock().await.profiles.insert(profile.id, profile);
    }

    /// Removes a profile and notifies subscribers.
    pub async fn delete_profile(&self, id: Uuid) -> bool {
        let removed = self.state.lock().await.profiles.remove(&id).is_some();
        if removed {
            let _ = self.changes.send(ProfileChange::Deleted(id));
        }
        removed
    }

    async fn flagged(
        &self,
        flag: impl Fn(&MarketplaceItinerary) -> bool,
        sort: impl Fn(&MarketplaceItinerary, &MarketplaceItinerary) -> std::cmp::Ordering,
        limit: i64,
    ) -> CoreResult<Vec<ListingWithCreator>> {
        self.check_online()?;
        let state = self.state.lock().await;
        let mut hits: Vec<&MarketplaceItinerary> =
            state.itineraries.iter().filter(|i| flag(i)).collect();
        hits.sort_by(|a, b| sort(a, b));
        Ok(hits
            .into_iter()
            .take(limit.max(0) as usize)
            .map(|i| state.join(i))
            .collect())
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ItineraryRepository for InMemoryStore {
    async fn search(&self, query: &MarketplaceQuery) -> CoreResult<Vec<ListingWithCreator>> {
        self.check_online()?;
        let state = self.state.lock().await;
        let mut hits: Vec<&MarketplaceItinerary> =
            state.itineraries.iter().filter(|i| query.matches(i)).collect();
        hits.sort_by(|a, b| query.filters.sort_by.compare(a, b));
        Ok(hits.into_iter().map(|i| state.join(i)).collect())
    }

    async fn featured(&self, limit: i64) -> CoreResult<Vec<ListingWithCreator>> {
        self.flagged(|i| i.is_featured, |a, b| SortKey::Popular.compare(a, b), limit)
            .await
    }

    async fn trending(&self, limit: i64) -> CoreResult<Vec<ListingWithCreator>> {
        self.flagged(
            |i| i.is_trending,
            |a, b| b.view_count.unwrap_or(-1).cmp(&a.view_count.unwrap_or(-1)),
            limit,
        )
        .await
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> CoreResult<Vec<ListingWithCreator>> {
        self.check_online()?;
        self.id_lookups.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().await;
        Ok(state
            .itineraries
            .iter()
            .filter(|i| ids.contains(&i.id))
            .map(|i| state.join(i))
            .collect())
    }
}

#[async_trait]
impl CreatorRepository for InMemoryStore {
    async fn top_creators(&self, limit: i64) -> CoreResult<Vec<MarketplaceCreator>> {
        self.check_online()?;
        let state = self.state.lock().await;
        let mut creators: Vec<MarketplaceCreator> = state.creators.values().cloned().collect();
        creators.sort_by(|a, b| b.rating.total_cmp(&a.rating).then(a.id.cmp(&b.id)));
        creators.truncate(limit.max(0) as usize);
        Ok(creators)
    }
}

#[async_trait]
impl CollectionRepository for InMemoryStore {
    async fn list_collections(&self) -> CoreResult<Vec<MarketplaceCollection>> {
        self.check_online()?;
        let mut collections = self.state.lock().await.collections.clone();
        collections.sort_by_key(|c| (c.sort_order, c.created_at));
        Ok(collections)
    }

    async fn list_for_creator(&self, creator_id: Uuid) -> CoreResult<Vec<MarketplaceCollection>> {
        let mut collections = self.list_collections().await?;
        collections.retain(|c| c.creator_id == creator_id);
        Ok(collections)
    }

    async fn create_collection(
        &self,
        creator_id: Uuid,
        draft: CollectionDraft,
    ) -> CoreResult<MarketplaceCollection> {
        self.check_online()?;
        // The lock spans read-max and insert, so the order assignment is atomic
        let mut state = self.state.lock().await;
        let sort_order = state
            .collections
            .iter()
            .filter(|c| c.creator_id == creator_id)
            .map(|c| c.sort_order)
            .max()
            .map_or(0, |max| max + 1);

        let now = Utc::now();
        let collection = MarketplaceCollection {
            id: Uuid::new_v4(),
            creator_id,
            title: draft.title,
            description: draft.description,
            cover_image: draft.cover_image,
            itinerary_ids: draft.itinerary_ids,
            sort_order,
            created_at: now,
            updated_at: now,
        };
        state.collections.push(collection.clone());
        Ok(collection)
    }

    async fn update_collection(
        &self,
        id: Uuid,
        patch: CollectionPatch,
    ) -> CoreResult<Option<MarketplaceCollection>> {
        self.check_online()?;
        let mut state = self.state.lock().await;
        let Some(collection) = state.collections.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        patch.apply(collection, Utc::now());
        Ok(Some(collection.clone()))
    }

    async fn delete_collection(&self, id: Uuid) -> CoreResult<bool> {
        self.check_online()?;
        let mut state = self.state.lock().await;
        let before = state.collections.len();
        state.collections.retain(|c| c.id != id);
        Ok(state.collections.len() < before)
    }
}

#[async_trait]
impl ProfileRepository for InMemoryStore {
    async fn get_profile(&self, id: Uuid) -> CoreResult<Option<Profile>> {
        self.check_online()?;
        Ok(self.state.lock().await.profiles.get(&id).cloned())
    }

    async fn update_profile(&self, id: Uuid, patch: ProfilePatch) -> CoreResult<Option<Profile>> {
        self.check_online()?;
        let updated = {
            let mut state = self.state.lock().await;
            let Some(profile) = state.profiles.get_mut(&id) else {
                return Ok(None);
            };
            patch.apply(profile, Utc::now());
            profile.clone()
        };
        let _ = self.changes.send(ProfileChange::Updated(updated.clone()));
        Ok(Some(updated))
    }

    async fn subscribe(&self, id: Uuid) -> CoreResult<ProfileSubscription> {
        self.check_online()?;
        let mut changes = self.changes.subscribe();
        let (tx, rx) = mpsc::channel(16);
        let pump = tokio::spawn(async move {
            loop {
                match changes.recv().await {
                    Ok(change) if change.profile_id() == id => {
                        if tx.send(change).await.is_err() {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!("Profile subscription for {} skipped {} changes", id, skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        Ok(ProfileSubscription::new(id, rx, pump))
    }
}

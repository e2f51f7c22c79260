use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info};
use uuid::Uuid;

use roam_core::repository::{CollectionRepository, CreatorRepository, ItineraryRepository};
use roam_core::{CoreResult, MarketplaceQuery};
use roam_shared::{
    CollectionWithItineraries, ListingWithCreator, MarketplaceCollection, MarketplaceCreator,
};

use crate::state::Loadable;

/// Backends the marketplace fetch reads from.
#[derive(Clone)]
pub struct MarketplaceRepos {
    pub itineraries: Arc<dyn ItineraryRepository>,
    pub creators: Arc<dyn CreatorRepository>,
    pub collections: Arc<dyn CollectionRepository>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketplaceLimits {
    pub featured: i64,
    pub trending: i64,
    pub creators: i64,
}

impl Default for MarketplaceLimits {
    fn default() -> Self {
        Self {
            featured: 5,
            trending: 10,
            creators: 10,
        }
    }
}

/// Everything a marketplace screen shows for one query.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MarketplaceSnapshot {
    pub listings: Vec<ListingWithCreator>,
    pub featured: Vec<ListingWithCreator>,
    pub trending: Vec<ListingWithCreator>,
    pub collections: Vec<CollectionWithItineraries>,
    pub creators: Vec<MarketplaceCreator>,
}

/// Runs the main listing query and the auxiliary queries concurrently, then
/// resolves collection members. Any failure abandons the whole fetch.
pub async fn fetch_marketplace_data(
    repos: &MarketplaceRepos,
    query: &MarketplaceQuery,
    limits: MarketplaceLimits,
) -> CoreResult<MarketplaceSnapshot> {
    let (listings, featured, trending, creators, collections) = tokio::try_join!(
        repos.itineraries.search(query),
        repos.itineraries.featured(limits.featured),
        repos.itineraries.trending(limits.trending),
        repos.creators.top_creators(limits.creators),
        repos.collections.list_collections(),
    )?;

    let collections = resolve_collections(repos.itineraries.as_ref(), collections).await?;

    Ok(MarketplaceSnapshot {
        listings,
        featured,
        trending,
        collections,
        creators,
    })
}

/// Resolves member ids of every collection with a single batched lookup.
///
/// Members keep the collection's id order; ids with no matching listing are
/// dropped. No lookup is issued when no collection has members.
pub async fn resolve_collections(
    itineraries: &dyn ItineraryRepository,
    collections: Vec<MarketplaceCollection>,
) -> CoreResult<Vec<CollectionWithItineraries>> {
    let mut seen = HashSet::new();
    let wanted: Vec<Uuid> = collections
        .iter()
        .flat_map(|c| c.itinerary_ids.iter().copied())
        .filter(|id| seen.insert(*id))
        .collect();

    let by_id: HashMap<Uuid, ListingWithCreator> = if wanted.is_empty() {
        HashMap::new()
    } else {
        itineraries
            .find_by_ids(&wanted)
            .await?
            .into_iter()
            .map(|listing| (listing.itinerary.id, listing))
            .collect()
    };

    Ok(collections
        .into_iter()
        .map(|collection| {
            let itineraries = collection
                .itinerary_ids
                .iter()
                .filter_map(|id| by_id.get(id).cloned())
                .collect();
            CollectionWithItineraries {
                collection,
                itineraries,
            }
        })
        .collect())
}

/// Stateful marketplace view: refetches from scratch whenever the query
/// changes and keeps the last good snapshot on failure.
///
/// Each fetch takes a generation token; a result is applied only if its token
/// is still the latest, so the most recent query always wins.
pub struct MarketplaceFeed {
    repos: MarketplaceRepos,
    limits: MarketplaceLimits,
    query: Mutex<Option<MarketplaceQuery>>,
    generation: AtomicU64,
    state: watch::Sender<Loadable<MarketplaceSnapshot>>,
}

impl MarketplaceFeed {
    pub fn new(repos: MarketplaceRepos, limits: MarketplaceLimits) -> Self {
        let (state, _) = watch::channel(Loadable::default());
        Self {
            repos,
            limits,
            query: Mutex::new(None),
            generation: AtomicU64::new(0),
            state,
        }
    }

    /// Fetches if `query` differs from the current one. Returns whether a fetch ran.
    pub async fn set_query(&self, query: MarketplaceQuery) -> bool {
        {
            let mut current = self.query.lock().await;
            if current.as_ref() == Some(&query) {
                return false;
            }
            *current = Some(query.clone());
        }
        self.run(query).await;
        true
    }

    /// Refetches the current query (the default query if none was set).
    pub async fn refresh(&self) {
        let query = self.query.lock().await.clone().unwrap_or_default();
        self.run(query).await;
    }

    async fn run(&self, query: MarketplaceQuery) {
        let token = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|s| s.begin());
        debug!(token, search = %query.search, "Fetching marketplace data");

        let result = fetch_marketplace_data(&self.repos, &query, self.limits).await;

        let mut stale = false;
        self.state.send_modify(|s| {
            if self.generation.load(Ordering::SeqCst) != token {
                stale = true;
                return;
            }
            match result {
                Ok(snapshot) => {
                    info!(
                        listings = snapshot.listings.len(),
                        collections = snapshot.collections.len(),
                        "Marketplace data loaded"
                    );
                    s.succeed(snapshot);
                }
                Err(e) => {
                    error!("Error fetching marketplace data: {}", e);
                    s.abandon();
                }
            }
        });
        if stale {
            debug!(token, "Discarded stale marketplace result");
        }
    }

    pub fn snapshot(&self) -> Option<MarketplaceSnapshot> {
        self.state.borrow().data().cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    pub fn state(&self) -> Loadable<MarketplaceSnapshot> {
        self.state.borrow().clone()
    }

    /// Observe state transitions.
    pub fn subscribe_state(&self) -> watch::Receiver<Loadable<MarketplaceSnapshot>> {
        self.state.subscribe()
    }

    pub async fn query(&self) -> Option<MarketplaceQuery> {
        self.query.lock().await.clone()
    }
}

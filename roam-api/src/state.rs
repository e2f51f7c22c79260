use std::sync::Arc;

use roam_core::repository::{
    CollectionRepository, CreatorRepository, ItineraryRepository, ProfileRepository,
};
use roam_market::{CollectionManager, MarketplaceLimits, MarketplaceRepos, ProfileEditor};

#[derive(Clone)]
pub struct AppState {
    pub itineraries: Arc<dyn ItineraryRepository>,
    pub creators: Arc<dyn CreatorRepository>,
    pub collections: Arc<dyn CollectionRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub limits: MarketplaceLimits,
    pub default_cover_image: String,
}

impl AppState {
    pub fn marketplace_repos(&self) -> MarketplaceRepos {
        MarketplaceRepos {
            itineraries: self.itineraries.clone(),
            creators: self.creators.clone(),
            collections: self.collections.clone(),
        }
    }

    /// A manager per request keeps each request's captured error its own.
    pub fn collection_manager(&self) -> CollectionManager {
        CollectionManager::new(
            self.collections.clone(),
            self.itineraries.clone(),
            self.default_cover_image.clone(),
        )
    }

    pub fn profile_editor(&self) -> ProfileEditor {
        ProfileEditor::new(self.profiles.clone())
    }
}

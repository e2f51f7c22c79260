pub mod app_config;
pub mod collection_repo;
pub mod database;
pub mod events;
pub mod itinerary_repo;
pub mod memory;
pub mod profile_repo;

pub use collection_repo::StoreCollectionRepository;
pub use database::DbClient;
pub use events::{ProfileChangeListener, PROFILE_CHANNEL};
pub use itinerary_repo::{StoreCreatorRepository, StoreItineraryRepository};
pub use memory::InMemoryStore;
pub use profile_repo::StoreProfileRepository;

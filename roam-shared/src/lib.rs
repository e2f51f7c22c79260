pub mod models;

pub use models::collection::{CollectionDraft, CollectionPatch, CollectionWithItineraries, MarketplaceCollection, NewCollection};
pub use models::creator::MarketplaceCreator;
pub use models::events::{ProfileChange, ProfileNotification};
pub use models::itinerary::{ListingWithCreator, MarketplaceItinerary};
pub use models::profile::{BudgetPreference, Profile, ProfilePatch};

pub mod collections;
pub mod marketplace;
pub mod profile;
pub mod state;

pub use collections::CollectionManager;
pub use marketplace::{fetch_marketplace_data, MarketplaceFeed, MarketplaceLimits, MarketplaceRepos, MarketplaceSnapshot};
pub use profile::{ProfileEditor, ProfileWatcher};
pub use state::{FetchPhase, Loadable, MutationStatus};

#[cfg(test)]
pub(crate) mod fixtures;

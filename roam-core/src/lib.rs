pub mod filter;
pub mod repository;
pub mod subscription;

pub use filter::{FilterParams, MarketplaceFilters, MarketplaceQuery, Range, SortKey};
pub use subscription::ProfileSubscription;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Backend error: {0}")]
    BackendError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

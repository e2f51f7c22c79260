use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Seller/author profile attached to listings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarketplaceCreator {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub username: String,
    pub display_name: String,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub specialty: Option<String>,
    pub rating: f64,
    pub itinerary_count: i32,
    pub total_sales: i32,
    pub is_verified: bool,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::creator::MarketplaceCreator;

/// A marketplace listing shown to buyers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarketplaceItinerary {
    pub id: Uuid,
    pub creator_id: Uuid,
    pub title: String,
    pub description: String,
    pub destination: String,
    pub duration_days: i32,
    pub price: f64,
    pub discount_price: Option<f64>,
    pub cover_image: String,
    pub rating: f64,
    pub review_count: i32,
    pub purchase_count: i32,
    pub is_featured: bool,
    pub is_trending: bool,
    #[serde(default)]
    pub styles: Vec<String>,
    pub video_id: Option<String>,
    pub view_count: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MarketplaceItinerary {
    /// A listing is on sale only when the discount undercuts the list price.
    pub fn is_on_sale(&self) -> bool {
        matches!(self.discount_price, Some(discount) if discount < self.price)
    }

    /// Positive savings amount, or `None` when not on sale.
    pub fn savings(&self) -> Option<f64> {
        match self.discount_price {
            Some(discount) if discount < self.price => Some(self.price - discount),
            _ => None,
        }
    }

    /// Price a buyer pays right now.
    pub fn effective_price(&self) -> f64 {
        if self.is_on_sale() {
            self.discount_price.unwrap_or(self.price)
        } else {
            self.price
        }
    }

    pub fn has_video(&self) -> bool {
        self.video_id.as_deref().is_some_and(|id| !id.is_empty())
    }
}

/// Listing joined with its owning creator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListingWithCreator {
    #[serde(flatten)]
    pub itinerary: MarketplaceItinerary,
    pub creator: Option<MarketplaceCreator>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(price: f64, discount_price: Option<f64>) -> MarketplaceItinerary {
        let now = Utc::now();
        MarketplaceItinerary {
            id: Uuid::new_v4(),
            creator_id: Uuid::new_v4(),
            title: "Kyoto in Autumn".to_string(),
            description: "Temples and maple leaves".to_string(),
            destination: "Japan".to_string(),
            duration_days: 5,
            price,
            discount_price,
            cover_image: String::new(),
            rating: 4.5,
            review_count: 10,
            purchase_count: 3,
            is_featured: false,
            is_trending: false,
            styles: vec!["culture".to_string()],
            video_id: None,
            view_count: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_discount_below_price_is_on_sale() {
        let item = listing(100.0, Some(80.0));
        assert!(item.is_on_sale());
        assert_eq!(item.savings(), Some(20.0));
        assert_eq!(item.effective_price(), 80.0);
    }

    #[test]
    fn test_discount_at_or_above_price_is_not_on_sale() {
        for discount in [100.0, 120.0] {
            let item = listing(100.0, Some(discount));
            assert!(!item.is_on_sale());
            assert_eq!(item.savings(), None);
            assert_eq!(item.effective_price(), 100.0);
        }
        assert!(!listing(100.0, None).is_on_sale());
    }

    #[test]
    fn test_blank_video_id_is_not_a_video() {
        let mut item = listing(10.0, None);
        item.video_id = Some(String::new());
        assert!(!item.has_video());
        item.video_id = Some("dQw4w9WgXcQ".to_string());
        assert!(item.has_video());
    }
}

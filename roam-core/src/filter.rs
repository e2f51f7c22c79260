//! Marketplace filter/sort contract.
//!
//! A facet that is `None` (or an empty list) places no constraint on results.
//! The same contract drives both the in-process predicate used by the memory
//! backend and the SQL built by the Postgres backend.

use std::cmp::Ordering;

use roam_shared::MarketplaceItinerary;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Most purchased first
    #[default]
    Popular,
    Newest,
    PriceLow,
    PriceHigh,
    Rating,
}

impl SortKey {
    pub fn compare(&self, a: &MarketplaceItinerary, b: &MarketplaceItinerary) -> Ordering {
        match self {
            SortKey::Popular => b.purchase_count.cmp(&a.purchase_count),
            SortKey::Newest => b.created_at.cmp(&a.created_at),
            SortKey::PriceLow => a.price.total_cmp(&b.price),
            SortKey::PriceHigh => b.price.total_cmp(&a.price),
            SortKey::Rating => b.rating.total_cmp(&a.rating),
        }
    }

    /// ORDER BY clause body against the `i` alias of `marketplace_itineraries`.
    pub fn order_by_sql(&self) -> &'static str {
        match self {
            SortKey::Popular => "i.purchase_count DESC",
            SortKey::Newest => "i.created_at DESC",
            SortKey::PriceLow => "i.price ASC",
            SortKey::PriceHigh => "i.price DESC",
            SortKey::Rating => "i.rating DESC",
        }
    }
}

impl std::str::FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "popular" => Ok(SortKey::Popular),
            "newest" => Ok(SortKey::Newest),
            "price_low" => Ok(SortKey::PriceLow),
            "price_high" => Ok(SortKey::PriceHigh),
            "rating" => Ok(SortKey::Rating),
            other => Err(format!("unknown sort key: {other}")),
        }
    }
}

/// Inclusive range.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Range<T> {
    pub min: T,
    pub max: T,
}

impl<T: PartialOrd + Copy> Range<T> {
    pub fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: T) -> bool {
        self.min <= value && value <= self.max
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MarketplaceFilters {
    pub price_range: Option<Range<f64>>,
    pub duration_range: Option<Range<i32>>,
    #[serde(default)]
    pub destinations: Vec<String>,
    /// Matches listings sharing at least one tag.
    #[serde(default)]
    pub styles: Vec<String>,
    pub min_rating: Option<f64>,
    #[serde(default)]
    pub has_video: bool,
    #[serde(default)]
    pub sort_by: SortKey,
}

/// Filters plus the free-text search string. Compared by content to decide
/// whether a feed needs to refetch.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MarketplaceQuery {
    #[serde(flatten)]
    pub filters: MarketplaceFilters,
    #[serde(default)]
    pub search: String,
}

impl MarketplaceQuery {
    pub fn new(filters: MarketplaceFilters, search: impl Into<String>) -> Self {
        Self {
            filters,
            search: search.into(),
        }
    }

    /// Trimmed search term, `None` when blank.
    pub fn search_term(&self) -> Option<&str> {
        let term = self.search.trim();
        (!term.is_empty()).then_some(term)
    }

    pub fn matches(&self, item: &MarketplaceItinerary) -> bool {
        let f = &self.filters;

        if let Some(term) = self.search_term() {
            let needle = term.to_lowercase();
            let hit = [&item.title, &item.description, &item.destination]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        if let Some(range) = f.price_range {
            if !range.contains(item.price) {
                return false;
            }
        }
        if let Some(range) = f.duration_range {
            if !range.contains(item.duration_days) {
                return false;
            }
        }
        if !f.destinations.is_empty() && !f.destinations.contains(&item.destination) {
            return false;
        }
        if !f.styles.is_empty() && !item.styles.iter().any(|s| f.styles.contains(s)) {
            return false;
        }
        if let Some(min) = f.min_rating {
            if item.rating < min {
                return false;
            }
        }
        if f.has_video && !item.has_video() {
            return false;
        }
        true
    }
}

/// Flat query-string form of [`MarketplaceQuery`].
///
/// Lists are comma separated: `?destinations=Japan,Peru&styles=food`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterParams {
    pub q: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_days: Option<i32>,
    pub max_days: Option<i32>,
    pub destinations: Option<String>,
    pub styles: Option<String>,
    pub min_rating: Option<f64>,
    pub has_video: Option<bool>,
    pub sort_by: Option<SortKey>,
}

fn split_csv(raw: Option<String>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}

impl FilterParams {
    pub fn into_query(self) -> MarketplaceQuery {
        // A half-open range is closed with the widest bound.
        let price_range = match (self.min_price, self.max_price) {
            (None, None) => None,
            (min, max) => Some(Range::new(min.unwrap_or(0.0), max.unwrap_or(f64::MAX))),
        };
        let duration_range = match (self.min_days, self.max_days) {
            (None, None) => None,
            (min, max) => Some(Range::new(min.unwrap_or(0), max.unwrap_or(i32::MAX))),
        };

        MarketplaceQuery {
            filters: MarketplaceFilters {
                price_range,
                duration_range,
                destinations: split_csv(self.destinations),
                styles: split_csv(self.styles),
                min_rating: self.min_rating,
                has_video: self.has_video.unwrap_or(false),
                sort_by: self.sort_by.unwrap_or_default(),
            },
            search: self.q.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn listing(title: &str, destination: &str, price: f64, styles: &[&str]) -> MarketplaceItinerary {
        let now = Utc::now();
        MarketplaceItinerary {
            id: Uuid::new_v4(),
            creator_id: Uuid::new_v4(),
            title: title.to_string(),
            description: String::new(),
            destination: destination.to_string(),
            duration_days: 7,
            price,
            discount_price: None,
            cover_image: String::new(),
            rating: 4.0,
            review_count: 0,
            purchase_count: 0,
            is_featured: false,
            is_trending: false,
            styles: styles.iter().map(|s| s.to_string()).collect(),
            video_id: None,
            view_count: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let query = MarketplaceQuery::default();
        assert!(query.matches(&listing("Anything", "Anywhere", 9999.0, &[])));
        assert_eq!(query.filters.sort_by, SortKey::Popular);
    }

    #[test]
    fn test_search_is_case_insensitive_across_fields() {
        let query = MarketplaceQuery::new(MarketplaceFilters::default(), "  lisBOA ");
        assert!(query.matches(&listing("Weekend", "Lisboa", 100.0, &[])));
        assert!(query.matches(&listing("LISBOA nights", "Portugal", 100.0, &[])));
        assert!(!query.matches(&listing("Porto", "Portugal", 100.0, &[])));
    }

    #[test]
    fn test_price_range_is_inclusive() {
        let query = MarketplaceQuery::new(
            MarketplaceFilters {
                price_range: Some(Range::new(50.0, 150.0)),
                ..Default::default()
            },
            "",
        );
        assert!(query.matches(&listing("a", "x", 50.0, &[])));
        assert!(query.matches(&listing("b", "x", 150.0, &[])));
        assert!(!query.matches(&listing("c", "x", 150.01, &[])));
    }

    #[test]
    fn test_duration_range_is_inclusive() {
        let query = MarketplaceQuery::new(
            MarketplaceFilters {
                duration_range: Some(Range::new(5, 10)),
                ..Default::default()
            },
            "",
        );
        let mut item = listing("a", "x", 1.0, &[]);
        for (days, expected) in [(4, false), (5, true), (10, true), (11, false)] {
            item.duration_days = days;
            assert_eq!(query.matches(&item), expected, "duration {days}");
        }
    }

    #[test]
    fn test_destinations_match_exactly() {
        let query = MarketplaceQuery::new(
            MarketplaceFilters {
                destinations: vec!["Japan".to_string(), "Peru".to_string()],
                ..Default::default()
            },
            "",
        );
        assert!(query.matches(&listing("a", "Japan", 1.0, &[])));
        assert!(query.matches(&listing("b", "Peru", 1.0, &[])));
        assert!(!query.matches(&listing("c", "Japan Alps", 1.0, &[])));
        assert!(!query.matches(&listing("d", "Chile", 1.0, &[])));
    }

    #[test]
    fn test_min_rating_is_inclusive() {
        let query = MarketplaceQuery::new(
            MarketplaceFilters {
                min_rating: Some(4.5),
                ..Default::default()
            },
            "",
        );
        let mut item = listing("a", "x", 1.0, &[]);
        item.rating = 4.5;
        assert!(query.matches(&item));
        item.rating = 4.49;
        assert!(!query.matches(&item));
        item.rating = 5.0;
        assert!(query.matches(&item));
    }

    #[test]
    fn test_styles_match_on_overlap() {
        let query = MarketplaceQuery::new(
            MarketplaceFilters {
                styles: vec!["food".to_string(), "hiking".to_string()],
                ..Default::default()
            },
            "",
        );
        assert!(query.matches(&listing("a", "x", 1.0, &["luxury", "food"])));
        assert!(!query.matches(&listing("b", "x", 1.0, &["luxury"])));
        assert!(!query.matches(&listing("c", "x", 1.0, &[])));
    }

    #[test]
    fn test_has_video_requires_video_id() {
        let query = MarketplaceQuery::new(
            MarketplaceFilters {
                has_video: true,
                ..Default::default()
            },
            "",
        );
        let mut item = listing("a", "x", 1.0, &[]);
        assert!(!query.matches(&item));
        item.video_id = Some("abc123".to_string());
        assert!(query.matches(&item));
    }

    #[test]
    fn test_sort_price_low() {
        let mut items = vec![
            listing("a", "x", 150.0, &[]),
            listing("b", "x", 50.0, &[]),
            listing("c", "x", 300.0, &[]),
        ];
        items.sort_by(|a, b| SortKey::PriceLow.compare(a, b));
        let prices: Vec<f64> = items.iter().map(|i| i.price).collect();
        assert_eq!(prices, vec![50.0, 150.0, 300.0]);
    }

    #[test]
    fn test_filter_params_into_query() {
        let params = FilterParams {
            q: Some("beach".to_string()),
            max_price: Some(200.0),
            destinations: Some("Bali, Fiji,,".to_string()),
            sort_by: Some(SortKey::PriceLow),
            ..Default::default()
        };
        let query = params.into_query();
        assert_eq!(query.search, "beach");
        assert_eq!(query.filters.price_range, Some(Range::new(0.0, 200.0)));
        assert_eq!(query.filters.duration_range, None);
        assert_eq!(query.filters.destinations, vec!["Bali", "Fiji"]);
        assert!(query.filters.styles.is_empty());
        assert_eq!(query.filters.sort_by, SortKey::PriceLow);
    }

    #[test]
    fn test_sort_key_parses_wire_names() {
        assert_eq!("price_high".parse::<SortKey>().unwrap(), SortKey::PriceHigh);
        assert!("cheapest".parse::<SortKey>().is_err());
    }
}

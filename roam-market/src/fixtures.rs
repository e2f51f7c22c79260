use chrono::{Duration, Utc};
use roam_shared::{MarketplaceCreator, MarketplaceItinerary, Profile};
use uuid::Uuid;

pub fn creator(username: &str, rating: f64) -> MarketplaceCreator {
    MarketplaceCreator {
        id: Uuid::new_v4(),
        user_id: None,
        username: username.to_string(),
        display_name: username.to_string(),
        avatar: None,
        bio: None,
        specialty: Some("Backpacking".to_string()),
        rating,
        itinerary_count: 1,
        total_sales: 0,
        is_verified: false,
    }
}

pub fn itinerary(creator_id: Uuid, title: &str, price: f64, purchase_count: i32) -> MarketplaceItinerary {
    let now = Utc::now();
    MarketplaceItinerary {
        id: Uuid::new_v4(),
        creator_id,
        title: title.to_string(),
        description: format!("{title} in depth"),
        destination: "Portugal".to_string(),
        duration_days: 4,
        price,
        discount_price: None,
        cover_image: "/covers/listing.jpg".to_string(),
        rating: 4.2,
        review_count: 8,
        purchase_count,
        is_featured: false,
        is_trending: false,
        styles: vec!["culture".to_string()],
        video_id: None,
        view_count: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn profile(id: Uuid) -> Profile {
    let then = Utc::now() - Duration::days(10);
    Profile {
        id,
        username: "nomad".to_string(),
        display_name: Some("Nomad".to_string()),
        avatar_url: None,
        bio: Some("Trains over planes".to_string()),
        extended_bio: None,
        is_creator: true,
        travel_styles: vec!["slow".to_string()],
        budget_preference: Default::default(),
        follower_count: 120,
        following_count: 80,
        years_traveling: Some(9),
        cities_visited: Some(140),
        languages: vec!["en".to_string(), "es".to_string()],
        specialized_places: vec!["Andes".to_string()],
        highlights: vec![],
        social_links: Default::default(),
        created_at: then,
        updated_at: then,
    }
}

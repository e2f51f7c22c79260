use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use roam_api::{app, AppState};
use roam_market::MarketplaceLimits;
use roam_shared::{MarketplaceCreator, MarketplaceItinerary, Profile};
use roam_store::InMemoryStore;

const DEFAULT_COVER: &str = "/covers/default-collection.jpg";

fn test_app(store: &Arc<InMemoryStore>) -> Router {
    app(AppState {
        itineraries: store.clone(),
        creators: store.clone(),
        collections: store.clone(),
        profiles: store.clone(),
        limits: MarketplaceLimits::default(),
        default_cover_image: DEFAULT_COVER.to_string(),
    })
}

fn creator(username: &str) -> MarketplaceCreator {
    MarketplaceCreator {
        id: Uuid::new_v4(),
        user_id: None,
        username: username.to_string(),
        display_name: username.to_string(),
        avatar: None,
        bio: None,
        specialty: None,
        rating: 4.5,
        itinerary_count: 2,
        total_sales: 10,
        is_verified: true,
    }
}

fn itinerary(creator_id: Uuid, title: &str, price: f64) -> MarketplaceItinerary {
    let now = Utc::now();
    MarketplaceItinerary {
        id: Uuid::new_v4(),
        creator_id,
        title: title.to_string(),
        description: String::new(),
        destination: "Japan".to_string(),
        duration_days: 7,
        price,
        discount_price: None,
        cover_image: "/covers/listing.jpg".to_string(),
        rating: 4.0,
        review_count: 3,
        purchase_count: 5,
        is_featured: false,
        is_trending: false,
        styles: vec!["food".to_string()],
        video_id: None,
        view_count: None,
        created_at: now,
        updated_at: now,
    }
}

fn profile(id: Uuid) -> Profile {
    let then = Utc::now() - Duration::days(3);
    Profile {
        id,
        username: "kyoto_kai".to_string(),
        display_name: None,
        avatar_url: None,
        bio: None,
        extended_bio: None,
        is_creator: false,
        travel_styles: vec![],
        budget_preference: Default::default(),
        follower_count: 0,
        following_count: 0,
        years_traveling: None,
        cities_visited: None,
        languages: vec![],
        specialized_places: vec![],
        highlights: vec![],
        social_links: Default::default(),
        created_at: then,
        updated_at: then,
    }
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let store = Arc::new(InMemoryStore::new());
    let (status, body) = send(&test_app(&store), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_marketplace_applies_search_and_sort() {
    let store = Arc::new(InMemoryStore::new());
    let guide = creator("tokyo_tess");
    store.insert_creator(guide.clone()).await;
    store.insert_itinerary(itinerary(guide.id, "Tokyo ramen crawl", 120.0)).await;
    store.insert_itinerary(itinerary(guide.id, "Tokyo on a budget", 40.0)).await;
    store.insert_itinerary(itinerary(guide.id, "Hokkaido ski week", 300.0)).await;

    let (status, body) = send(
        &test_app(&store),
        "GET",
        "/v1/marketplace?q=tokyo&sort_by=price_low",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = body["listings"]
        .as_array()
        .expect("listings")
        .iter()
        .filter_map(|l| l["title"].as_str())
        .collect();
    assert_eq!(titles, vec!["Tokyo on a budget", "Tokyo ramen crawl"]);
    assert_eq!(body["listings"][0]["creator"]["username"], "tokyo_tess");
    assert_eq!(body["creators"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_marketplace_backend_failure_is_500() {
    let store = Arc::new(InMemoryStore::new());
    store.set_offline(true);
    let (status, body) = send(&test_app(&store), "GET", "/v1/marketplace", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal Server Error");
}

#[tokio::test]
async fn test_collection_lifecycle() {
    let store = Arc::new(InMemoryStore::new());
    let app = test_app(&store);
    let creator_id = Uuid::new_v4();
    let uri = format!("/v1/creators/{}/collections", creator_id);

    let (status, first) = send(&app, "POST", &uri, Some(json!({ "title": "Night markets" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["sort_order"], 0);
    assert_eq!(first["cover_image"], DEFAULT_COVER);

    let (status, second) = send(&app, "POST", &uri, Some(json!({}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(second["sort_order"], 1);
    assert_eq!(second["title"], "Untitled Collection");

    let (status, listed) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = listed
        .as_array()
        .expect("collections")
        .iter()
        .filter_map(|c| c["title"].as_str())
        .collect();
    assert_eq!(titles, vec!["Night markets", "Untitled Collection"]);

    let id = first["id"].as_str().expect("id");
    let (status, updated) = send(
        &app,
        "PATCH",
        &format!("/v1/collections/{}", id),
        Some(json!({ "description": "Taipei and Bangkok after dark" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Night markets");
    assert_eq!(updated["description"], "Taipei and Bangkok after dark");

    let (status, _) = send(&app, "DELETE", &format!("/v1/collections/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_blank_collection_title_is_rejected() {
    let store = Arc::new(InMemoryStore::new());
    let uri = format!("/v1/creators/{}/collections", Uuid::new_v4());
    let (status, _) = send(&test_app(&store), "POST", &uri, Some(json!({ "title": "   " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_collection_update_is_404_but_delete_succeeds() {
    let store = Arc::new(InMemoryStore::new());
    let app = test_app(&store);
    let uri = format!("/v1/collections/{}", Uuid::new_v4());

    let (status, _) = send(&app, "PATCH", &uri, Some(json!({ "title": "Ghost" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_profile_read_and_patch() {
    let store = Arc::new(InMemoryStore::new());
    let app = test_app(&store);
    let id = Uuid::new_v4();
    store.insert_profile(profile(id)).await;
    let uri = format!("/v1/profiles/{}", id);

    let (status, before) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(before["username"], "kyoto_kai");

    let (status, after) = send(
        &app,
        "PATCH",
        &uri,
        Some(json!({ "display_name": "Kai", "budget_preference": "high" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(after["display_name"], "Kai");
    assert_eq!(after["budget_preference"], "high");
    assert_eq!(after["username"], "kyoto_kai");
    assert_ne!(after["updated_at"], before["updated_at"]);
}

#[tokio::test]
async fn test_missing_profile_is_404() {
    let store = Arc::new(InMemoryStore::new());
    let app = test_app(&store);
    let uri = format!("/v1/profiles/{}", Uuid::new_v4());

    let (status, body) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Profile not found");

    let (status, _) = send(&app, "PATCH", &uri, Some(json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "GET", &format!("{}/events", uri), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

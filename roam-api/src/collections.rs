use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use uuid::Uuid;

use roam_shared::{CollectionPatch, CollectionWithItineraries, MarketplaceCollection, NewCollection};

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/creators/{creator_id}/collections",
            get(list_creator_collections).post(create_collection),
        )
        .route(
            "/v1/collections/{id}",
            patch(update_collection).delete(delete_collection),
        )
}

fn require_title(title: Option<&str>) -> Result<(), AppError> {
    match title {
        Some(t) if t.trim().is_empty() => Err(AppError::ValidationError(
            "Collection title must not be blank".to_string(),
        )),
        _ => Ok(()),
    }
}

async fn list_creator_collections(
    State(state): State<AppState>,
    Path(creator_id): Path<Uuid>,
) -> Result<Json<Vec<CollectionWithItineraries>>, AppError> {
    let manager = state.collection_manager();
    match manager.load_creator_collections(creator_id).await {
        Some(collections) => Ok(Json(collections)),
        None => Err(AppError::InternalServerError(
            manager
                .creator_collections()
                .error()
                .unwrap_or("Failed to load collections")
                .to_string(),
        )),
    }
}

async fn create_collection(
    State(state): State<AppState>,
    Path(creator_id): Path<Uuid>,
    Json(req): Json<NewCollection>,
) -> Result<(StatusCode, Json<MarketplaceCollection>), AppError> {
    require_title(req.title.as_deref())?;

    let manager = state.collection_manager();
    match manager.create_collection(creator_id, req).await {
        Some(collection) => Ok((StatusCode::CREATED, Json(collection))),
        None => Err(AppError::from_status(manager.status())),
    }
}

async fn update_collection(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<CollectionPatch>,
) -> Result<Json<MarketplaceCollection>, AppError> {
    require_title(patch.title.as_deref())?;

    let manager = state.collection_manager();
    match manager.update_collection(id, patch).await {
        Some(collection) => Ok(Json(collection)),
        None => Err(AppError::from_status(manager.status())),
    }
}

async fn delete_collection(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let manager = state.collection_manager();
    if manager.delete_collection(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::from_status(manager.status()))
    }
}

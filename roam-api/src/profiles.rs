use std::convert::Infallible;

use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Json, Router,
};
use futures_util::stream::{self, Stream};
use tracing::{info, warn};
use uuid::Uuid;

use roam_market::profile::PROFILE_NOT_FOUND;
use roam_shared::{Profile, ProfileChange, ProfilePatch};

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/profiles/{id}", get(get_profile).patch(update_profile))
        .route("/v1/profiles/{id}/events", get(profile_events))
}

async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Profile>, AppError> {
    state
        .profiles
        .get_profile(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFoundError(PROFILE_NOT_FOUND.to_string()))
}

async fn update_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<ProfilePatch>,
) -> Result<Json<Profile>, AppError> {
    let editor = state.profile_editor();
    match editor.update_profile(id, patch).await {
        Some(profile) => Ok(Json(profile)),
        None => Err(AppError::from_status(editor.status())),
    }
}

fn change_event(change: &ProfileChange) -> Event {
    let name = match change {
        ProfileChange::Updated(_) => "updated",
        ProfileChange::Deleted(_) => "deleted",
    };
    match Event::default().event(name).json_data(change) {
        Ok(event) => event,
        Err(e) => {
            warn!("Failed to encode profile change: {}", e);
            Event::default().event(name)
        }
    }
}

/// Streams changes of one profile until the client disconnects, which drops
/// the subscription.
async fn profile_events(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    if state.profiles.get_profile(id).await?.is_none() {
        return Err(AppError::NotFoundError(PROFILE_NOT_FOUND.to_string()));
    }

    let subscription = state.profiles.subscribe(id).await?;
    info!("Streaming changes for profile {}", id);

    let stream = stream::unfold(subscription, |mut subscription| async move {
        let change = subscription.recv().await?;
        Some((Ok::<_, Infallible>(change_event(&change)), subscription))
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

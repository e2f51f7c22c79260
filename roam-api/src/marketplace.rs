use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use tracing::debug;

use roam_core::FilterParams;
use roam_market::{fetch_marketplace_data, MarketplaceSnapshot};

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/marketplace", get(get_marketplace))
}

async fn get_marketplace(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> Result<Json<MarketplaceSnapshot>, AppError> {
    let query = params.into_query();
    debug!("Marketplace query: {:?}", query);

    let snapshot = fetch_marketplace_data(&state.marketplace_repos(), &query, state.limits).await?;
    Ok(Json(snapshot))
}

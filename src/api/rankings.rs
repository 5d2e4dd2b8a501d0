use crate::{
    api::{authenticate, AppState},
    betting::{ranking, RankingEntry},
    error::Result,
};
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    routing::get,
    Json, Router,
};
use std::sync::Arc;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/rounds/:id", get(round_ranking))
        .route("/global", get(global_ranking))
}

async fn round_ranking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(round_id): Path<i64>,
) -> Result<Json<Vec<RankingEntry>>> {
    let auth = authenticate(&state, &headers)?;

    let entries = ranking::round_ranking(&state.pool, auth.role, round_id).await?;

    Ok(Json(entries))
}

async fn global_ranking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<RankingEntry>>> {
    let auth = authenticate(&state, &headers)?;

    let entries = ranking::global_ranking(&state.pool, auth.role).await?;

    Ok(Json(entries))
}

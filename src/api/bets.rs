use crate::{
    api::{authenticate, AppState},
    betting::{ledger, lock, LockStatus},
    db::models::{Bet, Pick},
    error::{AppError, Result},
};
use axum::{
    extract::State,
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::{str::FromStr, sync::Arc};

#[derive(Debug, Deserialize)]
pub struct PlaceBetRequest {
    pub match_id: i64,
    pub pick: String,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(place_bet))
        .route("/lock", get(lock_status))
}

async fn place_bet(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<PlaceBetRequest>,
) -> Result<Json<Bet>> {
    let auth = authenticate(&state, &headers)?;
    let pick = Pick::from_str(&req.pick)
        .map_err(|_| AppError::Validation(format!("palpite inválido: {}", req.pick)))?;

    let bet = ledger::place_bet(&state.pool, &auth, state.clock.now(), req.match_id, pick).await?;

    Ok(Json(bet))
}

async fn lock_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<LockStatus>> {
    authenticate(&state, &headers)?;

    let status = lock::lock_status(&state.pool, state.clock.now()).await?;

    Ok(Json(status))
}

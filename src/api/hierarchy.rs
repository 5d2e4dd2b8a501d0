//! Admin lifecycle of the pool -> tournament -> round -> match hierarchy.
//!
//! Creation and finalization are admin-only; finalization is one-way. Deletes
//! go through the cascade manager so the whole subtree disappears atomically.

use crate::{
    api::{authenticate, AppState},
    betting::{cascade, resolver, OutcomeDecision, SettledMatch},
    db::models::{BetPool, Match, Pick, Round, Tournament},
    error::{AppError, Result},
};
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    routing::{delete, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use std::{str::FromStr, sync::Arc};

#[derive(Debug, Deserialize)]
pub struct CreatePoolRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateTournamentRequest {
    pub pool_id: i64,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateRoundRequest {
    pub tournament_id: i64,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateMatchRequest {
    pub round_id: i64,
    pub team_home: String,
    pub team_away: String,
    pub scheduled_at: String,
}

/// Either the outcome itself or the final score; exactly one form is required.
#[derive(Debug, Deserialize)]
pub struct ApplyOutcomeRequest {
    pub outcome: Option<String>,
    pub goals_home: Option<i64>,
    pub goals_away: Option<i64>,
}

pub fn pools_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_pool))
        .route("/:id", delete(delete_pool))
}

pub fn tournaments_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_tournament))
        .route("/:id", delete(delete_tournament))
}

pub fn rounds_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_round))
        .route("/:id", delete(delete_round))
        .route("/:id/finalize", post(finalize_round))
}

pub fn matches_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_match))
        .route("/:id/finalize", post(finalize_match))
        .route("/:id/outcome", post(apply_outcome))
}

async fn create_pool(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreatePoolRequest>,
) -> Result<Json<BetPool>> {
    let auth = authenticate(&state, &headers)?;
    auth.require_admin()?;

    let created: BetPool = sqlx::query_as(
        "INSERT INTO pools (name, owner_id, finalized, created_at) VALUES (?, ?, 0, ?)
         RETURNING id, name, owner_id, finalized, created_at",
    )
    .bind(&req.name)
    .bind(&auth.user_id)
    .bind(Utc::now().to_rfc3339())
    .fetch_one(&state.pool)
    .await?;

    tracing::info!("Pool {} ({}) created by {}", created.id, created.name, auth.user_id);
    Ok(Json(created))
}

async fn create_tournament(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreateTournamentRequest>,
) -> Result<Json<Tournament>> {
    let auth = authenticate(&state, &headers)?;
    auth.require_admin()?;

    ensure_exists(&state, "pools", req.pool_id, "bolão").await?;

    let created: Tournament = sqlx::query_as(
        "INSERT INTO tournaments (pool_id, name, finalized, created_at) VALUES (?, ?, 0, ?)
         RETURNING id, pool_id, name, finalized, created_at",
    )
    .bind(req.pool_id)
    .bind(&req.name)
    .bind(Utc::now().to_rfc3339())
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(created))
}

async fn create_round(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreateRoundRequest>,
) -> Result<Json<Round>> {
    let auth = authenticate(&state, &headers)?;
    auth.require_admin()?;

    ensure_exists(&state, "tournaments", req.tournament_id, "campeonato").await?;

    let created: Round = sqlx::query_as(
        "INSERT INTO rounds (tournament_id, name, finalized, created_at) VALUES (?, ?, 0, ?)
         RETURNING id, tournament_id, name, finalized, created_at",
    )
    .bind(req.tournament_id)
    .bind(&req.name)
    .bind(Utc::now().to_rfc3339())
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(created))
}

async fn create_match(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreateMatchRequest>,
) -> Result<Json<Match>> {
    let auth = authenticate(&state, &headers)?;
    auth.require_admin()?;

    ensure_exists(&state, "rounds", req.round_id, "rodada").await?;

    let created: Match = sqlx::query_as(
        "INSERT INTO matches (round_id, team_home, team_away, scheduled_at, outcome, finalized, created_at)
         VALUES (?, ?, ?, ?, NULL, 0, ?)
         RETURNING id, round_id, team_home, team_away, scheduled_at, outcome, finalized, created_at",
    )
    .bind(req.round_id)
    .bind(&req.team_home)
    .bind(&req.team_away)
    .bind(&req.scheduled_at)
    .bind(Utc::now().to_rfc3339())
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(created))
}

/// One-way: once a round is finalized it stays finalized. The stored flag is
/// authoritative for the lock window and is never recomputed from match state.
async fn finalize_round(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(round_id): Path<i64>,
) -> Result<Json<Round>> {
    let auth = authenticate(&state, &headers)?;
    auth.require_admin()?;

    let updated: Option<Round> = sqlx::query_as(
        "UPDATE rounds SET finalized = 1 WHERE id = ?
         RETURNING id, tournament_id, name, finalized, created_at",
    )
    .bind(round_id)
    .fetch_optional(&state.pool)
    .await?;

    match updated {
        Some(round) => {
            tracing::info!("Round {} finalized by {}", round_id, auth.user_id);
            Ok(Json(round))
        }
        None => Err(AppError::NotFound(format!("rodada {}", round_id))),
    }
}

async fn finalize_match(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(match_id): Path<i64>,
) -> Result<Json<Match>> {
    let auth = authenticate(&state, &headers)?;
    auth.require_admin()?;

    let updated: Option<Match> = sqlx::query_as(
        "UPDATE matches SET finalized = 1 WHERE id = ?
         RETURNING id, round_id, team_home, team_away, scheduled_at, outcome, finalized, created_at",
    )
    .bind(match_id)
    .fetch_optional(&state.pool)
    .await?;

    match updated {
        Some(m) => Ok(Json(m)),
        None => Err(AppError::NotFound(format!("partida {}", match_id))),
    }
}

async fn apply_outcome(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(match_id): Path<i64>,
    Json(req): Json<ApplyOutcomeRequest>,
) -> Result<Json<SettledMatch>> {
    let auth = authenticate(&state, &headers)?;

    let decision = match (req.outcome, req.goals_home, req.goals_away) {
        (Some(outcome), _, _) => {
            let outcome = Pick::from_str(&outcome)
                .map_err(|_| AppError::Validation(format!("resultado inválido: {}", outcome)))?;
            OutcomeDecision::Direct(outcome)
        }
        (None, Some(home), Some(away)) => OutcomeDecision::Goals { home, away },
        _ => {
            return Err(AppError::Validation(
                "informe o resultado ou o placar completo".to_string(),
            ))
        }
    };

    let settled = resolver::apply_outcome(&state.pool, &auth, match_id, decision).await?;

    Ok(Json(settled))
}

async fn delete_round(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(round_id): Path<i64>,
) -> Result<Json<serde_json::Value>> {
    let auth = authenticate(&state, &headers)?;

    cascade::delete_round(&state.pool, &auth, round_id).await?;

    Ok(Json(serde_json::json!({ "ok": true })))
}

async fn delete_tournament(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(tournament_id): Path<i64>,
) -> Result<Json<serde_json::Value>> {
    let auth = authenticate(&state, &headers)?;

    cascade::delete_tournament(&state.pool, &auth, tournament_id).await?;

    Ok(Json(serde_json::json!({ "ok": true })))
}

async fn delete_pool(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(pool_id): Path<i64>,
) -> Result<Json<serde_json::Value>> {
    let auth = authenticate(&state, &headers)?;

    cascade::delete_pool(&state.pool, &auth, pool_id).await?;

    Ok(Json(serde_json::json!({ "ok": true })))
}

async fn ensure_exists(state: &AppState, table: &str, id: i64, label: &str) -> Result<()> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?)", table);
    let (found,): (bool,) = sqlx::query_as(&sql).bind(id).fetch_one(&state.pool).await?;
    if !found {
        return Err(AppError::NotFound(format!("{} {}", label, id)));
    }
    Ok(())
}

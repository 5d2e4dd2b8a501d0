//! Bet placement
//!
//! One prediction per (user, match). Repeating a call overwrites the pick in
//! place; `points` is never touched here because a bet can only be changed
//! while the match is still unresolved.

use crate::{
    auth::AuthUser,
    betting::lock,
    db::{
        models::{Bet, Pick},
        DbPool,
    },
    error::{AppError, Result},
};
use chrono::{DateTime, Utc};

/// Places or updates the caller's prediction for a match.
///
/// Preconditions are checked in order and the first failure wins; nothing is
/// written until all of them pass.
pub async fn place_bet(
    pool: &DbPool,
    auth: &AuthUser,
    now: DateTime<Utc>,
    match_id: i64,
    pick: Pick,
) -> Result<Bet> {
    if !auth.authorized {
        return Err(AppError::Authorization(
            "usuário não autorizado a apostar".to_string(),
        ));
    }

    let status = lock::lock_status(pool, now).await?;
    if status.locked {
        return Err(AppError::StateConflict("apostas fechadas".to_string()));
    }

    let row: Option<(Option<Pick>, bool, bool)> = sqlx::query_as(
        r#"
        SELECT m.outcome, m.finalized, r.finalized
        FROM matches m
        JOIN rounds r ON r.id = m.round_id
        WHERE m.id = ?
        "#,
    )
    .bind(match_id)
    .fetch_optional(pool)
    .await?;

    let (outcome, match_finalized, round_finalized) = match row {
        Some(row) => row,
        None => return Err(AppError::NotFound(format!("partida {}", match_id))),
    };

    if match_finalized || round_finalized || outcome.is_some() {
        return Err(AppError::StateConflict(
            "partida/rodada finalizada ou já resolvida".to_string(),
        ));
    }

    let bet: Bet = sqlx::query_as(
        r#"
        INSERT INTO bets (match_id, user_id, pick, points, created_at)
        VALUES (?, ?, ?, 0, ?)
        ON CONFLICT(match_id, user_id) DO UPDATE SET pick = excluded.pick
        RETURNING id, match_id, user_id, pick, points, created_at
        "#,
    )
    .bind(match_id)
    .bind(&auth.user_id)
    .bind(pick)
    .bind(now.to_rfc3339())
    .fetch_one(pool)
    .await?;

    tracing::info!(
        "Bet placed: user {} picked {} on match {}",
        auth.user_id,
        pick.as_str(),
        match_id
    );

    Ok(bet)
}

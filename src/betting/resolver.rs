//! Match settlement
//!
//! Records a match's final outcome and recomputes the points of every bet on
//! it in the same transaction. Outcomes are one-way; there is no unset.

use crate::{
    auth::AuthUser,
    db::{models::Pick, DbPool},
    error::{AppError, Result},
};
use serde::Serialize;
use sqlx::FromRow;

/// How the admin reported the result: either the outcome directly or the
/// final score, from which the outcome is derived.
#[derive(Debug, Clone, Copy)]
pub enum OutcomeDecision {
    Direct(Pick),
    Goals { home: i64, away: i64 },
}

impl OutcomeDecision {
    pub fn resolve(&self) -> Pick {
        match *self {
            OutcomeDecision::Direct(outcome) => outcome,
            OutcomeDecision::Goals { home, away } => Pick::from_goals(home, away),
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SettledBet {
    pub user_id: String,
    pub pick: Pick,
    pub points: i64,
}

/// Result of settling a match, relayed to notification collaborators.
#[derive(Debug, Serialize)]
pub struct SettledMatch {
    pub outcome: Pick,
    pub updated_bets: Vec<SettledBet>,
}

/// Settles a match: stores the outcome and scores every bet on it.
///
/// Runs as one transaction so a concurrent cascade delete can never observe a
/// half-settled match.
pub async fn apply_outcome(
    pool: &DbPool,
    auth: &AuthUser,
    match_id: i64,
    decision: OutcomeDecision,
) -> Result<SettledMatch> {
    auth.require_admin()?;

    let outcome = decision.resolve();

    let mut tx = pool.begin().await?;

    let row: Option<(Option<Pick>, bool, bool)> = sqlx::query_as(
        r#"
        SELECT m.outcome, m.finalized, r.finalized
        FROM matches m
        JOIN rounds r ON r.id = m.round_id
        WHERE m.id = ?
        "#,
    )
    .bind(match_id)
    .fetch_optional(&mut *tx)
    .await?;

    let (current, match_finalized, round_finalized) = match row {
        Some(row) => row,
        None => return Err(AppError::NotFound(format!("partida {}", match_id))),
    };

    if match_finalized || round_finalized || current.is_some() {
        return Err(AppError::StateConflict(
            "partida/rodada finalizada ou já resolvida".to_string(),
        ));
    }

    sqlx::query("UPDATE matches SET outcome = ? WHERE id = ?")
        .bind(outcome)
        .bind(match_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query(
        "UPDATE bets SET points = CASE WHEN pick = ? THEN 1 ELSE 0 END WHERE match_id = ?",
    )
    .bind(outcome)
    .bind(match_id)
    .execute(&mut *tx)
    .await?;

    let updated_bets: Vec<SettledBet> =
        sqlx::query_as("SELECT user_id, pick, points FROM bets WHERE match_id = ?")
            .bind(match_id)
            .fetch_all(&mut *tx)
            .await?;

    tx.commit().await?;

    tracing::info!(
        "Match {} settled as {} ({} bets scored)",
        match_id,
        outcome.as_str(),
        updated_bets.len()
    );

    Ok(SettledMatch {
        outcome,
        updated_bets,
    })
}

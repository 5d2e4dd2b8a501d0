//! Standings
//!
//! Per-round and global rankings over the bet ledger. Every known user shows
//! up exactly once, wagering or not, so the queries left-join from `users`.

use crate::{
    db::{models::Role, DbPool},
    error::{AppError, Result},
};
use serde::{Deserialize, Serialize};

/// One row of a ranking. `banned`/`withdrawn` are an admin-only projection:
/// for other callers the fields are absent from the JSON, not null.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingEntry {
    pub user_id: String,
    pub display_name: String,
    pub points: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banned: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub withdrawn: Option<bool>,
}

type UserPointsRow = (String, String, i64, bool, bool);

/// Standings for one round. Unknown round ids are an error rather than an
/// empty list, so callers can tell a deleted round from a quiet one.
pub async fn round_ranking(
    pool: &DbPool,
    caller_role: Role,
    round_id: i64,
) -> Result<Vec<RankingEntry>> {
    let round: Option<(i64,)> = sqlx::query_as("SELECT id FROM rounds WHERE id = ?")
        .bind(round_id)
        .fetch_optional(pool)
        .await?;
    if round.is_none() {
        return Err(AppError::NotFound(format!("rodada {}", round_id)));
    }

    let rows: Vec<UserPointsRow> = sqlx::query_as(
        r#"
        SELECT u.id, u.display_name, COALESCE(SUM(b.points), 0), u.banned, u.withdrawn
        FROM users u
        LEFT JOIN bets b ON b.user_id = u.id
            AND b.match_id IN (SELECT id FROM matches WHERE round_id = ?)
        GROUP BY u.id, u.display_name, u.banned, u.withdrawn
        "#,
    )
    .bind(round_id)
    .fetch_all(pool)
    .await?;

    Ok(rank(rows, caller_role))
}

/// Standings across every match ever resolved.
pub async fn global_ranking(pool: &DbPool, caller_role: Role) -> Result<Vec<RankingEntry>> {
    let rows: Vec<UserPointsRow> = sqlx::query_as(
        r#"
        SELECT u.id, u.display_name, COALESCE(SUM(b.points), 0), u.banned, u.withdrawn
        FROM users u
        LEFT JOIN bets b ON b.user_id = u.id
        GROUP BY u.id, u.display_name, u.banned, u.withdrawn
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rank(rows, caller_role))
}

/// Orders rows (points desc, display name asc case-insensitive) and applies
/// the role-gated projection.
fn rank(mut rows: Vec<UserPointsRow>, caller_role: Role) -> Vec<RankingEntry> {
    rows.sort_by(|a, b| {
        b.2.cmp(&a.2)
            .then_with(|| a.1.to_lowercase().cmp(&b.1.to_lowercase()))
    });

    let is_admin = caller_role == Role::Admin;
    rows.into_iter()
        .map(|(user_id, display_name, points, banned, withdrawn)| RankingEntry {
            user_id,
            display_name,
            points,
            banned: is_admin.then_some(banned),
            withdrawn: is_admin.then_some(withdrawn),
        })
        .collect()
}

//! Hierarchy cascade deletes
//!
//! Removing a round, tournament or pool wipes everything beneath it in strict
//! child-first order, inside a single transaction. Either the whole subtree
//! goes or none of it does; a concurrent settle never sees a half-deleted
//! match.

use crate::{
    auth::AuthUser,
    db::DbPool,
    error::{AppError, Result},
};
use sqlx::{Sqlite, Transaction};

/// Deletes a round with its matches and bets. Unknown ids are a no-op.
pub async fn delete_round(pool: &DbPool, auth: &AuthUser, round_id: i64) -> Result<()> {
    auth.require_admin()?;

    if !exists(pool, "rounds", round_id).await? {
        return Ok(());
    }

    let mut tx = pool.begin().await?;

    run_delete(
        &mut tx,
        "DELETE FROM bets WHERE match_id IN (SELECT id FROM matches WHERE round_id = ?)",
        round_id,
    )
    .await?;
    run_delete(&mut tx, "DELETE FROM matches WHERE round_id = ?", round_id).await?;
    run_delete(&mut tx, "DELETE FROM rounds WHERE id = ?", round_id).await?;

    tx.commit().await?;

    tracing::info!("Round {} deleted with all matches and bets", round_id);
    Ok(())
}

/// Deletes a tournament with its rounds, matches and bets. Unknown ids are a
/// no-op.
pub async fn delete_tournament(pool: &DbPool, auth: &AuthUser, tournament_id: i64) -> Result<()> {
    auth.require_admin()?;

    if !exists(pool, "tournaments", tournament_id).await? {
        return Ok(());
    }

    let mut tx = pool.begin().await?;

    run_delete(
        &mut tx,
        "DELETE FROM bets WHERE match_id IN (
             SELECT id FROM matches WHERE round_id IN (
                 SELECT id FROM rounds WHERE tournament_id = ?))",
        tournament_id,
    )
    .await?;
    run_delete(
        &mut tx,
        "DELETE FROM matches WHERE round_id IN (SELECT id FROM rounds WHERE tournament_id = ?)",
        tournament_id,
    )
    .await?;
    run_delete(
        &mut tx,
        "DELETE FROM rounds WHERE tournament_id = ?",
        tournament_id,
    )
    .await?;
    run_delete(&mut tx, "DELETE FROM tournaments WHERE id = ?", tournament_id).await?;

    tx.commit().await?;

    tracing::info!("Tournament {} deleted with its whole subtree", tournament_id);
    Ok(())
}

/// Deletes a pool and everything beneath it. Unknown ids are a no-op.
pub async fn delete_pool(pool: &DbPool, auth: &AuthUser, pool_id: i64) -> Result<()> {
    auth.require_admin()?;

    if !exists(pool, "pools", pool_id).await? {
        return Ok(());
    }

    let mut tx = pool.begin().await?;

    run_delete(
        &mut tx,
        "DELETE FROM bets WHERE match_id IN (
             SELECT id FROM matches WHERE round_id IN (
                 SELECT id FROM rounds WHERE tournament_id IN (
                     SELECT id FROM tournaments WHERE pool_id = ?)))",
        pool_id,
    )
    .await?;
    run_delete(
        &mut tx,
        "DELETE FROM matches WHERE round_id IN (
             SELECT id FROM rounds WHERE tournament_id IN (
                 SELECT id FROM tournaments WHERE pool_id = ?))",
        pool_id,
    )
    .await?;
    run_delete(
        &mut tx,
        "DELETE FROM rounds WHERE tournament_id IN (SELECT id FROM tournaments WHERE pool_id = ?)",
        pool_id,
    )
    .await?;
    run_delete(&mut tx, "DELETE FROM tournaments WHERE pool_id = ?", pool_id).await?;
    run_delete(&mut tx, "DELETE FROM pools WHERE id = ?", pool_id).await?;

    tx.commit().await?;

    tracing::info!("Pool {} deleted with its whole subtree", pool_id);
    Ok(())
}

async fn exists(pool: &DbPool, table: &str, id: i64) -> Result<bool> {
    // `table` is one of our own literals, never caller input.
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?)", table);
    let (found,): (bool,) = sqlx::query_as(&sql).bind(id).fetch_one(pool).await?;
    Ok(found)
}

/// Runs one delete statement inside the cascade transaction. A driver-level
/// conflict (an unmodeled dependent still pointing at the subtree) surfaces as
/// `Integrity`; bailing out here drops the transaction, which rolls back every
/// prior step.
async fn run_delete(tx: &mut Transaction<'_, Sqlite>, sql: &str, id: i64) -> Result<()> {
    sqlx::query(sql)
        .bind(id)
        .execute(&mut **tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) => {
                tracing::warn!("cascade delete aborted: {}", db.message());
                AppError::Integrity(db.message().to_string())
            }
            _ => AppError::Database(e),
        })?;
    Ok(())
}

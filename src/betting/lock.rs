//! Wager lock-window policy
//!
//! Bets close over the weekend (Saturday 14:00 through the end of Sunday,
//! reference timezone) and on Mondays while an older round still has
//! unfinalized matches. All checks take `now` as an explicit parameter so the
//! policy stays a deterministic function of its inputs; only the HTTP edge
//! reads the system clock.

use crate::{db::DbPool, error::Result};
use chrono::{DateTime, Datelike, FixedOffset, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// Reference civil timezone for the lock window (Brasília, UTC-3).
/// Brazil has no DST since 2019, so a fixed offset is exact.
pub fn reference_timezone() -> FixedOffset {
    FixedOffset::west_opt(3 * 3600).expect("valid offset")
}

/// Clock used by the HTTP layer; tests pin it to a fixed instant.
#[derive(Debug, Clone, Copy)]
pub enum Clock {
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(instant) => *instant,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LockStatus {
    pub locked: bool,
    pub weekend_active: bool,
    pub pending_finalization: bool,
}

/// True from Saturday 14:00 through the end of Sunday, reference timezone.
pub fn weekend_active(now: DateTime<Utc>) -> bool {
    let local = now.with_timezone(&reference_timezone());
    match local.weekday() {
        Weekday::Sat => local.hour() >= 14,
        Weekday::Sun => true,
        _ => false,
    }
}

fn is_monday(now: DateTime<Utc>) -> bool {
    now.with_timezone(&reference_timezone()).weekday() == Weekday::Mon
}

/// True when an older round (id below its tournament's newest round) still has
/// matches but is not finalized. Only ever evaluated on Mondays; every other
/// day short-circuits to false without touching the store.
pub async fn pending_finalization(pool: &DbPool, now: DateTime<Utc>) -> Result<bool> {
    if !is_monday(now) {
        return Ok(false);
    }

    let (pending,): (bool,) = sqlx::query_as(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM rounds r
            WHERE r.finalized = 0
              AND r.id < (SELECT MAX(r2.id) FROM rounds r2 WHERE r2.tournament_id = r.tournament_id)
              AND EXISTS (SELECT 1 FROM matches m WHERE m.round_id = r.id)
        )
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(pending)
}

pub async fn lock_status(pool: &DbPool, now: DateTime<Utc>) -> Result<LockStatus> {
    let weekend = weekend_active(now);
    let pending = pending_finalization(pool, now).await?;

    Ok(LockStatus {
        locked: weekend || pending,
        weekend_active: weekend,
        pending_finalization: pending,
    })
}

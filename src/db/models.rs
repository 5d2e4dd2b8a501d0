use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A three-way prediction, doubling as the resolved outcome of a match.
///
/// Stored as lowercase TEXT; the closed enum makes an invalid value a
/// construction-time failure instead of a runtime branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "lowercase")]
pub enum Pick {
    Home,
    Draw,
    Away,
}

impl Pick {
    pub fn as_str(&self) -> &str {
        match self {
            Pick::Home => "home",
            Pick::Draw => "draw",
            Pick::Away => "away",
        }
    }

    /// Derives the outcome of a finished match from its score line.
    pub fn from_goals(goals_home: i64, goals_away: i64) -> Self {
        if goals_home == goals_away {
            Pick::Draw
        } else if goals_home > goals_away {
            Pick::Home
        } else {
            Pick::Away
        }
    }
}

impl std::str::FromStr for Pick {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "home" => Ok(Pick::Home),
            "draw" => Ok(Pick::Draw),
            "away" => Ok(Pick::Away),
            _ => Err(()),
        }
    }
}

/// Caller role as asserted by the external identity layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Player,
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "admin",
            Role::Player => "player",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "player" => Ok(Role::Player),
            _ => Err(()),
        }
    }
}

/// Projection of the externally-owned identity record. Rows are provisioned
/// out of band; this service only ever reads them.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: String,
    pub display_name: String,
    pub banned: bool,
    pub withdrawn: bool,
    pub created_at: String,
}

impl User {
    pub fn new(display_name: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            display_name,
            banned: false,
            withdrawn: false,
            created_at: Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BetPool {
    pub id: i64,
    pub name: String,
    pub owner_id: String,
    pub finalized: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tournament {
    pub id: i64,
    pub pool_id: i64,
    pub name: String,
    pub finalized: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Round {
    pub id: i64,
    pub tournament_id: i64,
    pub name: String,
    pub finalized: bool,
    pub created_at: String,
}

/// One fixture. `outcome` stays NULL until an admin settles the match and is
/// never cleared afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Match {
    pub id: i64,
    pub round_id: i64,
    pub team_home: String,
    pub team_away: String,
    pub scheduled_at: String,
    pub outcome: Option<Pick>,
    pub finalized: bool,
    pub created_at: String,
}

/// One user's prediction for one match. Unique per (match, user); `points`
/// is 0 until the owning match resolves, then 0 or 1.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Bet {
    pub id: i64,
    pub match_id: i64,
    pub user_id: String,
    pub pick: Pick,
    pub points: i64,
    pub created_at: String,
}

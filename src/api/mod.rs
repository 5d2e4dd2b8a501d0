pub mod bets;
pub mod hierarchy;
pub mod rankings;

pub use bets::router as bets_router;
pub use hierarchy::{
    matches_router, pools_router, rounds_router, tournaments_router,
};
pub use rankings::router as rankings_router;

use crate::{
    auth::{AuthUser, JwtManager},
    betting::Clock,
    db::DbPool,
    error::{AppError, Result},
};
use axum::http::HeaderMap;
use std::sync::Arc;

pub struct AppState {
    pub pool: DbPool,
    pub jwt_manager: Arc<JwtManager>,
    pub clock: Clock,
}

/// Resolves the caller identity from the Authorization header.
pub fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<AuthUser> {
    let auth_header = headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Unauthorized)?;
    AuthUser::from_header(&state.jwt_manager, auth_header)
}

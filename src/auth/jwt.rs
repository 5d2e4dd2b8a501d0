use crate::{
    db::models::Role,
    error::{AppError, Result},
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The identity fact this service consumes. Credentials are verified by the
/// external identity layer; we only check the token signature and trust the
/// claims inside it.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // user ID
    pub name: String,
    pub role: String,
    pub authorized: bool,
    pub exp: usize, // expiration time
}

impl Claims {
    pub fn new(
        user_id: String,
        name: String,
        role: Role,
        authorized: bool,
        expiration_hours: i64,
    ) -> Self {
        let exp =
            (chrono::Utc::now() + chrono::Duration::hours(expiration_hours)).timestamp() as usize;

        Self {
            sub: user_id,
            name,
            role: role.as_str().to_string(),
            authorized,
            exp,
        }
    }
}

#[derive(Clone)]
pub struct JwtManager {
    secret: String,
}

impl JwtManager {
    pub fn new(secret: String) -> Self {
        Self { secret }
    }

    pub fn create_token(
        &self,
        user_id: String,
        name: String,
        role: Role,
        authorized: bool,
    ) -> Result<String> {
        let claims = Claims::new(user_id, name, role, authorized, 24 * 7); // 7 days

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|_| AppError::Unauthorized)
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|_| AppError::Unauthorized)
    }
}

/// Authenticated caller, as asserted by the token.
pub struct AuthUser {
    pub user_id: String,
    pub display_name: String,
    pub role: Role,
    pub authorized: bool,
}

impl AuthUser {
    pub fn from_header(jwt_manager: &JwtManager, auth_header: &str) -> Result<Self> {
        // Bearer token format
        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AppError::Unauthorized)?;

        let claims = jwt_manager.verify_token(token)?;
        let role = Role::from_str(&claims.role).map_err(|_| AppError::Unauthorized)?;

        Ok(AuthUser {
            user_id: claims.sub,
            display_name: claims.name,
            role,
            authorized: claims.authorized,
        })
    }

    pub fn require_admin(&self) -> Result<()> {
        if self.role != Role::Admin {
            return Err(AppError::Authorization(
                "admin role required".to_string(),
            ));
        }
        Ok(())
    }
}

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::error::AppError;

/// Shown for every rejected access token; the reason is only logged.
pub const INVALID_ACCESS_TOKEN: &str = "Invalid or expired token";

/// Distinguishes short-lived access tokens from long-lived refresh tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Represents the claims encoded within a JWT.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token, the user's id.
    pub sub: Uuid,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: usize,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
    /// Unique token id. Two tokens minted in the same second still differ.
    pub jti: Uuid,
    pub kind: TokenKind,
}

/// Signing material for both token kinds.
///
/// Access and refresh tokens use separate secrets, so a leaked access secret cannot be
/// used to mint sessions.
#[derive(Clone)]
pub struct JwtKeys {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl JwtKeys {
    pub fn new(
        access_secret: &str,
        refresh_secret: &str,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(refresh_secret.as_bytes()),
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.jwt_secret,
            &config.jwt_refresh_secret,
            Duration::minutes(config.access_token_ttl_minutes),
            Duration::days(config.refresh_token_ttl_days),
        )
    }

    /// Lifetime of refresh tokens, reused as the refresh cookie's max-age.
    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    fn sign(&self, user_id: Uuid, kind: TokenKind) -> Result<String, AppError> {
        let now = Utc::now();
        let (ttl, key) = match kind {
            TokenKind::Access => (self.access_ttl, &self.access_encoding),
            TokenKind::Refresh => (self.refresh_ttl, &self.refresh_encoding),
        };
        let claims = Claims {
            sub: user_id,
            iat: now.timestamp() as usize,
            exp: (now + ttl).timestamp() as usize,
            jti: Uuid::new_v4(),
            kind,
        };

        encode(&Header::default(), &claims, key)
            .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
    }

    pub fn generate_access_token(&self, user_id: Uuid) -> Result<String, AppError> {
        self.sign(user_id, TokenKind::Access)
    }

    pub fn generate_refresh_token(&self, user_id: Uuid) -> Result<String, AppError> {
        self.sign(user_id, TokenKind::Refresh)
    }

    /// Verifies a bearer access token.
    ///
    /// Returns `AppError::Unauthorized` if the token is malformed, badly signed, expired,
    /// or is a refresh token. The message never says which.
    pub fn verify_access_token(&self, token: &str) -> Result<Claims, AppError> {
        let invalid = || AppError::Unauthorized(INVALID_ACCESS_TOKEN.into());

        let claims = decode::<Claims>(token, &self.access_decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| {
                log::debug!("access token rejected: {}", e);
                invalid()
            })?;

        if claims.kind != TokenKind::Access {
            log::debug!("access token rejected: {:?} token presented", claims.kind);
            return Err(invalid());
        }
        Ok(claims)
    }

    /// Verifies a refresh token's signature, expiry and kind.
    ///
    /// Failures are `AppError::Forbidden`: the client did present a credential, it just
    /// cannot be used any more.
    pub fn verify_refresh_token(&self, token: &str) -> Result<Claims, AppError> {
        let invalid = || AppError::Forbidden("Invalid or expired refresh token".into());

        let claims = decode::<Claims>(token, &self.refresh_decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| invalid())?;

        if claims.kind != TokenKind::Refresh {
            return Err(invalid());
        }
        Ok(claims)
    }

    /// Identifies the owner of a refresh token without enforcing its expiry.
    ///
    /// Logout uses this so that an expired session can still be cleared. The signature
    /// is checked, so a forged cookie cannot log somebody else out.
    pub fn refresh_token_subject(&self, token: &str) -> Option<Uuid> {
        let mut validation = Validation::default();
        validation.validate_exp = false;

        decode::<Claims>(token, &self.refresh_decoding, &validation)
            .ok()
            .filter(|data| data.claims.kind == TokenKind::Refresh)
            .map(|data| data.claims.sub)
    }
}

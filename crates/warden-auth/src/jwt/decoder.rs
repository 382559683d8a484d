//! Access token verification.

use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use uuid::Uuid;

use warden_core::config::AuthConfig;
use warden_core::error::AppError;
use warden_core::traits::Clock;

use super::claims::Claims;

/// Verifies access tokens against the configured secret and the clock.
#[derive(Clone)]
pub struct JwtDecoder {
    decoding_key: DecodingKey,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a decoder. Fails with a configuration error when the
    /// signing key is unavailable.
    pub fn new(config: &AuthConfig, clock: Arc<dyn Clock>) -> Result<Self, AppError> {
        if config.jwt_secret.trim().is_empty() {
            return Err(AppError::configuration("JWT signing secret is not configured"));
        }

        // Expiry is checked against the injected clock below, with no leeway.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Ok(Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            clock,
        })
    }

    /// Verifies a token and returns its claims.
    pub fn decode_access_token(&self, token: &str) -> Result<Claims, AppError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AppError::invalid_token("Invalid token signature")
                }
                jsonwebtoken::errors::ErrorKind::InvalidToken
                | jsonwebtoken::errors::ErrorKind::Base64(_)
                | jsonwebtoken::errors::ErrorKind::Json(_)
                | jsonwebtoken::errors::ErrorKind::Utf8(_) => {
                    AppError::invalid_token("Malformed token")
                }
                _ => AppError::invalid_token(format!("Token validation failed: {e}")),
            }
        })?;

        if data.claims.is_expired_at(self.clock.now()) {
            return Err(AppError::invalid_token("Token has expired"));
        }

        Ok(data.claims)
    }

    /// Verifies a token and returns the user it is bound to.
    pub fn verify_access_token(&self, token: &str) -> Result<Uuid, AppError> {
        self.decode_access_token(token).map(|claims| claims.user_id)
    }
}

//! JWT bearer token handling

use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// JWT configuration
#[derive(Clone, Debug)]
pub struct JwtConfig {
    /// Secret key for signing tokens (HS256)
    pub secret: String,
    /// Token expiration time in hours
    pub expiration_hours: i64,
    /// Expected issuer claim
    pub issuer: String,
}

/// JWT claims carried by callers of the API
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TokenClaims {
    /// Subject (caller id)
    pub sub: String,
    #[serde(default)]
    pub permissions: Vec<String>,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Issuer
    pub iss: String,
}

/// Verify signature, expiry and issuer, and decode the claims
pub fn verify_token(
    token: &str,
    config: &JwtConfig,
) -> Result<TokenClaims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.set_issuer(&[&config.issuer]);

    let token_data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;

    Ok(token_data.claims)
}

/// Sign a token like the external issuer does
#[cfg(test)]
pub(crate) fn create_token(
    subject: &str,
    permissions: Vec<String>,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, EncodingKey, Header};

    let now = Utc::now();
    let claims = TokenClaims {
        sub: subject.to_string(),
        permissions,
        exp: (now + Duration::hours(config.expiration_hours)).timestamp(),
        iat: now.timestamp(),
        iss: config.issuer.clone(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// JWT token generation and validation
///
/// HS256 with a single shared secret; access and refresh tokens are
/// distinguished by an explicit `token_type` claim rather than separate
/// secrets, so a refresh token can never pass an access-token check even if
/// both are signed with the same key.
///
/// Access tokens live 1 hour, refresh tokens 7 days.
///
/// # Example
///
/// ```
/// use nextup_shared::auth::jwt::{create_token, validate_access_token, Claims, TokenType};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let claims = Claims::new(Uuid::new_v4(), "coach@example.com".into(), true, TokenType::Access);
/// let token = create_token(&claims, "a-secret-at-least-32-characters!")?;
/// let decoded = validate_access_token(&token, "a-secret-at-least-32-characters!")?;
/// assert!(decoded.is_admin);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Token issuer claim value
const ISSUER: &str = "nextup";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to encode token
    #[error("Failed to encode token: {0}")]
    EncodeError(String),

    /// Token is invalid, expired, or has a bad signature
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Token is valid but is the wrong type for this operation
    #[error("Wrong token type: expected {expected:?}, got {actual:?}")]
    WrongTokenType {
        expected: TokenType,
        actual: TokenType,
    },
}

/// Distinguishes short-lived access tokens from long-lived refresh tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl TokenType {
    /// Lifetime of a token of this type
    pub fn lifetime(&self) -> Duration {
        match self {
            TokenType::Access => Duration::hours(1),
            TokenType::Refresh => Duration::days(7),
        }
    }
}

/// JWT claims carried by every token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's ID
    pub sub: Uuid,

    /// User's email at issue time
    pub email: String,

    /// Admin flag at issue time
    pub is_admin: bool,

    /// Issuer, always "nextup"
    pub iss: String,

    /// Issued-at (unix seconds)
    pub iat: i64,

    /// Expiry (unix seconds)
    pub exp: i64,

    /// Not-before (unix seconds)
    pub nbf: i64,

    /// Access or refresh
    pub token_type: TokenType,
}

impl Claims {
    /// Builds claims for a user with expiry derived from the token type
    pub fn new(user_id: Uuid, email: String, is_admin: bool, token_type: TokenType) -> Self {
        let now = Utc::now();
        let expires = now + token_type.lifetime();

        Self {
            sub: user_id,
            email,
            is_admin,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expires.timestamp(),
            nbf: now.timestamp(),
            token_type,
        }
    }
}

/// Signs claims into a compact JWT string
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| JwtError::EncodeError(e.to_string()))
}

/// Validates signature, expiry, not-before, and issuer; returns the claims
///
/// Does not check the token type; use [`validate_access_token`] or
/// [`validate_refresh_token`] at call sites that care.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let mut validation = Validation::default();
    validation.set_issuer(&[ISSUER]);
    validation.validate_nbf = true;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| JwtError::InvalidToken(e.to_string()))
}

/// Validates a token and requires it to be an access token
pub fn validate_access_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let claims = validate_token(token, secret)?;
    if claims.token_type != TokenType::Access {
        return Err(JwtError::WrongTokenType {
            expected: TokenType::Access,
            actual: claims.token_type,
        });
    }
    Ok(claims)
}

/// Validates a token and requires it to be a refresh token
pub fn validate_refresh_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let claims = validate_token(token, secret)?;
    if claims.token_type != TokenType::Refresh {
        return Err(JwtError::WrongTokenType {
            expected: TokenType::Refresh,
            actual: claims.token_type,
        });
    }
    Ok(claims)
}

/// Exchanges a valid refresh token for a fresh access token
///
/// The new access token carries the identity claims from the refresh token;
/// a promoted or demoted admin flag takes effect on the next full login.
pub fn refresh_access_token(refresh_token: &str, secret: &str) -> Result<String, JwtError> {
    let claims = validate_refresh_token(refresh_token, secret)?;
    let access_claims = Claims::new(claims.sub, claims.email, claims.is_admin, TokenType::Access);
    create_token(&access_claims, secret)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-that-is-long-enough!";

    fn test_claims(token_type: TokenType) -> Claims {
        Claims::new(
            Uuid::new_v4(),
            "player@example.com".to_string(),
            false,
            token_type,
        )
    }

    #[test]
    fn test_create_and_validate_roundtrip() {
        let claims = test_claims(TokenType::Access);
        let token = create_token(&claims, SECRET).expect("Token creation should succeed");

        let decoded = validate_token(&token, SECRET).expect("Validation should succeed");
        assert_eq!(decoded.sub, claims.sub);
        assert_eq!(decoded.email, "player@example.com");
        assert_eq!(decoded.token_type, TokenType::Access);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let claims = test_claims(TokenType::Access);
        let token = create_token(&claims, SECRET).expect("Token creation should succeed");

        let result = validate_token(&token, "a-completely-different-secret!!!");
        assert!(matches!(result, Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let claims = test_claims(TokenType::Access);
        let mut token = create_token(&claims, SECRET).expect("Token creation should succeed");
        token.push('x');

        assert!(validate_token(&token, SECRET).is_err());
    }

    #[test]
    fn test_access_token_lifetime() {
        let claims = test_claims(TokenType::Access);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_refresh_token_lifetime() {
        let claims = test_claims(TokenType::Refresh);
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 3600);
    }

    #[test]
    fn test_refresh_token_fails_access_check() {
        let claims = test_claims(TokenType::Refresh);
        let token = create_token(&claims, SECRET).expect("Token creation should succeed");

        let result = validate_access_token(&token, SECRET);
        assert!(matches!(result, Err(JwtError::WrongTokenType { .. })));
    }

    #[test]
    fn test_access_token_fails_refresh_check() {
        let claims = test_claims(TokenType::Access);
        let token = create_token(&claims, SECRET).expect("Token creation should succeed");

        let result = validate_refresh_token(&token, SECRET);
        assert!(matches!(result, Err(JwtError::WrongTokenType { .. })));
    }

    #[test]
    fn test_refresh_access_token_carries_identity() {
        let user_id = Uuid::new_v4();
        let refresh_claims = Claims::new(
            user_id,
            "admin@example.com".to_string(),
            true,
            TokenType::Refresh,
        );
        let refresh_token =
            create_token(&refresh_claims, SECRET).expect("Token creation should succeed");

        let access_token =
            refresh_access_token(&refresh_token, SECRET).expect("Refresh should succeed");
        let decoded =
            validate_access_token(&access_token, SECRET).expect("Validation should succeed");

        assert_eq!(decoded.sub, user_id);
        assert_eq!(decoded.email, "admin@example.com");
        assert!(decoded.is_admin);
    }

    #[test]
    fn test_expired_token_rejected() {
        let mut claims = test_claims(TokenType::Access);
        claims.iat -= 7200;
        claims.nbf -= 7200;
        claims.exp -= 7200;

        let token = create_token(&claims, SECRET).expect("Token creation should succeed");
        assert!(matches!(
            validate_token(&token, SECRET),
            Err(JwtError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let mut claims = test_claims(TokenType::Access);
        claims.iss = "someone-else".to_string();

        let token = create_token(&claims, SECRET).expect("Token creation should succeed");
        assert!(validate_token(&token, SECRET).is_err());
    }
}

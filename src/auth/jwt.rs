//! JWT token generation and validation
//!
//! Access tokens are HS256 JWTs whose subject is the username.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JWT-related errors
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Token encoding failed: {0}")]
    EncodingFailed(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

/// JWT claims for access tokens
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

/// A freshly signed token and its lifetime
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: i64,
}

/// Signs and checks bearer tokens for a subject.
pub trait TokenIssuer: Send + Sync {
    fn issue(&self, subject: &str) -> Result<IssuedToken, JwtError>;

    fn verify(&self, token: &str) -> Result<Claims, JwtError>;
}

/// HMAC-SHA256 JWT issuer
#[derive(Clone)]
pub struct JwtIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_seconds: i64,
}

impl JwtIssuer {
    pub fn new(secret: &str, ttl_seconds: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_seconds,
        }
    }
}

impl TokenIssuer for JwtIssuer {
    fn issue(&self, subject: &str) -> Result<IssuedToken, JwtError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.ttl_seconds);

        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))?;

        Ok(IssuedToken {
            token,
            expires_in: self.ttl_seconds,
        })
    }

    fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::default();
        validation.validate_exp = true;
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                _ => JwtError::InvalidToken(e.to_string()),
            }
        })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_verify() {
        let issuer = JwtIssuer::new("test-secret-key", 900);
        let issued = issuer.issue("alice").unwrap();
        assert!(!issued.token.is_empty());
        assert_eq!(issued.expires_in, 900);

        let claims = issuer.verify(&issued.token).unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn test_invalid_token() {
        let issuer = JwtIssuer::new("test-secret-key", 900);
        assert!(matches!(
            issuer.verify("invalid.token.here"),
            Err(JwtError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_wrong_secret() {
        let token = JwtIssuer::new("secret1", 900).issue("alice").unwrap().token;
        assert!(JwtIssuer::new("secret2", 900).verify(&token).is_err());
    }

    #[test]
    fn test_expired_token() {
        let issuer = JwtIssuer::new("test-secret-key", -120);
        let token = issuer.issue("alice").unwrap().token;
        assert!(matches!(issuer.verify(&token), Err(JwtError::TokenExpired)));
    }
}

pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the admin account id.
    pub sub: Uuid,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    fn new(subject: Uuid, expiry_days: i64) -> Self {
        let now = Utc::now();
        Self {
            sub: subject,
            exp: (now + Duration::days(expiry_days)).timestamp(),
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token signing secret is not configured")]
    MissingSecret,

    #[error("Token generation failed: {0}")]
    Generation(String),

    #[error("Token has expired")]
    Expired,

    #[error("Malformed token")]
    Malformed,

    #[error("Invalid token")]
    Invalid,
}

/// Issues and verifies the signed session tokens carried by admin clients.
///
/// Tokens are stateless: validity is signature + expiry only, there is no
/// server-side revocation list. The signing secret is loaded once at startup
/// and the service is handed to handlers as a constructed dependency.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_days: i64,
}

impl TokenService {
    pub fn new(secret: &str, expiry_days: i64) -> Result<Self, TokenError> {
        if secret.trim().is_empty() {
            return Err(TokenError::MissingSecret);
        }
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry_days,
        })
    }

    /// Sign a token for the given admin id, expiring `expiry_days` from now.
    pub fn issue(&self, subject: Uuid) -> Result<String, TokenError> {
        let claims = Claims::new(subject, self.expiry_days);
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Generation(e.to_string()))
    }

    /// Verify signature and expiry, returning the embedded claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let validation = Validation::default();
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidToken
                | jsonwebtoken::errors::ErrorKind::Base64(_)
                | jsonwebtoken::errors::ErrorKind::Json(_)
                | jsonwebtoken::errors::ErrorKind::Utf8(_) => TokenError::Malformed,
                _ => TokenError::Invalid,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("test-secret", 7).unwrap()
    }

    #[test]
    fn refuses_empty_secret() {
        assert!(matches!(
            TokenService::new("", 7),
            Err(TokenError::MissingSecret)
        ));
        assert!(matches!(
            TokenService::new("   ", 7),
            Err(TokenError::MissingSecret)
        ));
    }

    #[test]
    fn issue_then_verify_roundtrip() {
        let service = service();
        let subject = Uuid::new_v4();
        let token = service.issue(subject).unwrap();
        let claims = service.verify(&token).unwrap();
        assert_eq!(claims.sub, subject);
        // Expiry sits roughly 7 days out
        let week = 7 * 24 * 3600;
        assert!(claims.exp - claims.iat == week);
    }

    #[test]
    fn rejects_expired_token() {
        let service = service();
        // Hand-craft claims already past expiry, beyond the default leeway
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4(),
            exp: now - 3600,
            iat: now - 3600 * 24,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert!(matches!(service.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn rejects_wrong_secret() {
        let token = service().issue(Uuid::new_v4()).unwrap();
        let other = TokenService::new("another-secret", 7).unwrap();
        assert!(matches!(other.verify(&token), Err(TokenError::Invalid)));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            service().verify("not-a-token"),
            Err(TokenError::Malformed)
        ));
    }
}

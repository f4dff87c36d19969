use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Fixed session lifetime. Tokens are never refreshed.
pub const SESSION_TTL: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, Clone)]
pub struct SessionToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies HMAC-signed session tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Any HMAC variant is accepted; asymmetric and "none" are not.
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn issue(&self, username: &str) -> jsonwebtoken::errors::Result<SessionToken> {
        self.issue_at(username, Utc::now())
    }

    pub(crate) fn issue_at(
        &self,
        username: &str,
        issued_at: DateTime<Utc>,
    ) -> jsonwebtoken::errors::Result<SessionToken> {
        let iat = issued_at.timestamp();
        let exp = iat + SESSION_TTL.as_secs() as i64;
        let claims = Claims {
            sub: username.to_string(),
            exp,
            iat,
        };

        let value = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        Ok(SessionToken {
            value,
            expires_at: Utc.timestamp_opt(exp, 0).single().unwrap_or(issued_at),
        })
    }

    /// Returns the subject of a valid, unexpired token.
    pub fn verify(&self, token: &str) -> jsonwebtoken::errors::Result<String> {
        decode::<Claims>(token, &self.decoding, &self.validation).map(|data| data.claims.sub)
    }
}

//! Signed session tokens.
//!
//! Tokens are HS256 JWTs carrying the account id and role. Validity is a
//! fixed window from issuance with no leeway. Every token gets a random
//! `jti`, so two sessions opened in the same second never share a token and
//! revoking one leaves the other alone.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use resman_core::{AccountId, Role};

/// Claims embedded in a session token. `role` stays a string so an
/// unrecognised value surfaces as an invalid session rather than a decode
/// error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub id: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
    #[serde(default)]
    pub jti: String,
}

impl Claims {
    /// When the token stops being accepted.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// A freshly signed token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies session tokens with one shared secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    validity: Duration,
}

impl TokenIssuer {
    #[must_use]
    pub fn new(secret: &SecretString, validity: Duration) -> Self {
        let key = secret.expose_secret().as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);
        Self {
            encoding: EncodingKey::from_secret(key),
            decoding: DecodingKey::from_secret(key),
            validation,
            validity,
        }
    }

    #[must_use]
    pub const fn validity(&self) -> Duration {
        self.validity
    }

    /// Sign a token for `id` valid from `now` for the configured window.
    ///
    /// # Errors
    ///
    /// Returns the `jsonwebtoken` error if signing fails.
    pub fn issue_at(
        &self,
        id: &AccountId,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, jsonwebtoken::errors::Error> {
        let expires_at = now + self.validity;
        let claims = Claims {
            id: id.to_string(),
            role: role.as_str().to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        };
        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        Ok(IssuedToken { token, expires_at })
    }

    /// Sign a token valid from now.
    ///
    /// # Errors
    ///
    /// Returns the `jsonwebtoken` error if signing fails.
    pub fn issue(&self, id: &AccountId, role: Role) -> Result<IssuedToken, jsonwebtoken::errors::Error> {
        self.issue_at(id, role, Utc::now())
    }

    /// Check signature, algorithm and expiry, returning the claims.
    ///
    /// # Errors
    ///
    /// Returns the `jsonwebtoken` error for any malformed, forged, or expired
    /// token.
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation).map(|data| data.claims)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(
            &SecretString::from("k9#Lq2!vR7@xT4$mW8^zB1&nC5*pD3(f"),
            Duration::minutes(120),
        )
    }

    #[test]
    fn test_issue_then_verify() {
        let issuer = issuer();
        let id = AccountId::from("acct-1");
        let issued = issuer.issue(&id, Role::Admin).unwrap();
        let claims = issuer.verify(&issued.token).unwrap();

        assert_eq!(claims.id, "acct-1");
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.exp - claims.iat, 120 * 60);
        assert_eq!(claims.expires_at().timestamp(), issued.expires_at.timestamp());
    }

    #[test]
    fn test_tokens_in_same_second_differ() {
        let issuer = issuer();
        let id = AccountId::from("acct-1");
        let now = Utc::now();
        let first = issuer.issue_at(&id, Role::Admin, now).unwrap();
        let second = issuer.issue_at(&id, Role::Admin, now).unwrap();
        assert_ne!(first.token, second.token);
    }

    #[test]
    fn test_expired_token_rejected() {
        let issuer = issuer();
        let issued = issuer
            .issue_at(
                &AccountId::from("acct-1"),
                Role::Owner,
                Utc::now() - Duration::minutes(121),
            )
            .unwrap();
        assert!(issuer.verify(&issued.token).is_err());
    }

    #[test]
    fn test_other_secret_rejected() {
        let issued = issuer().issue(&AccountId::from("a"), Role::Admin).unwrap();
        let other = TokenIssuer::new(
            &SecretString::from("Zx8!qW3@eR5#tY7$uI9%oP1^aS2&dF4*"),
            Duration::minutes(120),
        );
        assert!(other.verify(&issued.token).is_err());
        assert!(issuer().verify("not.a.jwt").is_err());
    }
}

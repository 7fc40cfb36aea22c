//! Session tokens.
//!
//! A session is an HS256 JWT whose subject is the account key under
//! `usuarios/` and which carries the account's `rol` at login time. Role
//! changes and account deletion take effect on the next login, except for
//! `/auth/me`, which reads the store.

use chrono::Utc;
use jsonwebtoken::errors::Error as TokenError;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payload of a session token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Account key (sanitized email).
    pub sub: String,
    #[serde(rename = "rol")]
    pub role: String,
    pub exp: i64,
    pub iat: i64,
    /// Random token id, logged on login.
    pub jti: String,
}

impl Claims {
    fn new(account_key: &str, role: &str, issued_at: i64, lifetime_secs: i64) -> Self {
        Self {
            sub: account_key.to_string(),
            role: role.to_string(),
            exp: issued_at + lifetime_secs,
            iat: issued_at,
            jti: Uuid::new_v4().to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    /// Session lifetime in minutes.
    pub access_token_expiry_mins: i64,
}

const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 60;

impl JwtConfig {
    /// | Env Var                    | Required | Default |
    /// |----------------------------|----------|---------|
    /// | `JWT_SECRET`               | **yes**  | --      |
    /// | `JWT_ACCESS_EXPIRY_MINS`   | no       | `60`    |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is unset or empty.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let access_token_expiry_mins = std::env::var("JWT_ACCESS_EXPIRY_MINS")
            .ok()
            .map(|v| v.parse().expect("JWT_ACCESS_EXPIRY_MINS must be a valid i64"))
            .unwrap_or(DEFAULT_ACCESS_EXPIRY_MINS);

        Self {
            secret,
            access_token_expiry_mins,
        }
    }

    pub fn expires_in_secs(&self) -> i64 {
        self.access_token_expiry_mins * 60
    }

    /// Sign a session for `account_key` with role `role`.
    pub fn issue(&self, account_key: &str, role: &str) -> Result<String, TokenError> {
        let claims = Claims::new(account_key, role, Utc::now().timestamp(), self.expires_in_secs());
        self.sign(&claims)
    }

    /// Check signature and expiry, returning the session's claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(data.claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str) -> JwtConfig {
        JwtConfig {
            secret: secret.to_string(),
            access_token_expiry_mins: 90,
        }
    }

    #[test]
    fn issued_session_verifies() {
        let cfg = config("test-secret-that-is-long-enough-for-hmac");
        let token = cfg.issue("marta_ipa_cat", "Profesor").unwrap();

        let claims = cfg.verify(&token).unwrap();
        assert_eq!(claims.sub, "marta_ipa_cat");
        assert_eq!(claims.role, "Profesor");
        assert_eq!(claims.exp - claims.iat, 90 * 60);
    }

    #[test]
    fn role_is_serialized_as_rol() {
        let claims = Claims::new("ana_ipa_cat", "Estudiante", 0, 60);
        let value = serde_json::to_value(&claims).unwrap();
        assert_eq!(value["rol"], "Estudiante");
        assert!(value.get("role").is_none());
    }

    #[test]
    fn expired_session_is_rejected() {
        let cfg = config("test-secret-that-is-long-enough-for-hmac");
        // Past the default 60-second leeway.
        let now = Utc::now().timestamp();
        let token = cfg.sign(&Claims::new("ana_ipa_cat", "Admin", now - 600, 300)).unwrap();
        assert!(cfg.verify(&token).is_err());
    }

    #[test]
    fn session_from_another_secret_is_rejected() {
        let token = config("secret-alpha").issue("a", "Admin").unwrap();
        assert!(config("secret-bravo").verify(&token).is_err());
    }
}

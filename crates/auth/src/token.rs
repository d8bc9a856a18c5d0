//! Signed, time-bounded access tokens (HMAC JWT).
//!
//! The verification path accepts exactly one algorithm and one secret, both
//! fixed when the service is built. There is no `none` algorithm and no
//! asymmetric fallback to confuse with the HMAC key.

use core::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde_json::{Map, Value};

use crate::claims::{TokenClaims, validate_claims};
use crate::error::TokenError;

/// The HMAC algorithms a deployment may choose from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SigningAlgorithm {
    #[default]
    Hs256,
    Hs384,
    Hs512,
}

impl SigningAlgorithm {
    fn jwt(self) -> Algorithm {
        match self {
            Self::Hs256 => Algorithm::HS256,
            Self::Hs384 => Algorithm::HS384,
            Self::Hs512 => Algorithm::HS512,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hs256 => "HS256",
            Self::Hs384 => "HS384",
            Self::Hs512 => "HS512",
        }
    }
}

impl FromStr for SigningAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HS256" => Ok(Self::Hs256),
            "HS384" => Ok(Self::Hs384),
            "HS512" => Ok(Self::Hs512),
            other => Err(format!("unsupported signing algorithm {other:?} (expected HS256, HS384 or HS512)")),
        }
    }
}

impl core::fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Issues and verifies access tokens.
///
/// Stateless apart from the key material; share it behind an `Arc`.
pub struct TokenService {
    algorithm: SigningAlgorithm,
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8], algorithm: SigningAlgorithm, ttl_minutes: u32) -> Self {
        let mut validation = Validation::new(algorithm.jwt());
        // Expiry is checked by `validate_claims` after the signature, with no leeway.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp", "iat"]);

        Self {
            algorithm,
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl: Duration::minutes(i64::from(ttl_minutes)),
        }
    }

    pub fn algorithm(&self) -> SigningAlgorithm {
        self.algorithm
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `subject`, valid from now for the configured TTL.
    pub fn issue(&self, subject: &str, extra: Map<String, Value>) -> Result<String, TokenError> {
        self.issue_at(subject, extra, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(
        &self,
        subject: &str,
        extra: Map<String, Value>,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = TokenClaims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            extra,
        };

        jsonwebtoken::encode(&Header::new(self.algorithm.jwt()), &claims, &self.encoding)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Verify signature, then expiry, and return the claims.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError> {
        let claims = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| TokenError::Invalid(e.to_string()))?;

        validate_claims(&claims, now)?;
        Ok(claims)
    }
}

impl core::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &self.algorithm)
            .field("ttl", &self.ttl)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    fn service() -> TokenService {
        TokenService::new(b"test-secret", SigningAlgorithm::Hs256, 60)
    }

    fn email_claims() -> Map<String, Value> {
        let mut extra = Map::new();
        extra.insert("email".into(), Value::from("a@x.com"));
        extra
    }

    #[test]
    fn roundtrip_returns_subject_and_claims() {
        let svc = service();
        let token = svc.issue("0190f0c1a2b3", email_claims()).unwrap();
        let claims = svc.verify(&token).unwrap();

        assert_eq!(claims.sub, "0190f0c1a2b3");
        assert_eq!(claims.email(), Some("a@x.com"));
        assert_eq!(claims.exp - claims.iat, 60 * 60);
    }

    #[test]
    fn expired_token_is_rejected_as_expired() {
        let svc = service();
        let token = svc
            .issue_at("u1", Map::new(), Utc::now() - Duration::minutes(61))
            .unwrap();
        assert_eq!(svc.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn token_from_another_secret_is_invalid() {
        let other = TokenService::new(b"another-secret", SigningAlgorithm::Hs256, 60);
        let token = other.issue("u1", Map::new()).unwrap();
        assert!(matches!(service().verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn expired_forgery_reports_invalid_not_expired() {
        let other = TokenService::new(b"another-secret", SigningAlgorithm::Hs256, 60);
        let token = other
            .issue_at("u1", Map::new(), Utc::now() - Duration::days(1))
            .unwrap();
        assert!(matches!(service().verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn tampered_payload_is_invalid() {
        let svc = service();
        let token = svc.issue("u1", Map::new()).unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        assert_eq!(parts.len(), 3);

        let mut payload: Value =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(parts[1]).unwrap()).unwrap();
        payload["sub"] = Value::from("someone-else");
        let forged_payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&payload).unwrap());
        let forged = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);

        assert!(matches!(svc.verify(&forged), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn unsigned_token_is_invalid() {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let now = Utc::now().timestamp();
        let payload = URL_SAFE_NO_PAD.encode(
            serde_json::to_vec(&serde_json::json!({"sub": "u1", "iat": now, "exp": now + 600})).unwrap(),
        );
        let token = format!("{header}.{payload}.");
        assert!(matches!(service().verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn other_hmac_algorithm_is_invalid() {
        let hs512 = TokenService::new(b"test-secret", SigningAlgorithm::Hs512, 60);
        let token = hs512.issue("u1", Map::new()).unwrap();
        assert!(matches!(service().verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn garbage_is_invalid() {
        assert!(matches!(service().verify("not.a.jwt"), Err(TokenError::Invalid(_))));
        assert!(matches!(service().verify(""), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn algorithm_names_parse_strictly() {
        assert_eq!("hs256".parse::<SigningAlgorithm>(), Ok(SigningAlgorithm::Hs256));
        assert_eq!("HS512".parse::<SigningAlgorithm>(), Ok(SigningAlgorithm::Hs512));
        assert!("none".parse::<SigningAlgorithm>().is_err());
        assert!("RS256".parse::<SigningAlgorithm>().is_err());
    }
}

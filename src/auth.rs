use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::domain::FlowError;

/// Issued tokens stay valid for 30 days.
const TOKEN_TTL_DAYS: i64 = 30;

/// Decoded identity claims extracted from a verified token. Produced by
/// verification, consumed immediately by user resolution; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Token capability: `issue(claims) -> token`, `verify(token) -> claims`.
/// HMAC-SHA256 with a shared secret from configuration.
pub struct TokenAuthority {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenAuthority {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
        }
    }

    pub fn issue(&self, email: &str) -> Result<String, FlowError> {
        let now = Utc::now();
        let claims = Principal {
            sub: email.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + ChronoDuration::days(TOKEN_TTL_DAYS)).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|error| FlowError::internal(format!("token issue failed: {error}")))
    }

    pub fn verify(&self, token: &str) -> Result<Principal, FlowError> {
        decode::<Principal>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|error| FlowError::invalid_credential(format!("token rejected: {error}")))
    }
}

#[cfg(test)]
mod tests {
    use super::TokenAuthority;

    #[test]
    fn issued_tokens_verify_back_to_the_same_email() {
        let authority = TokenAuthority::new("unit-test-secret");

        let token = authority.issue("jake@jake.jake").expect("token should issue");
        let principal = authority.verify(&token).expect("token should verify");

        assert_eq!(principal.email, "jake@jake.jake");
        assert_eq!(principal.sub, "jake@jake.jake");
    }

    #[test]
    fn garbage_tokens_are_rejected() {
        let authority = TokenAuthority::new("unit-test-secret");

        assert!(authority.verify("not-a-token").is_err());
    }

    #[test]
    fn tokens_from_another_secret_are_rejected() {
        let issuing = TokenAuthority::new("secret-a");
        let verifying = TokenAuthority::new("secret-b");

        let token = issuing.issue("jake@jake.jake").expect("token should issue");

        assert!(verifying.verify(&token).is_err());
    }
}

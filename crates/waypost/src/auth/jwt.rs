//! Access token issuance and verification (HS256 JWT).

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use waypost_common::WaypostError;

/// JWT claims: subject identity and expiry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's uid (federated) or email (password accounts)
    pub sub: String,
    /// Expiry as unix seconds
    pub exp: i64,
}

/// HS256 token signer/verifier
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expire_minutes: i64,
}

impl TokenSigner {
    pub fn new(secret: &str, expire_minutes: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            expire_minutes,
        }
    }

    /// Issue an access token for `subject`
    pub fn issue(&self, subject: &str) -> Result<String, WaypostError> {
        let exp = chrono::Utc::now().timestamp() + self.expire_minutes * 60;
        let claims = Claims {
            sub: subject.to_string(),
            exp,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| WaypostError::Internal(format!("token encoding: {e}")))
    }

    /// Verify a token and return its claims. Expired or tampered tokens
    /// fail as an auth error with the public message.
    pub fn verify(&self, token: &str) -> Result<Claims, WaypostError> {
        let validation = Validation::new(Algorithm::HS256);
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|_| WaypostError::Auth("Invalid token".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_verifies_with_the_same_secret() {
        let signer = TokenSigner::new("test-secret", 60);
        let token = signer.issue("uid-123").unwrap();
        let claims = signer.verify(&token).unwrap();
        assert_eq!(claims.sub, "uid-123");
        assert!(claims.exp > chrono::Utc::now().timestamp());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let signer = TokenSigner::new("test-secret", 60);
        let other = TokenSigner::new("other-secret", 60);
        let token = signer.issue("uid-123").unwrap();
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let signer = TokenSigner::new("test-secret", -5);
        let token = signer.issue("uid-123").unwrap();
        assert!(signer.verify(&token).is_err());
    }
}

//! Federated identity verification.

use async_trait::async_trait;
use serde::Deserialize;
use waypost_common::{IdentityClaims, WaypostError};

/// Exchanges an opaque bearer credential for verified subject claims.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, id_token: &str) -> Result<IdentityClaims, WaypostError>;
}

/// Google ID-token verifier using the tokeninfo endpoint.
///
/// Verification is delegated entirely to the provider; a non-200 response
/// or a malformed body means the credential is invalid.
pub struct GoogleVerifier {
    client: reqwest::Client,
    tokeninfo_url: String,
}

#[derive(Deserialize)]
struct TokenInfo {
    sub: String,
    email: String,
    name: Option<String>,
    picture: Option<String>,
}

impl GoogleVerifier {
    pub fn new(tokeninfo_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            tokeninfo_url,
        }
    }
}

#[async_trait]
impl IdentityVerifier for GoogleVerifier {
    async fn verify(&self, id_token: &str) -> Result<IdentityClaims, WaypostError> {
        let resp = self
            .client
            .get(&self.tokeninfo_url)
            .query(&[("id_token", id_token)])
            .send()
            .await
            .map_err(|e| WaypostError::Upstream(format!("identity provider: {e}")))?;

        if !resp.status().is_success() {
            return Err(WaypostError::Auth("Invalid token".into()));
        }

        let info: TokenInfo = resp
            .json()
            .await
            .map_err(|_| WaypostError::Auth("Invalid token".into()))?;

        Ok(IdentityClaims {
            uid: info.sub,
            email: info.email,
            name: info.name,
            picture: info.picture,
        })
    }
}

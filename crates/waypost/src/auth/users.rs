//! User persistence over the external managed datastore.
//!
//! The backing service speaks a PostgREST-style HTTP API (one `users`
//! table, filters as query params). Only the four operations the auth
//! flows need are exposed.

use async_trait::async_trait;
use waypost_common::{UserRecord, WaypostError};

/// Persistent user storage, keyed by unique email or external identity.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, WaypostError>;
    async fn find_by_uid(&self, uid: &str) -> Result<Option<UserRecord>, WaypostError>;
    async fn create(&self, user: &UserRecord) -> Result<UserRecord, WaypostError>;
    async fn update_password_hash(&self, email: &str, hash: &str) -> Result<(), WaypostError>;
}

/// PostgREST-backed user store
pub struct RestUserStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RestUserStore {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
        }
    }

    fn users_url(&self) -> String {
        format!("{}/rest/v1/users", self.base_url.trim_end_matches('/'))
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    async fn find_one(&self, filter: (&str, &str)) -> Result<Option<UserRecord>, WaypostError> {
        let (column, value) = filter;
        let resp = self
            .authed(self.client.get(self.users_url()))
            .query(&[(column, format!("eq.{value}")), ("select", "*".into()), ("limit", "1".into())])
            .send()
            .await
            .map_err(|e| WaypostError::Upstream(format!("user store: {e}")))?;

        if !resp.status().is_success() {
            return Err(WaypostError::Upstream(format!(
                "user store returned {}",
                resp.status()
            )));
        }

        let mut rows: Vec<UserRecord> = resp
            .json()
            .await
            .map_err(|e| WaypostError::Upstream(format!("user store body: {e}")))?;
        Ok(rows.pop())
    }
}

#[async_trait]
impl UserStore for RestUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, WaypostError> {
        self.find_one(("email", email)).await
    }

    async fn find_by_uid(&self, uid: &str) -> Result<Option<UserRecord>, WaypostError> {
        self.find_one(("uid", uid)).await
    }

    async fn create(&self, user: &UserRecord) -> Result<UserRecord, WaypostError> {
        let resp = self
            .authed(self.client.post(self.users_url()))
            .header("Prefer", "return=representation")
            .json(&StoredUser::from(user))
            .send()
            .await
            .map_err(|e| WaypostError::Upstream(format!("user store: {e}")))?;

        if !resp.status().is_success() {
            return Err(WaypostError::Upstream(format!(
                "user store insert returned {}",
                resp.status()
            )));
        }

        let mut rows: Vec<UserRecord> = resp
            .json()
            .await
            .map_err(|e| WaypostError::Upstream(format!("user store body: {e}")))?;
        rows.pop()
            .ok_or_else(|| WaypostError::Upstream("user store insert returned no row".into()))
    }

    async fn update_password_hash(&self, email: &str, hash: &str) -> Result<(), WaypostError> {
        let resp = self
            .authed(self.client.patch(self.users_url()))
            .query(&[("email", format!("eq.{email}"))])
            .json(&serde_json::json!({ "password_hash": hash }))
            .send()
            .await
            .map_err(|e| WaypostError::Upstream(format!("user store: {e}")))?;

        if !resp.status().is_success() {
            return Err(WaypostError::Upstream(format!(
                "user store update returned {}",
                resp.status()
            )));
        }
        Ok(())
    }
}

/// Insert payload including the hash, which `UserRecord` never serializes
#[derive(serde::Serialize)]
struct StoredUser<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    uid: Option<&'a str>,
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    picture: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    password_hash: Option<&'a str>,
}

impl<'a> From<&'a UserRecord> for StoredUser<'a> {
    fn from(u: &'a UserRecord) -> Self {
        Self {
            uid: u.uid.as_deref(),
            email: &u.email,
            name: u.name.as_deref(),
            picture: u.picture.as_deref(),
            password_hash: u.password_hash.as_deref(),
        }
    }
}

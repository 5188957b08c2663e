//! Ephemeral verification token store.
//!
//! One engine backs both challenge flavors: slider CAPTCHA tokens (random
//! opaque keys, tolerance matching) and email OTP codes (identity keys,
//! exact matching). Tokens are single-use: a successful verification
//! removes the entry atomically, so of two racing verifications at most
//! one can succeed.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;

/// How the token key is chosen at issuance.
pub enum KeyPolicy {
    /// Fresh 128-bit random key, URL-safe base64
    Random,
    /// Caller-supplied identity key (OTP: the user's email).
    /// Issuance overwrites any prior live entry for the same key.
    Identity(String),
}

/// The secret answer bound to a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Solution {
    /// Integer offset (slider CAPTCHA cutout position)
    Offset(i64),
    /// Short decimal code (OTP)
    Code(String),
}

/// How a submitted answer is compared against the stored solution.
#[derive(Debug, Clone, Copy)]
pub enum MatchPolicy {
    /// Absolute numeric distance at most `n`
    Tolerance(i64),
    /// String equality
    Exact,
}

/// Verification failure reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VerifyError {
    /// Unknown, already-consumed, or evicted token
    #[error("challenge token not found")]
    TokenNotFound,
    /// Known token past its TTL (removed as a side effect)
    #[error("challenge token expired")]
    TokenExpired,
    /// Wrong answer; the token stays live for retries until expiry
    #[error("answer mismatch")]
    AnswerMismatch,
}

/// Result of a successful issuance.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub id: String,
    pub expires_at: i64,
}

struct StoredChallenge {
    solution: Solution,
    expires_at: i64,
}

/// Process-wide challenge token store.
///
/// The map is guarded by a single mutex; every verify runs its whole
/// lookup / expiry-check / compare / delete sequence inside one critical
/// section. All operations are O(1) amortized and hold the lock only
/// briefly. State is in-memory; lifecycle = process uptime.
pub struct ChallengeStore {
    entries: Mutex<HashMap<String, StoredChallenge>>,
}

impl ChallengeStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Issue a new token bound to `solution`, valid for `ttl_secs`.
    ///
    /// Never fails. An `Identity` key overwrites any pending entry for the
    /// same key, so only the newest code verifies.
    pub async fn issue(&self, key: KeyPolicy, solution: Solution, ttl_secs: u64) -> IssuedToken {
        let id = match key {
            KeyPolicy::Random => generate_token_id(),
            KeyPolicy::Identity(id) => id,
        };
        let expires_at = chrono::Utc::now().timestamp() + ttl_secs as i64;

        let mut entries = self.entries.lock().await;
        entries.insert(
            id.clone(),
            StoredChallenge {
                solution,
                expires_at,
            },
        );

        IssuedToken { id, expires_at }
    }

    /// Verify a submitted answer against the token's stored solution.
    ///
    /// Success consumes the token. A mismatch leaves it live for another
    /// attempt; an expired token is evicted and reported as such exactly
    /// once, then behaves as nonexistent.
    pub async fn verify(
        &self,
        id: &str,
        answer: &Solution,
        policy: MatchPolicy,
    ) -> Result<(), VerifyError> {
        let mut entries = self.entries.lock().await;

        let entry = entries.get(id).ok_or(VerifyError::TokenNotFound)?;

        if chrono::Utc::now().timestamp() > entry.expires_at {
            entries.remove(id);
            return Err(VerifyError::TokenExpired);
        }

        if !matches(&entry.solution, answer, policy) {
            return Err(VerifyError::AnswerMismatch);
        }

        // Single-use: consume inside the same critical section
        entries.remove(id);
        Ok(())
    }

    /// Remove a token unconditionally. Idempotent; used by compound
    /// verify-then-mutate flows where the mutation follows verification.
    pub async fn remove(&self, id: &str) {
        self.entries.lock().await.remove(id);
    }

    /// Evict every expired entry, returning how many were dropped.
    ///
    /// Correctness does not depend on this (expiry is checked at verify);
    /// it only bounds memory growth from abandoned tokens.
    pub async fn sweep(&self) -> usize {
        let now = chrono::Utc::now().timestamp();
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, c| c.expires_at >= now);
        before - entries.len()
    }

    /// Number of live (unswept) entries.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Backdate a token's expiry (tests only).
    #[cfg(test)]
    pub(crate) async fn force_expire(&self, id: &str) {
        if let Some(entry) = self.entries.lock().await.get_mut(id) {
            entry.expires_at = chrono::Utc::now().timestamp() - 60;
        }
    }
}

impl Default for ChallengeStore {
    fn default() -> Self {
        Self::new()
    }
}

fn matches(solution: &Solution, answer: &Solution, policy: MatchPolicy) -> bool {
    match (policy, solution, answer) {
        (MatchPolicy::Tolerance(n), Solution::Offset(expected), Solution::Offset(got)) => {
            (got - expected).abs() <= n
        }
        (MatchPolicy::Exact, Solution::Code(expected), Solution::Code(got)) => expected == got,
        // Policy/solution kind disagreement never passes
        _ => false,
    }
}

/// Generate a cryptographically random token id (128 bits, URL-safe base64)
fn generate_token_id() -> String {
    use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
    use rand::Rng;

    let mut bytes = [0u8; 16];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Background sweeper: periodically evicts expired tokens until shutdown.
pub async fn sweeper_worker(
    store: Arc<ChallengeStore>,
    interval_secs: u64,
    mut shutdown: tokio::sync::broadcast::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(std::time::Duration::from_secs(interval_secs));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let evicted = store.sweep().await;
                if evicted > 0 {
                    tracing::debug!(evicted, "Swept expired challenge tokens");
                }
            }
            _ = shutdown.recv() => {
                tracing::debug!("Challenge sweeper shutting down");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn correct_answer_consumes_token() {
        let store = ChallengeStore::new();
        let issued = store
            .issue(KeyPolicy::Random, Solution::Offset(120), 300)
            .await;

        let first = store
            .verify(&issued.id, &Solution::Offset(122), MatchPolicy::Tolerance(5))
            .await;
        assert!(first.is_ok());

        // Second attempt with the same (correct) answer: token is gone
        let second = store
            .verify(&issued.id, &Solution::Offset(122), MatchPolicy::Tolerance(5))
            .await;
        assert_eq!(second, Err(VerifyError::TokenNotFound));
    }

    #[tokio::test]
    async fn mismatch_keeps_token_alive() {
        let store = ChallengeStore::new();
        let issued = store
            .issue(KeyPolicy::Random, Solution::Offset(120), 300)
            .await;

        let wrong = store
            .verify(&issued.id, &Solution::Offset(150), MatchPolicy::Tolerance(5))
            .await;
        assert_eq!(wrong, Err(VerifyError::AnswerMismatch));

        // Retry with the exact answer still succeeds
        let right = store
            .verify(&issued.id, &Solution::Offset(120), MatchPolicy::Tolerance(5))
            .await;
        assert!(right.is_ok());
    }

    #[tokio::test]
    async fn tolerance_is_inclusive_at_the_boundary() {
        let store = ChallengeStore::new();
        let issued = store
            .issue(KeyPolicy::Random, Solution::Offset(100), 300)
            .await;

        assert_eq!(
            store
                .verify(&issued.id, &Solution::Offset(106), MatchPolicy::Tolerance(5))
                .await,
            Err(VerifyError::AnswerMismatch)
        );
        assert!(
            store
                .verify(&issued.id, &Solution::Offset(105), MatchPolicy::Tolerance(5))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn expired_token_is_evicted_on_verify() {
        let store = ChallengeStore::new();
        let issued = store
            .issue(KeyPolicy::Random, Solution::Offset(100), 0)
            .await;

        store.force_expire(&issued.id).await;

        assert_eq!(
            store
                .verify(&issued.id, &Solution::Offset(100), MatchPolicy::Tolerance(5))
                .await,
            Err(VerifyError::TokenExpired)
        );
        // The expired entry was removed, not just rejected
        assert_eq!(
            store
                .verify(&issued.id, &Solution::Offset(100), MatchPolicy::Tolerance(5))
                .await,
            Err(VerifyError::TokenNotFound)
        );
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let store = ChallengeStore::new();
        assert_eq!(
            store
                .verify("never-issued", &Solution::Offset(0), MatchPolicy::Tolerance(5))
                .await,
            Err(VerifyError::TokenNotFound)
        );
    }

    #[tokio::test]
    async fn identity_reissue_invalidates_prior_code() {
        let store = ChallengeStore::new();
        let email = "user@x.com".to_string();

        store
            .issue(
                KeyPolicy::Identity(email.clone()),
                Solution::Code("111111".into()),
                600,
            )
            .await;
        store
            .issue(
                KeyPolicy::Identity(email.clone()),
                Solution::Code("482913".into()),
                600,
            )
            .await;

        // Only the newest code verifies
        assert_eq!(
            store
                .verify(&email, &Solution::Code("111111".into()), MatchPolicy::Exact)
                .await,
            Err(VerifyError::AnswerMismatch)
        );
        assert!(
            store
                .verify(&email, &Solution::Code("482913".into()), MatchPolicy::Exact)
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn exact_policy_rejects_offset_answers() {
        let store = ChallengeStore::new();
        let issued = store
            .issue(
                KeyPolicy::Identity("a@b.c".into()),
                Solution::Code("123456".into()),
                600,
            )
            .await;

        assert_eq!(
            store
                .verify(&issued.id, &Solution::Offset(123456), MatchPolicy::Exact)
                .await,
            Err(VerifyError::AnswerMismatch)
        );
    }

    #[tokio::test]
    async fn sweep_drops_only_expired_entries() {
        let store = ChallengeStore::new();
        let live = store
            .issue(KeyPolicy::Random, Solution::Offset(10), 300)
            .await;
        let stale = store
            .issue(KeyPolicy::Random, Solution::Offset(20), 300)
            .await;

        store.force_expire(&stale.id).await;

        assert_eq!(store.sweep().await, 1);
        assert_eq!(store.len().await, 1);
        assert!(
            store
                .verify(&live.id, &Solution::Offset(10), MatchPolicy::Tolerance(5))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn racing_verifications_yield_exactly_one_success() {
        let store = Arc::new(ChallengeStore::new());
        let issued = store
            .issue(KeyPolicy::Random, Solution::Offset(100), 300)
            .await;

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            let id = issued.id.clone();
            handles.push(tokio::spawn(async move {
                store
                    .verify(&id, &Solution::Offset(100), MatchPolicy::Tolerance(5))
                    .await
            }));
        }

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                successes += 1;
            }
        }
        assert_eq!(successes, 1);
    }
}

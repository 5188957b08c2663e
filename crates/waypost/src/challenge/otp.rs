//! Email OTP issuance.
//!
//! OTP codes ride the same token store as slider challenges, keyed by the
//! user's email instead of a random id. The code travels out-of-band by
//! mail and is never present in an HTTP response. 6 decimal digits is
//! weaker entropy than a CAPTCHA token, acceptable because the code is
//! additionally bound to a known identity.

use rand::Rng;
use waypost_common::constants::OTP_DIGITS;

use super::store::{ChallengeStore, IssuedToken, KeyPolicy, Solution};

/// OTP issuer
pub struct OtpIssuer {
    /// Code TTL in seconds
    pub otp_ttl: u64,
}

impl OtpIssuer {
    pub fn new(otp_ttl: u64) -> Self {
        Self { otp_ttl }
    }

    /// Issue a fresh code for `email`, replacing any pending one.
    ///
    /// Returns the code for the caller to hand to the mailer.
    pub async fn issue(&self, store: &ChallengeStore, email: &str) -> (String, i64) {
        let code = generate_code();

        let IssuedToken { expires_at, .. } = store
            .issue(
                KeyPolicy::Identity(email.to_string()),
                Solution::Code(code.clone()),
                self.otp_ttl,
            )
            .await;

        tracing::debug!(email = %email, "Issued OTP code");

        (code, expires_at)
    }
}

/// Zero-padded 6-digit decimal code
fn generate_code() -> String {
    let n: u32 = rand::rng().random_range(0..1_000_000);
    format!("{:0width$}", n, width = OTP_DIGITS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenge::store::{MatchPolicy, VerifyError};

    #[test]
    fn codes_are_six_decimal_digits() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[tokio::test]
    async fn wrong_code_leaves_the_pending_otp_alive() {
        let store = ChallengeStore::new();
        let issuer = OtpIssuer::new(600);

        let (code, _) = issuer.issue(&store, "user@x.com").await;

        assert_eq!(
            store
                .verify(
                    "user@x.com",
                    &Solution::Code("000000".into()),
                    MatchPolicy::Exact
                )
                .await,
            Err(VerifyError::AnswerMismatch)
        );
        assert!(
            store
                .verify("user@x.com", &Solution::Code(code), MatchPolicy::Exact)
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn reissue_replaces_the_pending_code() {
        let store = ChallengeStore::new();
        let issuer = OtpIssuer::new(600);

        let (old, _) = issuer.issue(&store, "user@x.com").await;
        let (new, _) = issuer.issue(&store, "user@x.com").await;

        if old != new {
            assert_eq!(
                store
                    .verify("user@x.com", &Solution::Code(old), MatchPolicy::Exact)
                    .await,
                Err(VerifyError::AnswerMismatch)
            );
        }
        assert!(
            store
                .verify("user@x.com", &Solution::Code(new), MatchPolicy::Exact)
                .await
                .is_ok()
        );
    }
}

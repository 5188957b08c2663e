//! Application state and shared resources.

use anyhow::Result;
use std::sync::Arc;

use crate::auth::{
    GoogleVerifier, IdentityVerifier, Mailer, RestUserStore, SmtpMailer, TokenSigner, UserStore,
};
use crate::challenge::{ChallengeStore, OtpIssuer, SliderGenerator};
use crate::config::AppConfig;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,

    /// Ephemeral challenge token store (CAPTCHA + OTP)
    pub challenges: Arc<ChallengeStore>,

    /// Slider puzzle generator
    pub slider: Arc<SliderGenerator>,

    /// OTP issuer
    pub otp: Arc<OtpIssuer>,

    /// Access token signer/verifier
    pub signer: Arc<TokenSigner>,

    /// External user store
    pub users: Arc<dyn UserStore>,

    /// Federated identity verifier
    pub identity: Arc<dyn IdentityVerifier>,

    /// Outbound mail relay
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    /// Create new application state wired to the real collaborators
    pub fn new(config: AppConfig) -> Result<Self> {
        let users = Arc::new(RestUserStore::new(
            config.user_store.base_url.clone(),
            config.user_store.api_key.clone(),
        ));
        let identity = Arc::new(GoogleVerifier::new(config.google.tokeninfo_url.clone()));
        let mailer = Arc::new(SmtpMailer::new(
            &config.smtp.host,
            config.smtp.port,
            config.smtp.username.clone(),
            config.smtp.password.clone(),
            config.smtp.from.clone(),
        )?);

        Ok(Self::with_collaborators(config, users, identity, mailer))
    }

    /// Assemble state around explicit collaborators (tests swap in mocks)
    pub fn with_collaborators(
        config: AppConfig,
        users: Arc<dyn UserStore>,
        identity: Arc<dyn IdentityVerifier>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let challenges = Arc::new(ChallengeStore::new());
        let slider = Arc::new(SliderGenerator::new(
            config.captcha.challenge_ttl_secs,
            config.captcha.puzzle_base_url.clone(),
            config.captcha.reveal_cutout,
        ));
        let otp = Arc::new(OtpIssuer::new(config.otp.ttl_secs));
        let signer = Arc::new(TokenSigner::new(
            &config.jwt.secret,
            config.jwt.expire_minutes,
        ));

        Self {
            config,
            challenges,
            slider,
            otp,
            signer,
            users,
            identity,
            mailer,
        }
    }
}

//! Challenge token issuance and verification.
//!
//! The store is the single source of truth for pending slider CAPTCHA
//! tokens and email OTP codes; `slider` and `otp` are thin flavors over
//! the same issue/verify lifecycle.

mod otp;
mod slider;
pub mod store;

pub use otp::OtpIssuer;
pub use slider::SliderGenerator;
pub use store::{ChallengeStore, KeyPolicy, MatchPolicy, Solution, VerifyError, sweeper_worker};

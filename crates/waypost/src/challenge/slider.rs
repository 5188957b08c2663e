//! Slider CAPTCHA puzzle parameters.
//!
//! The puzzle image itself comes from an external placeholder image
//! service; this module only picks the cutout position and builds the
//! client-facing parameters around an issued token.

use rand::Rng;
use waypost_common::constants::slider;
use waypost_common::types::SliderPuzzle;

use super::store::{ChallengeStore, IssuedToken, KeyPolicy, Solution};

/// Slider puzzle generator
pub struct SliderGenerator {
    /// Challenge TTL in seconds
    pub challenge_ttl: u64,
    /// Base URL of the placeholder image service
    pub puzzle_base_url: String,
    /// Whether the generate response includes the cutout offset
    pub reveal_cutout: bool,
}

impl SliderGenerator {
    pub fn new(challenge_ttl: u64, puzzle_base_url: String, reveal_cutout: bool) -> Self {
        Self {
            challenge_ttl,
            puzzle_base_url,
            reveal_cutout,
        }
    }

    /// Generate a new slider challenge, storing the cutout position as the
    /// token's solution.
    pub async fn generate(&self, store: &ChallengeStore) -> SliderPuzzle {
        let cutout_x = random_cutout_x();

        let IssuedToken { id, expires_at } = store
            .issue(KeyPolicy::Random, Solution::Offset(cutout_x), self.challenge_ttl)
            .await;

        tracing::debug!(token = %id, cutout_x, "Generated slider challenge");

        SliderPuzzle {
            puzzle_url: self.puzzle_url(&id),
            token: id,
            cutout_x: self.reveal_cutout.then_some(cutout_x),
            slider_width: slider::SLIDER_WIDTH,
            expires_at,
        }
    }

    /// Per-token image URL, seeded so the picture is stable for a challenge
    fn puzzle_url(&self, token: &str) -> String {
        format!(
            "{}/seed/{}/{}/{}",
            self.puzzle_base_url.trim_end_matches('/'),
            token,
            slider::PUZZLE_WIDTH,
            slider::PUZZLE_HEIGHT
        )
    }
}

/// Uniform cutout offset within the track, clear of both edges
fn random_cutout_x() -> i64 {
    rand::rng().random_range(slider::CUTOUT_MIN_X..=slider::CUTOUT_MAX_X)
}

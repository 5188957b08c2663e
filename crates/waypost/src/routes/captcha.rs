//! Slider CAPTCHA generation and verification endpoints.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use super::ApiError;
use crate::challenge::{MatchPolicy, Solution, VerifyError};
use crate::state::AppState;
use waypost_common::{SliderPuzzle, WaypostError};

/// Generate a new slider challenge. Always succeeds.
pub async fn generate_slider(State(state): State<AppState>) -> Json<SliderPuzzle> {
    let puzzle = state.slider.generate(&state.challenges).await;
    Json(puzzle)
}

#[derive(Deserialize)]
pub struct VerifySliderRequest {
    token: String,
    /// Thumb position on release; touch clients report fractional pixels
    position: f64,
    tolerance: Option<i64>,
}

#[derive(Serialize)]
pub struct VerifySliderResponse {
    message: &'static str,
}

/// Verify a slider position against the challenge's cutout offset.
///
/// A near-miss keeps the token live for another attempt; a pass consumes
/// it, and expiry evicts it.
pub async fn verify_slider(
    State(state): State<AppState>,
    Json(payload): Json<VerifySliderRequest>,
) -> Result<Json<VerifySliderResponse>, ApiError> {
    let tolerance = payload
        .tolerance
        .unwrap_or(state.config.captcha.default_tolerance);
    let position = payload.position.round() as i64;

    state
        .challenges
        .verify(
            &payload.token,
            &Solution::Offset(position),
            MatchPolicy::Tolerance(tolerance),
        )
        .await
        .map_err(|e| match e {
            VerifyError::TokenNotFound => {
                WaypostError::TokenNotFound("Invalid CAPTCHA token".into())
            }
            VerifyError::TokenExpired => WaypostError::TokenExpired("CAPTCHA expired".into()),
            VerifyError::AnswerMismatch => {
                WaypostError::AnswerMismatch("Incorrect slider position".into())
            }
        })?;

    tracing::info!(token = %payload.token, "Slider CAPTCHA verified");

    Ok(Json(VerifySliderResponse {
        message: "Slider CAPTCHA verified successfully",
    }))
}

//! HTTP route handlers for Waypost.

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use waypost_common::WaypostError;

mod auth;
mod captcha;
mod health;


/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/health", get(health::health_check))
        // Slider CAPTCHA
        .route("/captcha/slider/generate", get(captcha::generate_slider))
        .route("/captcha/slider/verify", post(captcha::verify_slider))
        // Federated and password auth
        .route("/auth/google", post(auth::google_sign_in))
        .route("/auth/login", post(auth::login))
        // OTP flows
        .route("/auth/request-otp", post(auth::request_otp))
        .route("/auth/verify-otp-reset", post(auth::verify_otp_reset))
        .route("/auth/send-otp-signup", post(auth::send_otp_signup))
        .route("/auth/verify-otp-signup", post(auth::verify_otp_signup))
        // Protected
        .route("/dashboard", get(auth::dashboard))
        // Open CORS, matching the mobile client's expectations
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Error wrapper mapping `WaypostError` onto HTTP responses.
///
/// Bodies are `{"detail": message}`, the shape the mobile client parses.
/// Server-side causes (5xx) are logged and replaced with a generic detail.
pub struct ApiError(pub WaypostError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let detail = if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
            if self.0.is_upstream() {
                "Upstream service unavailable".to_string()
            } else {
                "Internal server error".to_string()
            }
        } else {
            self.0.to_string()
        };

        (status, Json(serde_json::json!({ "detail": detail }))).into_response()
    }
}

impl From<WaypostError> for ApiError {
    fn from(err: WaypostError) -> Self {
        Self(err)
    }
}

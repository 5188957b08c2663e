//! Authentication endpoints: federated sign-in, password login, and the
//! OTP signup / password-reset flows.
//!
//! The OTP flows follow a strict verify-then-mutate sequence: the code is
//! checked (and consumed on success) in the same request that performs the
//! external mutation, so no mutation ever happens without a verification
//! immediately preceding it.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, header},
};
use serde::{Deserialize, Serialize};

use super::ApiError;
use crate::auth::{hash_password, validate_password, verify_password};
use crate::challenge::{MatchPolicy, Solution, VerifyError};
use crate::state::AppState;
use waypost_common::{UserRecord, WaypostError};

#[derive(Serialize)]
pub struct MessageResponse {
    message: &'static str,
}

#[derive(Serialize)]
pub struct SessionResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
    access_token: String,
    user: UserRecord,
}

// === Federated sign-in ===

#[derive(Deserialize)]
pub struct GoogleSignInRequest {
    /// Google ID token; older clients send it under `token`
    #[serde(alias = "token")]
    id_token: String,
}

/// Verify a Google ID token, find-or-create the user, and issue a JWT.
pub async fn google_sign_in(
    State(state): State<AppState>,
    Json(payload): Json<GoogleSignInRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let claims = state.identity.verify(&payload.id_token).await?;

    let user = match state.users.find_by_uid(&claims.uid).await? {
        Some(user) => user,
        None => {
            let user = UserRecord {
                uid: Some(claims.uid.clone()),
                email: claims.email.clone(),
                name: claims.name.clone(),
                picture: claims.picture.clone(),
                password_hash: None,
            };
            let created = state.users.create(&user).await?;
            tracing::info!(uid = %claims.uid, "Registered new federated user");
            created
        }
    };

    let access_token = state.signer.issue(&claims.uid)?;
    Ok(Json(SessionResponse {
        message: None,
        access_token,
        user,
    }))
}

// === Password login ===

#[derive(Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}

/// Email/password login.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let invalid = || WaypostError::Auth("Invalid email or password".into());

    let user = state
        .users
        .find_by_email(&payload.email)
        .await?
        .ok_or_else(invalid)?;
    let hash = user.password_hash.as_deref().ok_or_else(invalid)?;

    if !verify_password(&payload.password, hash)? {
        return Err(invalid().into());
    }

    let access_token = state.signer.issue(&user.email)?;
    Ok(Json(SessionResponse {
        message: None,
        access_token,
        user,
    }))
}

// === OTP: password reset ===

#[derive(Deserialize)]
pub struct RequestOtpRequest {
    email: String,
}

/// Issue a password-reset OTP for an existing account and mail it.
pub async fn request_otp(
    State(state): State<AppState>,
    Json(payload): Json<RequestOtpRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if state.users.find_by_email(&payload.email).await?.is_none() {
        return Err(WaypostError::NotFound("User not found".into()).into());
    }

    let (code, _) = state.otp.issue(&state.challenges, &payload.email).await;
    state
        .mailer
        .send(
            &payload.email,
            "Waypost password reset",
            &otp_mail_body(&code, state.config.otp.ttl_secs),
        )
        .await?;

    Ok(Json(MessageResponse {
        message: "OTP sent to your email",
    }))
}

#[derive(Deserialize)]
pub struct VerifyOtpResetRequest {
    email: String,
    otp: String,
    /// The mobile client sends this camelCased
    #[serde(alias = "newPassword")]
    new_password: String,
}

/// Verify a reset OTP and update the password hash.
///
/// A wrong code leaves the pending OTP live for another try; a correct
/// code is consumed by the verification itself, then the hash update runs.
pub async fn verify_otp_reset(
    State(state): State<AppState>,
    Json(payload): Json<VerifyOtpResetRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    validate_password(&payload.new_password)?;

    state
        .challenges
        .verify(
            &payload.email,
            &Solution::Code(payload.otp.clone()),
            MatchPolicy::Exact,
        )
        .await
        .map_err(|e| map_otp_error(e, "Invalid OTP"))?;

    let hash = hash_password(&payload.new_password)?;
    state
        .users
        .update_password_hash(&payload.email, &hash)
        .await?;

    // Consumed by the successful verify already; harmless if repeated
    state.challenges.remove(&payload.email).await;

    tracing::info!(email = %payload.email, "Password reset completed");

    Ok(Json(MessageResponse {
        message: "Password reset successful",
    }))
}

// === OTP: signup verification ===

#[derive(Deserialize)]
pub struct SendOtpSignupRequest {
    email: String,
}

/// Issue a signup-verification OTP for a not-yet-registered email.
pub async fn send_otp_signup(
    State(state): State<AppState>,
    Json(payload): Json<SendOtpSignupRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if state.users.find_by_email(&payload.email).await?.is_some() {
        return Err(WaypostError::InvalidInput("Email already registered".into()).into());
    }

    let (code, _) = state.otp.issue(&state.challenges, &payload.email).await;
    state
        .mailer
        .send(
            &payload.email,
            "Waypost signup verification",
            &otp_mail_body(&code, state.config.otp.ttl_secs),
        )
        .await?;

    Ok(Json(MessageResponse {
        message: "OTP sent for signup verification",
    }))
}

#[derive(Deserialize)]
pub struct VerifyOtpSignupRequest {
    email: String,
    otp: String,
    password: String,
    name: Option<String>,
}

/// Verify a signup OTP and create the account.
pub async fn verify_otp_signup(
    State(state): State<AppState>,
    Json(payload): Json<VerifyOtpSignupRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    validate_password(&payload.password)?;

    state
        .challenges
        .verify(
            &payload.email,
            &Solution::Code(payload.otp.clone()),
            MatchPolicy::Exact,
        )
        .await
        .map_err(|e| map_otp_error(e, "Invalid or expired OTP"))?;

    // The email could have been registered between send and verify
    if state.users.find_by_email(&payload.email).await?.is_some() {
        return Err(WaypostError::InvalidInput("Email already registered".into()).into());
    }

    let user = UserRecord {
        uid: None,
        email: payload.email.clone(),
        name: payload.name.clone(),
        picture: None,
        password_hash: Some(hash_password(&payload.password)?),
    };
    let created = state.users.create(&user).await?;

    state.challenges.remove(&payload.email).await;

    tracing::info!(email = %payload.email, "Signup completed");

    let access_token = state.signer.issue(&created.email)?;
    Ok(Json(SessionResponse {
        message: Some("Signup successful"),
        access_token,
        user: created,
    }))
}

// === Protected route ===

#[derive(Serialize)]
pub struct DashboardResponse {
    user: UserRecord,
}

/// JWT-protected route returning the caller's user record.
pub async fn dashboard(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<DashboardResponse>, ApiError> {
    let token = bearer_token(&headers)?;
    let claims = state.signer.verify(token)?;

    // Subject is a federated uid or, for password accounts, the email
    let user = match state.users.find_by_uid(&claims.sub).await? {
        Some(user) => Some(user),
        None => state.users.find_by_email(&claims.sub).await?,
    };

    let user = user.ok_or_else(|| WaypostError::NotFound("User not found".into()))?;
    Ok(Json(DashboardResponse { user }))
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, WaypostError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| WaypostError::Auth("Missing bearer token".into()))
}

fn map_otp_error(err: VerifyError, message: &str) -> WaypostError {
    match err {
        VerifyError::TokenNotFound => WaypostError::TokenNotFound(message.into()),
        VerifyError::TokenExpired => WaypostError::TokenExpired(message.into()),
        VerifyError::AnswerMismatch => WaypostError::AnswerMismatch(message.into()),
    }
}

fn otp_mail_body(code: &str, ttl_secs: u64) -> String {
    format!(
        "Your Waypost verification code is {}. It expires in {} minutes.",
        code,
        ttl_secs / 60
    )
}

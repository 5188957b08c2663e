//! Core types shared across Waypost components.

use serde::{Deserialize, Serialize};

/// A user record as persisted in the external user store.
///
/// `uid` is the federated-identity subject for Google sign-ins and is
/// absent for email/password accounts. `password_hash` never leaves the
/// server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    /// Federated identity subject (Google uid), if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,

    /// Unique email address
    pub email: String,

    /// Display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Avatar URL from the identity provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,

    /// Bcrypt hash, server-side only
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,
}

/// Verified claims returned by the identity provider for a bearer credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Stable subject identifier
    pub uid: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
}

/// Client-facing parameters of a slider CAPTCHA puzzle.
///
/// `cutout_x` is the solution. Serializing it to the client is part of the
/// contract the shipped mobile app relies on; it can be suppressed via
/// configuration (see `captcha.reveal_cutout`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SliderPuzzle {
    /// Opaque single-use challenge token
    pub token: String,

    /// URL of the background puzzle image (external placeholder service)
    pub puzzle_url: String,

    /// Horizontal offset of the cutout piece
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cutout_x: Option<i64>,

    /// Width of the draggable piece
    pub slider_width: u32,

    /// Challenge expiry timestamp (unix seconds)
    pub expires_at: i64,
}

//! Shared constants for Waypost components.

/// Default HTTP listen address
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8000";

/// Slider CAPTCHA challenge validity (5 minutes)
pub const CAPTCHA_TTL_SECS: u64 = 300;

/// OTP code validity (10 minutes)
pub const OTP_TTL_SECS: u64 = 600;

/// Default slider verification tolerance in pixels
pub const DEFAULT_SLIDER_TOLERANCE: i64 = 5;

/// Interval between expired-token sweeps (resource hygiene, not correctness)
pub const SWEEP_INTERVAL_SECS: u64 = 60;

/// Slider puzzle geometry, matching the mobile client's track layout
pub mod slider {
    /// Puzzle image width in pixels
    pub const PUZZLE_WIDTH: u32 = 300;

    /// Puzzle image height in pixels
    pub const PUZZLE_HEIGHT: u32 = 200;

    /// Width of the draggable thumb / cutout piece
    pub const SLIDER_WIDTH: u32 = 50;

    /// Minimum cutout offset (keeps the piece clear of the left edge)
    pub const CUTOUT_MIN_X: i64 = 30;

    /// Maximum cutout offset (keeps the piece inside the track)
    pub const CUTOUT_MAX_X: i64 = 250;
}

/// Password policy for email/password accounts
pub mod password {
    /// Minimum password length
    pub const MIN_LEN: usize = 8;

    /// Maximum password length (bcrypt input limit)
    pub const MAX_LEN: usize = 72;
}

/// Number of decimal digits in an OTP code
pub const OTP_DIGITS: usize = 6;

/// JWT access token validity in minutes
pub const ACCESS_TOKEN_EXPIRE_MINUTES: i64 = 60;

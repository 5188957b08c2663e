//! # Waypost Common
//!
//! Shared types, errors, and constants used across Waypost components.
//!
//! ## Modules
//! - `types` - Core data structures (UserRecord, SliderPuzzle, etc.)
//! - `error` - Common error types
//! - `constants` - Shared configuration constants

pub mod constants;
pub mod error;
pub mod types;

pub use error::WaypostError;
pub use types::*;

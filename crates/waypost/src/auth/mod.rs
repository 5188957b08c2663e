//! External auth collaborators.
//!
//! Everything here is a pass-through integration behind a trait: user
//! persistence, federated identity verification, password hashing, JWT
//! issuance, and mail delivery. The challenge engine never talks to these
//! directly; handlers compose them.

mod identity;
mod jwt;
mod mailer;
mod password;
mod users;

pub use identity::{GoogleVerifier, IdentityVerifier};
pub use jwt::{Claims, TokenSigner};
pub use mailer::{Mailer, SmtpMailer};
pub use password::{hash_password, validate_password, verify_password};
pub use users::{RestUserStore, UserStore};

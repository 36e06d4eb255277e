//! Authentication module for StarkFinder
//!
//! - bcrypt password hashing
//! - JWT access token issuance and validation
//! - Username/password login and bearer-token resolution

mod jwt;
mod password;
mod service;

pub use jwt::{Claims, IssuedToken, JwtError, JwtIssuer, TokenIssuer};
pub use password::{hash_password, verify_password, PasswordError};
pub use service::{AuthError, AuthService};

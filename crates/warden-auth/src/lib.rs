//! # warden-auth
//!
//! Credentials and sessions for Warden.
//!
//! ## Modules
//!
//! - `jwt`: short-lived signed access tokens (HS256)
//! - `token`: opaque refresh/invitation tokens and their digests
//! - `password`: Argon2 password hashing and verification
//! - `session`: the bounded session store, the refresh-token rotation
//!   protocol with reuse detection, and the login/refresh/logout surface

pub mod jwt;
pub mod password;
pub mod session;
pub mod token;

pub use jwt::{AccessToken, Claims, JwtDecoder, JwtEncoder};
pub use password::PasswordHasher;
pub use session::manager::normalize_email;
pub use session::{
    IssuedSession, RotationProtocol, SessionCleanup, SessionManager, SessionStore, TokenState,
};
pub use token::{MintedToken, generate_opaque_token, hash_token};

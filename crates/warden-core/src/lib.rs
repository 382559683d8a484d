//! # warden-core
//!
//! Core crate for Warden. Contains the configuration schema, the unified
//! error system, and the small set of traits (clock, mailer) that the
//! session and invitation protocols depend on.
//!
//! This crate has **no** internal dependencies on other Warden crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;

//! # warden-api
//!
//! HTTP API layer for Warden built on Axum.
//!
//! Provides the auth and invitation endpoints, the bearer-token and
//! client-tag extractors, refresh-token cookie handling, DTOs, and the
//! mapping from [`warden_core::AppError`] to HTTP responses.

pub mod cookie;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;

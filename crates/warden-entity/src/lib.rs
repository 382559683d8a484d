//! # warden-entity
//!
//! Domain entity models for Warden. Every struct here is either a table
//! row (deriving `sqlx::FromRow`) or the input used to create one.

pub mod audit;
pub mod invitation;
pub mod session;
pub mod user;

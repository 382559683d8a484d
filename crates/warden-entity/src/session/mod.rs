//! Session domain entities.

pub mod client;
pub mod model;

pub use client::ClientTag;
pub use model::{CreateSession, Session};

//! Accounts: invitation-gated registration and profile lookup.

pub mod service;

pub use service::{AccountService, NewAccount};

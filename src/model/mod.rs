//! Data model for exported records

pub mod user;

pub use user::{Identity, User};

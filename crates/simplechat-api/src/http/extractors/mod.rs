//! Custom Axum extractors.

pub mod message;
pub mod session;

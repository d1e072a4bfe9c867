//! HTTP layer for SimpleChat.
//!
//! Axum router serving the chat page, its script, and the `/chatbot`
//! endpoint. Sessions ride on an HttpOnly cookie; errors use the envelope
//! format from [`response`].

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod response;
pub mod router;

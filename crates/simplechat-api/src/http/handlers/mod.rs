//! Request handlers.

pub mod chatbot;
pub mod page;

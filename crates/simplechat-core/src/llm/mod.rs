//! LLM provider abstractions for SimpleChat.
//!
//! - `LlmProvider`: RPITIT trait for concrete provider implementations
//! - `BoxLlmProvider`: Object-safe wrapper for dynamic dispatch
//! - `ModelGateway`: bounded-time invocation with error folding

pub mod box_provider;
pub mod gateway;
pub mod provider;

//! Chat turn handling.
//!
//! - `SessionRegistry`: issues and tracks per-browser session ids
//! - `PromptAssembler`: builds the windowed completion request
//! - `TurnOrchestrator`: load, assemble, invoke, persist

pub mod orchestrator;
pub mod prompt;
pub mod session;

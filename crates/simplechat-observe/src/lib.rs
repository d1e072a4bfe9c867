//! Observability for SimpleChat: structured logging through `tracing`, with
//! an optional OpenTelemetry bridge for exporting spans.

pub mod tracing_setup;

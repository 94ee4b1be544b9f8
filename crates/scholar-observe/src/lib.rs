//! Observability setup for Scholar: structured logging and optional
//! OpenTelemetry span export.

pub mod tracing_setup;

//! HTTP/REST API layer for Scholar.
//!
//! Axum-based REST API at `/api/v1/` with gateway-supplied user identity,
//! envelope response format, SSE chat streaming, and CORS support.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod response;
pub mod router;

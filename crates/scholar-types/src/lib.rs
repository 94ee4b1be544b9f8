//! Shared domain types for Scholar.
//!
//! Conversations, turns, agents, routing keys, LLM request/stream shapes,
//! configuration, and the error taxonomy shared by every layer.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod agent;
pub mod config;
pub mod conversation;
pub mod error;
pub mod llm;
pub mod user;

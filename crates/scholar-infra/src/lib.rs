//! Infrastructure layer for Scholar.
//!
//! Contains implementations of the traits defined in `scholar-core`:
//! SQLite storage for conversations and profiles, the OpenAI-compatible
//! generation client, and the `config.toml` loader.

pub mod config;
pub mod llm;
pub mod sqlite;

//! Conversation and profile persistence abstractions for Scholar.
//!
//! This module defines the `ConversationRepository` and `ProfileRepository`
//! traits that the infrastructure layer implements.

pub mod repository;

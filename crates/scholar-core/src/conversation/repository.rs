//! Repository trait definitions for conversations, turns, and profiles.
//!
//! The store is assumed strongly consistent for a single conversation:
//! a turn appended by one call is visible to the next `load_turns`.

use chrono::{DateTime, Utc};
use scholar_types::conversation::{Conversation, ConversationSummary, MessageRole, Turn};
use scholar_types::error::RepositoryError;
use scholar_types::user::UserProfile;
use uuid::Uuid;

/// Repository trait for conversation state and its append-only turns.
///
/// Implementations live in scholar-infra (e.g., `SqliteConversationRepository`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait ConversationRepository: Send + Sync {
    /// Persist a new conversation together with its initial system turn.
    ///
    /// Both rows are written or neither is.
    fn create_conversation(
        &self,
        conversation: &Conversation,
        system_turn: &str,
    ) -> impl std::future::Future<Output = Result<Conversation, RepositoryError>> + Send;

    /// Get a conversation by its unique ID.
    fn get_conversation(
        &self,
        conversation_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Conversation>, RepositoryError>> + Send;

    /// List a user's conversations, most recent activity first.
    fn list_conversations(
        &self,
        user_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<ConversationSummary>, RepositoryError>> + Send;

    /// Delete a conversation and all of its turns.
    ///
    /// Returns `RepositoryError::NotFound` when no such conversation exists.
    fn delete_conversation(
        &self,
        conversation_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Append one turn. The store assigns the ordering key.
    fn append_turn(
        &self,
        conversation_id: &Uuid,
        role: MessageRole,
        content: &str,
        tokens: Option<u32>,
    ) -> impl std::future::Future<Output = Result<Turn, RepositoryError>> + Send;

    /// All turns of a conversation in append order.
    fn load_turns(
        &self,
        conversation_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<Turn>, RepositoryError>> + Send;

    /// Bump a conversation's `updated_at`.
    fn touch_conversation(
        &self,
        conversation_id: &Uuid,
        at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}

/// Read/write access to user profile data used for personalization.
pub trait ProfileRepository: Send + Sync {
    fn get_profile(
        &self,
        user_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<UserProfile>, RepositoryError>> + Send;

    /// Insert or replace a profile.
    fn upsert_profile(
        &self,
        profile: &UserProfile,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}

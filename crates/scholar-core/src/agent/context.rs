//! Per-call message assembly.
//!
//! Stored system turns are persona snapshots from conversation creation and
//! are treated as stale: every call gets a freshly built system message
//! carrying personalization plus the selected agent's instructions.

use scholar_types::agent::Agent;
use scholar_types::conversation::{MessageRole, Turn};
use scholar_types::llm::Message;
use scholar_types::user::{ABSENT_NAME, UserProfile};

/// Build the system prompt for one call.
pub fn personalized_system_prompt(agent: &Agent, profile: Option<&UserProfile>) -> String {
    let first_name = profile
        .map(UserProfile::display_first_name)
        .unwrap_or(ABSENT_NAME);
    format!("Current user's name: {first_name}\n\n{}", agent.instructions)
}

/// Assemble the ordered message list for a generation call.
///
/// The result always holds exactly one system message, in first position,
/// followed by prior user/assistant turns in order and then `user_message`.
pub fn assemble(
    agent: &Agent,
    history: &[Turn],
    profile: Option<&UserProfile>,
    user_message: &str,
) -> Vec<Message> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(Message::system(personalized_system_prompt(agent, profile)));

    messages.extend(
        history
            .iter()
            .filter(|turn| turn.role != MessageRole::System)
            .map(|turn| Message {
                role: turn.role,
                content: turn.content.clone(),
            }),
    );

    messages.push(Message::user(user_message));
    messages
}

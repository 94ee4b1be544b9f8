//! Mode/sub-mode to agent selection.

use scholar_types::agent::Agent;
use scholar_types::conversation::{Conversation, Mode, SubMode};
use tracing::debug;

use super::registry::AgentRegistry;

/// Select the agent for a conversation's routing keys.
///
/// Pure and total: unknown or missing tutor sub-modes resolve to the
/// registry's default agent.
pub fn select<'a>(registry: &'a AgentRegistry, mode: Mode, sub_mode: Option<&SubMode>) -> &'a Agent {
    let agent = match mode {
        Mode::Tutor => registry.lookup(sub_mode),
        Mode::StudyTips => registry.study_coach(),
    };

    if mode == Mode::Tutor && sub_mode.and_then(SubMode::subject).is_none() {
        debug!(
            sub_mode = sub_mode.map(SubMode::as_str).unwrap_or("<none>"),
            agent = %agent.name,
            "Unrecognized sub-mode, routing to default agent"
        );
    }

    agent
}

pub fn select_for<'a>(registry: &'a AgentRegistry, conversation: &Conversation) -> &'a Agent {
    select(registry, conversation.mode, conversation.sub_mode.as_ref())
}

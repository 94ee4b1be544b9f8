//! Deterministic test doubles shared by the core's unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use scholar_types::conversation::{Conversation, ConversationSummary, MessageRole, Turn};
use scholar_types::error::RepositoryError;
use scholar_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, StopReason, StreamEvent, Usage,
};
use scholar_types::user::UserProfile;
use uuid::Uuid;

use crate::conversation::repository::{ConversationRepository, ProfileRepository};
use crate::llm::generator::{EventStream, Generator};

/// One scripted outcome, consumed per call in FIFO order.
#[derive(Clone)]
pub enum Script {
    Reply(String),
    Fragments(Vec<String>),
    FragmentsThenFail(Vec<String>, LlmError),
    Fail(LlmError),
    /// Never completes; exercises timeouts.
    Hang,
}

/// Scripted generator that records every request it receives.
#[derive(Clone, Default)]
pub struct MockGenerator {
    script: Arc<Mutex<VecDeque<Script>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockGenerator {
    pub fn new(script: impl IntoIterator<Item = Script>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into_iter().collect())),
            requests: Arc::default(),
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next(&self, request: CompletionRequest) -> Script {
        self.requests.lock().unwrap().push(request);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Script::Fail(LlmError::Provider {
                    message: "no scripted reply".to_string(),
                })
            })
    }
}

fn response(model: &str, content: String) -> CompletionResponse {
    CompletionResponse {
        id: "mock-1".to_string(),
        content,
        model: model.to_string(),
        stop_reason: StopReason::EndTurn,
        usage: Usage {
            input_tokens: 10,
            output_tokens: 20,
        },
    }
}

impl Generator for MockGenerator {
    fn name(&self) -> &str {
        "mock"
    }

    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send {
        let model = request.model.clone();
        let script = self.next(request.clone());
        async move {
            match script {
                Script::Reply(text) => Ok(response(&model, text)),
                Script::Fragments(parts) => Ok(response(&model, parts.concat())),
                Script::FragmentsThenFail(_, err) | Script::Fail(err) => Err(err),
                Script::Hang => std::future::pending().await,
            }
        }
    }

    fn stream(&self, request: CompletionRequest) -> EventStream {
        let script = self.next(request);
        Box::pin(async_stream::stream! {
            match script {
                Script::Reply(text) => {
                    yield Ok(StreamEvent::Connected);
                    yield Ok(StreamEvent::TextDelta { text });
                    yield Ok(StreamEvent::Done);
                }
                Script::Fragments(parts) => {
                    yield Ok(StreamEvent::Connected);
                    for text in parts {
                        yield Ok(StreamEvent::TextDelta { text });
                    }
                    yield Ok(StreamEvent::MessageDelta { stop_reason: StopReason::EndTurn });
                    yield Ok(StreamEvent::Usage(Usage { input_tokens: 10, output_tokens: 20 }));
                    yield Ok(StreamEvent::Done);
                }
                Script::FragmentsThenFail(parts, err) => {
                    for text in parts {
                        yield Ok(StreamEvent::TextDelta { text });
                    }
                    yield Err(err);
                }
                Script::Fail(err) => {
                    yield Err(err);
                }
                Script::Hang => {
                    yield Ok(StreamEvent::Connected);
                    std::future::pending::<()>().await;
                }
            }
        })
    }
}

#[derive(Default)]
struct StoreState {
    conversations: HashMap<Uuid, Conversation>,
    turns: Vec<Turn>,
    profiles: HashMap<Uuid, UserProfile>,
    next_seq: i64,
    fail_turn_writes: bool,
}

impl StoreState {
    fn push_turn(
        &mut self,
        conversation_id: Uuid,
        role: MessageRole,
        content: &str,
        tokens: Option<u32>,
    ) -> Turn {
        self.next_seq += 1;
        let turn = Turn {
            id: Uuid::now_v7(),
            conversation_id,
            seq: self.next_seq,
            role,
            content: content.to_string(),
            tokens,
            created_at: Utc::now(),
        };
        self.turns.push(turn.clone());
        turn
    }
}

/// In-memory conversation and profile store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl MemoryStore {
    /// Make every later turn write fail with `RepositoryError::Query`.
    pub fn fail_turn_writes(&self) {
        self.state.lock().unwrap().fail_turn_writes = true;
    }

    pub fn turns(&self, conversation_id: &Uuid) -> Vec<Turn> {
        let state = self.state.lock().unwrap();
        state
            .turns
            .iter()
            .filter(|t| &t.conversation_id == conversation_id)
            .cloned()
            .collect()
    }
}

impl ConversationRepository for MemoryStore {
    async fn create_conversation(
        &self,
        conversation: &Conversation,
        system_turn: &str,
    ) -> Result<Conversation, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_turn_writes {
            return Err(RepositoryError::Query("turn write rejected".to_string()));
        }
        state
            .conversations
            .insert(conversation.id, conversation.clone());
        state.push_turn(conversation.id, MessageRole::System, system_turn, None);
        Ok(conversation.clone())
    }

    async fn get_conversation(
        &self,
        conversation_id: &Uuid,
    ) -> Result<Option<Conversation>, RepositoryError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .conversations
            .get(conversation_id)
            .cloned())
    }

    async fn list_conversations(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<ConversationSummary>, RepositoryError> {
        let state = self.state.lock().unwrap();
        let mut summaries: Vec<ConversationSummary> = state
            .conversations
            .values()
            .filter(|c| &c.user_id == user_id)
            .map(|c| {
                let turns: Vec<&Turn> = state
                    .turns
                    .iter()
                    .filter(|t| t.conversation_id == c.id)
                    .collect();
                let last_activity = turns
                    .iter()
                    .map(|t| t.created_at)
                    .max()
                    .unwrap_or(c.updated_at)
                    .max(c.updated_at);
                ConversationSummary {
                    conversation: c.clone(),
                    message_count: turns.len() as u32,
                    last_activity,
                }
            })
            .collect();
        summaries.sort_by(|a, b| b.last_activity.cmp(&a.last_activity));
        Ok(summaries)
    }

    async fn delete_conversation(&self, conversation_id: &Uuid) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().unwrap();
        if state.conversations.remove(conversation_id).is_none() {
            return Err(RepositoryError::NotFound);
        }
        state.turns.retain(|t| &t.conversation_id != conversation_id);
        Ok(())
    }

    async fn append_turn(
        &self,
        conversation_id: &Uuid,
        role: MessageRole,
        content: &str,
        tokens: Option<u32>,
    ) -> Result<Turn, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_turn_writes {
            return Err(RepositoryError::Query("turn write rejected".to_string()));
        }
        if !state.conversations.contains_key(conversation_id) {
            return Err(RepositoryError::NotFound);
        }
        Ok(state.push_turn(*conversation_id, role, content, tokens))
    }

    async fn load_turns(&self, conversation_id: &Uuid) -> Result<Vec<Turn>, RepositoryError> {
        Ok(self.turns(conversation_id))
    }

    async fn touch_conversation(
        &self,
        conversation_id: &Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().unwrap();
        match state.conversations.get_mut(conversation_id) {
            Some(conversation) => {
                conversation.updated_at = at;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }
}

impl ProfileRepository for MemoryStore {
    async fn get_profile(&self, user_id: &Uuid) -> Result<Option<UserProfile>, RepositoryError> {
        Ok(self.state.lock().unwrap().profiles.get(user_id).cloned())
    }

    async fn upsert_profile(&self, profile: &UserProfile) -> Result<(), RepositoryError> {
        self.state
            .lock()
            .unwrap()
            .profiles
            .insert(profile.user_id, profile.clone());
        Ok(())
    }
}

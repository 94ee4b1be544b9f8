//! Tutor service orchestrating conversations and chat replies.
//!
//! TutorService sequences one chat request end to end: persist the user
//! turn, assemble context, route to an agent, draft, post-process, persist
//! the assistant turn. The streaming variant forwards fragments as they
//! arrive and persists their concatenation once the stream has finished.

use std::pin::Pin;
use std::sync::Arc;

use chrono::Utc;
use futures_util::{Stream, StreamExt};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use scholar_types::config::PipelineConfig;
use scholar_types::conversation::{
    Conversation, ConversationSummary, MessageRole, Mode, SubMode, Turn,
};
use scholar_types::error::{ChatError, RepositoryError};
use scholar_types::llm::Message;
use scholar_types::user::UserProfile;

use crate::agent::context::{assemble, personalized_system_prompt};
use crate::agent::invoker::AgentInvoker;
use crate::agent::registry::AgentRegistry;
use crate::agent::router;
use crate::conversation::repository::{ConversationRepository, ProfileRepository};
use crate::pipeline::APOLOGY_TEXT;
use crate::pipeline::postprocess::PostProcessor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyStatus {
    Completed,
    Failed,
}

/// Result of a synchronous chat call.
#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub raw_text: String,
    pub formatted_text: String,
    pub status: ReplyStatus,
    /// Name of the agent that drafted the reply.
    pub agent: String,
    pub verified: bool,
}

impl ChatReply {
    fn apology(agent: &str) -> Self {
        Self {
            raw_text: APOLOGY_TEXT.to_string(),
            formatted_text: APOLOGY_TEXT.to_string(),
            status: ReplyStatus::Failed,
            agent: agent.to_string(),
            verified: false,
        }
    }
}

/// One record of a streamed reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatFragment {
    Text { text: String },
    /// Terminal marker; the full reply has been persisted.
    Done,
    /// Terminal marker; nothing was persisted for the assistant.
    Error { message: String },
}

pub type ChatStream = Pin<Box<dyn Stream<Item = ChatFragment> + Send + 'static>>;

/// A conversation with its turns in order.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationDetail {
    #[serde(flatten)]
    pub conversation: Conversation,
    pub turns: Vec<Turn>,
}

/// Everything a generation call needs, gathered before drafting starts.
struct Prepared {
    conversation: Conversation,
    agent_name: String,
    messages: Vec<Message>,
}

pub struct TutorService<C: ConversationRepository, P: ProfileRepository> {
    conversations: C,
    profiles: P,
    registry: Arc<AgentRegistry>,
    invoker: AgentInvoker,
    postprocessor: PostProcessor,
}

impl<C, P> TutorService<C, P>
where
    C: ConversationRepository + 'static,
    P: ProfileRepository + 'static,
{
    pub fn new(
        conversations: C,
        profiles: P,
        registry: Arc<AgentRegistry>,
        invoker: AgentInvoker,
        pipeline: PipelineConfig,
    ) -> Self {
        let postprocessor = PostProcessor::new(&invoker, Arc::clone(&registry), pipeline);
        Self {
            conversations,
            profiles,
            registry,
            invoker,
            postprocessor,
        }
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    pub fn profiles(&self) -> &P {
        &self.profiles
    }

    // --- Conversation lifecycle ---

    /// Create a conversation and store the routed agent's persona snapshot
    /// as its first turn.
    ///
    /// Tutor conversations need a sub-mode; an unrecognized one is kept and
    /// routes to the default agent. A sub-mode given for study tips is
    /// ignored.
    pub async fn create_conversation(
        &self,
        user_id: Uuid,
        mode: &str,
        sub_mode: Option<&str>,
    ) -> Result<Conversation, ChatError> {
        let mode: Mode = mode.parse().map_err(ChatError::InvalidMode)?;
        let sub_mode = sub_mode
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(SubMode::parse);

        if mode == Mode::Tutor && sub_mode.is_none() {
            return Err(ChatError::InvalidMode(
                "tutor mode requires a sub_mode".to_string(),
            ));
        }

        let conversation = Conversation::new(user_id, mode, sub_mode);
        let agent = router::select_for(&self.registry, &conversation);
        let profile = self.load_profile(&user_id).await;
        let persona = personalized_system_prompt(agent, profile.as_ref());
        let conversation = self
            .conversations
            .create_conversation(&conversation, &persona)
            .await?;

        info!(
            conversation_id = %conversation.id,
            mode = %conversation.mode,
            sub_mode = conversation.sub_mode.as_ref().map(SubMode::as_str),
            agent = %agent.name,
            "Conversation created"
        );
        Ok(conversation)
    }

    pub async fn list_conversations(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<ConversationSummary>, ChatError> {
        Ok(self.conversations.list_conversations(user_id).await?)
    }

    pub async fn get_conversation(
        &self,
        user_id: &Uuid,
        conversation_id: &Uuid,
    ) -> Result<ConversationDetail, ChatError> {
        let conversation = self.load_owned(user_id, conversation_id).await?;
        let turns = self.conversations.load_turns(conversation_id).await?;
        Ok(ConversationDetail {
            conversation,
            turns,
        })
    }

    pub async fn delete_conversation(
        &self,
        user_id: &Uuid,
        conversation_id: &Uuid,
    ) -> Result<(), ChatError> {
        self.load_owned(user_id, conversation_id).await?;
        match self.conversations.delete_conversation(conversation_id).await {
            Ok(()) => {
                info!(conversation_id = %conversation_id, "Conversation deleted");
                Ok(())
            }
            Err(RepositoryError::NotFound) => Err(ChatError::ConversationNotFound),
            Err(err) => Err(err.into()),
        }
    }

    // --- Chat ---

    /// Produce one complete reply.
    ///
    /// A failed primary draft yields the fixed apology with
    /// `ReplyStatus::Failed` and no assistant turn. Storage failures are
    /// returned as errors.
    #[tracing::instrument(
        name = "chat",
        skip_all,
        fields(conversation_id = %conversation_id)
    )]
    pub async fn chat(
        &self,
        user_id: &Uuid,
        conversation_id: &Uuid,
        message: &str,
    ) -> Result<ChatReply, ChatError> {
        let prepared = self.prepare(user_id, conversation_id, message).await?;
        let conversation = &prepared.conversation;
        let agent = router::select_for(&self.registry, conversation);

        let draft = match self.invoker.invoke(agent, prepared.messages).await {
            Ok(draft) => draft,
            Err(err) => {
                warn!(error = %err, agent = %agent.name, "Draft generation failed");
                return Ok(ChatReply::apology(&agent.name));
            }
        };

        let processed = self
            .postprocessor
            .postprocess(conversation.mode, conversation.sub_mode.as_ref(), &draft.text)
            .await;

        let mut usage = draft.usage;
        usage += processed.usage;
        self.conversations
            .append_turn(
                conversation_id,
                MessageRole::Assistant,
                &processed.text,
                Some(usage.total()),
            )
            .await?;
        self.touch(conversation_id).await;

        info!(
            agent = %agent.name,
            verified = processed.verified,
            tokens = usage.total(),
            "Reply persisted"
        );
        Ok(ChatReply {
            raw_text: processed.text,
            formatted_text: processed.formatted,
            status: ReplyStatus::Completed,
            agent: prepared.agent_name,
            verified: processed.verified,
        })
    }

    /// Start a streamed reply.
    ///
    /// Validation and the user turn happen before this returns, so request
    /// errors surface as `Err`. Once streaming, every failure is delivered
    /// in-band as a final `ChatFragment::Error`. Dropping the stream before
    /// it ends persists nothing for the assistant.
    pub async fn chat_stream(
        self: Arc<Self>,
        user_id: &Uuid,
        conversation_id: &Uuid,
        message: &str,
    ) -> Result<ChatStream, ChatError> {
        let prepared = self.prepare(user_id, conversation_id, message).await?;
        let agent = router::select_for(&self.registry, &prepared.conversation);
        let mut fragments = self.invoker.invoke_stream(agent, prepared.messages);

        let conversation_id = *conversation_id;
        let agent_name = prepared.agent_name;
        let service = self;

        Ok(Box::pin(async_stream::stream! {
            let mut full = String::new();

            while let Some(item) = fragments.next().await {
                match item {
                    Ok(text) => {
                        full.push_str(&text);
                        yield ChatFragment::Text { text };
                    }
                    Err(err) => {
                        warn!(
                            conversation_id = %conversation_id,
                            agent = %agent_name,
                            error = %err,
                            "Streamed generation failed"
                        );
                        yield ChatFragment::Error { message: APOLOGY_TEXT.to_string() };
                        return;
                    }
                }
            }

            match service
                .conversations
                .append_turn(&conversation_id, MessageRole::Assistant, &full, None)
                .await
            {
                Ok(_) => {
                    service.touch(&conversation_id).await;
                    info!(
                        conversation_id = %conversation_id,
                        agent = %agent_name,
                        chars = full.len(),
                        "Streamed reply persisted"
                    );
                    yield ChatFragment::Done;
                }
                Err(err) => {
                    warn!(conversation_id = %conversation_id, error = %err, "Failed to persist streamed reply");
                    yield ChatFragment::Error { message: APOLOGY_TEXT.to_string() };
                }
            }
        }))
    }

    /// Validate, persist the user turn, and assemble the message list.
    async fn prepare(
        &self,
        user_id: &Uuid,
        conversation_id: &Uuid,
        message: &str,
    ) -> Result<Prepared, ChatError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let conversation = self.load_owned(user_id, conversation_id).await?;
        if !conversation.active {
            return Err(ChatError::ConversationInactive);
        }

        let history = self.conversations.load_turns(conversation_id).await?;
        self.conversations
            .append_turn(conversation_id, MessageRole::User, message, None)
            .await?;

        let profile = self.load_profile(user_id).await;
        let agent = router::select_for(&self.registry, &conversation);
        let messages = assemble(agent, &history, profile.as_ref(), message);

        info!(
            mode = %conversation.mode,
            sub_mode = conversation.sub_mode.as_ref().map(SubMode::as_str),
            agent = %agent.name,
            history = history.len(),
            "Context assembled"
        );

        Ok(Prepared {
            agent_name: agent.name.clone(),
            conversation,
            messages,
        })
    }

    async fn load_owned(
        &self,
        user_id: &Uuid,
        conversation_id: &Uuid,
    ) -> Result<Conversation, ChatError> {
        match self.conversations.get_conversation(conversation_id).await? {
            Some(conversation) if &conversation.user_id == user_id => Ok(conversation),
            _ => Err(ChatError::ConversationNotFound),
        }
    }

    /// Profile lookup never blocks a reply; failures fall back to no profile.
    async fn load_profile(&self, user_id: &Uuid) -> Option<UserProfile> {
        match self.profiles.get_profile(user_id).await {
            Ok(profile) => profile,
            Err(err) => {
                warn!(user_id = %user_id, error = %err, "Profile lookup failed");
                None
            }
        }
    }

    async fn touch(&self, conversation_id: &Uuid) {
        if let Err(err) = self
            .conversations
            .touch_conversation(conversation_id, Utc::now())
            .await
        {
            warn!(conversation_id = %conversation_id, error = %err, "Failed to update conversation timestamp");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use scholar_types::config::GenerationConfig;
    use scholar_types::conversation::Subject;
    use scholar_types::llm::LlmError;

    use crate::llm::box_generator::BoxGenerator;
    use crate::test_support::{MemoryStore, MockGenerator, Script};

    type Service = TutorService<MemoryStore, MemoryStore>;

    fn service(mock: &MockGenerator, store: &MemoryStore) -> Arc<Service> {
        let invoker = AgentInvoker::new(
            Arc::new(BoxGenerator::new(mock.clone())),
            &GenerationConfig::default(),
        );
        Arc::new(TutorService::new(
            store.clone(),
            store.clone(),
            Arc::new(AgentRegistry::default()),
            invoker,
            PipelineConfig::default(),
        ))
    }

    fn roles(turns: &[Turn]) -> Vec<MessageRole> {
        turns.iter().map(|t| t.role).collect()
    }

    #[tokio::test]
    async fn test_create_conversation_stores_persona_snapshot() {
        let mock = MockGenerator::default();
        let store = MemoryStore::default();
        let svc = service(&mock, &store);
        let user = Uuid::now_v7();

        let conv = svc
            .create_conversation(user, "tutor", Some("physical_science"))
            .await
            .unwrap();
        assert_eq!(conv.title, "Physical Science Tutor");
        assert_eq!(conv.sub_mode, Some(SubMode::Known(Subject::PhysicalScience)));

        let turns = store.turns(&conv.id);
        assert_eq!(roles(&turns), vec![MessageRole::System]);
        assert!(turns[0].content.starts_with("Current user's name: unknown"));
    }

    #[tokio::test]
    async fn test_failed_persona_write_leaves_no_conversation() {
        let mock = MockGenerator::default();
        let store = MemoryStore::default();
        let svc = service(&mock, &store);
        let user = Uuid::now_v7();
        store.fail_turn_writes();

        let err = svc
            .create_conversation(user, "tutor", Some("math"))
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Repository(_)));
        assert!(svc.list_conversations(&user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_conversation_validation() {
        let mock = MockGenerator::default();
        let store = MemoryStore::default();
        let svc = service(&mock, &store);
        let user = Uuid::now_v7();

        let err = svc
            .create_conversation(user, "assignment_help", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::InvalidMode(_)));

        let err = svc.create_conversation(user, "tutor", None).await.unwrap_err();
        assert!(matches!(err, ChatError::InvalidMode(_)));

        let conv = svc
            .create_conversation(user, "study_tips", Some("math"))
            .await
            .unwrap();
        assert_eq!(conv.sub_mode, None);
        assert_eq!(conv.title, "Study Tips");
    }

    #[tokio::test]
    async fn test_study_tips_reply_is_returned_as_drafted() {
        let mock = MockGenerator::new([Script::Reply("Try **time blocking**.".to_string())]);
        let store = MemoryStore::default();
        let svc = service(&mock, &store);
        let user = Uuid::now_v7();
        let conv = svc.create_conversation(user, "study_tips", None).await.unwrap();

        let reply = svc
            .chat(&user, &conv.id, "How do I manage my time better?")
            .await
            .unwrap();

        assert_eq!(reply.status, ReplyStatus::Completed);
        assert_eq!(reply.agent, "study_coach");
        assert_eq!(reply.raw_text, "Try **time blocking**.");
        assert_eq!(reply.formatted_text, "Try **time blocking**.");
        assert!(!reply.verified);
        assert_eq!(mock.requests().len(), 1);

        let turns = store.turns(&conv.id);
        assert_eq!(
            roles(&turns),
            vec![MessageRole::System, MessageRole::User, MessageRole::Assistant]
        );
        assert_eq!(turns[1].content, "How do I manage my time better?");
        assert_eq!(turns[2].content, "Try **time blocking**.");
        assert!(turns[1].seq < turns[2].seq);
        assert_eq!(turns[1].tokens, None);
        assert_eq!(turns[2].tokens, Some(30));
    }

    #[tokio::test]
    async fn test_math_reply_is_verified_and_rendered() {
        let mock = MockGenerator::new([
            Script::Reply("**Sum:** $$1/2+1/4$$".to_string()),
            Script::Reply(r"**Sum:** $$\frac{1}{2}+\frac{1}{4}=\frac{3}{4}$$".to_string()),
        ]);
        let store = MemoryStore::default();
        let svc = service(&mock, &store);
        let user = Uuid::now_v7();
        let conv = svc.create_conversation(user, "tutor", Some("math")).await.unwrap();

        let reply = svc.chat(&user, &conv.id, "What is 1/2 + 1/4?").await.unwrap();

        assert!(reply.verified);
        assert_eq!(reply.agent, "math_tutor");
        assert!(reply.formatted_text.contains(
            r#"<span class="math-display">$$\frac{1}{2}+\frac{1}{4}=\frac{3}{4}$$</span>"#
        ));
        assert!(reply.formatted_text.starts_with("<strong>Sum:</strong>"));

        let requests = mock.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[1].messages[0].content.contains("$$1/2+1/4$$"));

        let turns = store.turns(&conv.id);
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[2].content, reply.raw_text);
        // draft plus verifier
        assert_eq!(turns[2].tokens, Some(60));
    }

    #[tokio::test]
    async fn test_failed_draft_returns_apology_without_assistant_turn() {
        let mock = MockGenerator::new([Script::Fail(LlmError::Provider {
            message: "boom".to_string(),
        })]);
        let store = MemoryStore::default();
        let svc = service(&mock, &store);
        let user = Uuid::now_v7();
        let conv = svc.create_conversation(user, "tutor", Some("english")).await.unwrap();

        let reply = svc.chat(&user, &conv.id, "Fix my essay").await.unwrap();

        assert_eq!(reply.status, ReplyStatus::Failed);
        assert_eq!(reply.raw_text, APOLOGY_TEXT);
        assert_eq!(reply.formatted_text, APOLOGY_TEXT);
        assert_eq!(
            roles(&store.turns(&conv.id)),
            vec![MessageRole::System, MessageRole::User]
        );
    }

    #[tokio::test]
    async fn test_unregistered_sub_mode_uses_default_agent() {
        let mock = MockGenerator::new([Script::Reply("Atoms bond.".to_string())]);
        let store = MemoryStore::default();
        let svc = service(&mock, &store);
        let user = Uuid::now_v7();
        let conv = svc
            .create_conversation(user, "tutor", Some("chemistry"))
            .await
            .unwrap();
        assert_eq!(conv.title, "Chemistry Tutor");

        let reply = svc.chat(&user, &conv.id, "What is a covalent bond?").await.unwrap();
        assert_eq!(reply.status, ReplyStatus::Completed);
        assert_eq!(reply.agent, "general_tutor");
        assert!(!reply.verified);
    }

    #[tokio::test]
    async fn test_second_call_sees_history_and_fresh_persona() {
        let mock = MockGenerator::new([
            Script::Reply("Hello Ada.".to_string()),
            Script::Reply("Paris.".to_string()),
        ]);
        let store = MemoryStore::default();
        let svc = service(&mock, &store);
        let user = Uuid::now_v7();
        let conv = svc.create_conversation(user, "tutor", Some("geography")).await.unwrap();

        store
            .upsert_profile(&UserProfile {
                user_id: user,
                first_name: Some("Ada".to_string()),
                last_name: None,
            })
            .await
            .unwrap();

        svc.chat(&user, &conv.id, "Hi").await.unwrap();
        svc.chat(&user, &conv.id, "Capital of France?").await.unwrap();

        let requests = mock.requests();
        let second = &requests[1];
        assert!(second
            .system
            .as_deref()
            .unwrap()
            .starts_with("Current user's name: Ada\n\n"));
        let contents: Vec<&str> = second.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["Hi", "Hello Ada.", "Capital of France?"]);
        assert!(second.messages.iter().all(|m| m.role != MessageRole::System));
    }

    #[tokio::test]
    async fn test_request_errors() {
        let mock = MockGenerator::default();
        let store = MemoryStore::default();
        let svc = service(&mock, &store);
        let owner = Uuid::now_v7();
        let conv = svc.create_conversation(owner, "study_tips", None).await.unwrap();

        let err = svc.chat(&owner, &conv.id, "   ").await.unwrap_err();
        assert!(matches!(err, ChatError::EmptyMessage));

        let stranger = Uuid::now_v7();
        let err = svc.chat(&stranger, &conv.id, "hi").await.unwrap_err();
        assert!(matches!(err, ChatError::ConversationNotFound));
        let err = svc.get_conversation(&stranger, &conv.id).await.unwrap_err();
        assert!(matches!(err, ChatError::ConversationNotFound));

        let mut inactive = Conversation::new(owner, Mode::StudyTips, None);
        inactive.active = false;
        store.create_conversation(&inactive, "persona").await.unwrap();
        let err = svc.chat(&owner, &inactive.id, "hi").await.unwrap_err();
        assert!(matches!(err, ChatError::ConversationInactive));

        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_list_get_delete() {
        let mock = MockGenerator::new([Script::Reply("ok".to_string())]);
        let store = MemoryStore::default();
        let svc = service(&mock, &store);
        let user = Uuid::now_v7();
        let first = svc.create_conversation(user, "study_tips", None).await.unwrap();
        let second = svc.create_conversation(user, "tutor", Some("history")).await.unwrap();
        svc.chat(&user, &first.id, "hello").await.unwrap();

        let list = svc.list_conversations(&user).await.unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].conversation.id, first.id);
        assert_eq!(list[0].message_count, 3);
        assert_eq!(list[1].message_count, 1);

        let detail = svc.get_conversation(&user, &second.id).await.unwrap();
        assert_eq!(detail.turns.len(), 1);

        svc.delete_conversation(&user, &second.id).await.unwrap();
        assert!(matches!(
            svc.get_conversation(&user, &second.id).await,
            Err(ChatError::ConversationNotFound)
        ));
        assert!(store.turns(&second.id).is_empty());
    }

    #[tokio::test]
    async fn test_stream_persists_concatenation_before_done() {
        let parts = vec!["Use ".to_string(), "spaced ".to_string(), "repetition.".to_string()];
        let mock = MockGenerator::new([Script::Fragments(parts.clone())]);
        let store = MemoryStore::default();
        let svc = service(&mock, &store);
        let user = Uuid::now_v7();
        let conv = svc.create_conversation(user, "study_tips", None).await.unwrap();

        let stream = Arc::clone(&svc)
            .chat_stream(&user, &conv.id, "How should I revise?")
            .await
            .unwrap();
        let fragments: Vec<ChatFragment> = stream.collect().await;

        let mut expected: Vec<ChatFragment> = parts
            .iter()
            .map(|text| ChatFragment::Text { text: text.clone() })
            .collect();
        expected.push(ChatFragment::Done);
        assert_eq!(fragments, expected);

        let turns = store.turns(&conv.id);
        assert_eq!(
            roles(&turns),
            vec![MessageRole::System, MessageRole::User, MessageRole::Assistant]
        );
        assert_eq!(turns[2].content, parts.concat());
        assert!(mock.requests()[0].stream);
    }

    #[tokio::test]
    async fn test_stream_is_not_post_processed() {
        let mock = MockGenerator::new([Script::Fragments(vec!["**x** = $1/2$".to_string()])]);
        let store = MemoryStore::default();
        let svc = service(&mock, &store);
        let user = Uuid::now_v7();
        let conv = svc.create_conversation(user, "tutor", Some("math")).await.unwrap();

        let fragments: Vec<ChatFragment> = Arc::clone(&svc)
            .chat_stream(&user, &conv.id, "half?")
            .await
            .unwrap()
            .collect()
            .await;
        assert_eq!(fragments.last(), Some(&ChatFragment::Done));
        assert_eq!(mock.requests().len(), 1);
        assert_eq!(store.turns(&conv.id)[2].content, "**x** = $1/2$");
    }

    #[tokio::test]
    async fn test_stream_error_is_in_band_and_persists_nothing() {
        let mock = MockGenerator::new([Script::FragmentsThenFail(
            vec!["Half of".to_string()],
            LlmError::Stream("reset".to_string()),
        )]);
        let store = MemoryStore::default();
        let svc = service(&mock, &store);
        let user = Uuid::now_v7();
        let conv = svc.create_conversation(user, "tutor", Some("math")).await.unwrap();

        let fragments: Vec<ChatFragment> = Arc::clone(&svc)
            .chat_stream(&user, &conv.id, "half?")
            .await
            .unwrap()
            .collect()
            .await;

        assert_eq!(
            fragments,
            vec![
                ChatFragment::Text { text: "Half of".to_string() },
                ChatFragment::Error { message: APOLOGY_TEXT.to_string() },
            ]
        );
        assert_eq!(
            roles(&store.turns(&conv.id)),
            vec![MessageRole::System, MessageRole::User]
        );
    }

    #[tokio::test]
    async fn test_dropped_stream_persists_nothing() {
        let mock = MockGenerator::new([Script::Fragments(vec![
            "one ".to_string(),
            "two ".to_string(),
            "three".to_string(),
        ])]);
        let store = MemoryStore::default();
        let svc = service(&mock, &store);
        let user = Uuid::now_v7();
        let conv = svc.create_conversation(user, "study_tips", None).await.unwrap();

        let mut stream = Arc::clone(&svc)
            .chat_stream(&user, &conv.id, "count")
            .await
            .unwrap();
        assert_eq!(
            stream.next().await,
            Some(ChatFragment::Text { text: "one ".to_string() })
        );
        drop(stream);

        assert_eq!(
            roles(&store.turns(&conv.id)),
            vec![MessageRole::System, MessageRole::User]
        );
    }

    #[tokio::test]
    async fn test_stream_request_errors_surface_before_streaming() {
        let mock = MockGenerator::default();
        let store = MemoryStore::default();
        let svc = service(&mock, &store);
        let user = Uuid::now_v7();

        let result = Arc::clone(&svc)
            .chat_stream(&user, &Uuid::now_v7(), "hi")
            .await;
        assert!(matches!(result, Err(ChatError::ConversationNotFound)));
    }
}

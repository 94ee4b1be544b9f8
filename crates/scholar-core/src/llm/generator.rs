//! Generator trait definition.
//!
//! The generation capability is opaque to the rest of the core: given a
//! request of role-tagged messages it returns either one completed text or
//! an ordered stream of events. Uses RPITIT for `complete` and
//! `Pin<Box<dyn Stream>>` for `stream` (streams need to be object-safe for
//! the `BoxGenerator` wrapper).

use std::pin::Pin;

use futures_util::Stream;

use scholar_types::llm::{CompletionRequest, CompletionResponse, LlmError, StreamEvent};

/// A boxed, `'static` stream of generation events.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>>;

/// Trait for generation backends (OpenAI-compatible endpoints, test doubles).
///
/// Implementations live in scholar-infra (e.g., `OpenAiCompatibleGenerator`).
pub trait Generator: Send + Sync {
    /// Human-readable provider name (e.g., "openai").
    fn name(&self) -> &str;

    /// Send a completion request and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;

    /// Send a streaming completion request. Returns a stream of events.
    fn stream(&self, request: CompletionRequest) -> EventStream;
}

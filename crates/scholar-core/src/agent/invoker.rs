//! Agent invoker for Scholar.
//!
//! `AgentInvoker` wraps one generation call with an agent's persona, fixed
//! low-temperature sampling, and an upper time bound. Provider failures,
//! timeouts, and empty output are all converted into [`PipelineError`]
//! here so callers never see a raw transport error.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use futures_util::{Stream, StreamExt};
use pin_project_lite::pin_project;
use tracing::{Instrument, debug, info_span};

use scholar_types::agent::Agent;
use scholar_types::config::GenerationConfig;
use scholar_types::error::PipelineError;
use scholar_types::llm::{CompletionRequest, Message, MessageRole, StreamEvent, Usage};

use crate::llm::box_generator::BoxGenerator;

/// A lazy, finite sequence of text fragments from one streamed call.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, PipelineError>> + Send + 'static>>;

/// Text from one completed call plus the provider-reported usage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub text: String,
    pub usage: Usage,
}

/// Executes generation calls on behalf of an agent.
#[derive(Debug, Clone)]
pub struct AgentInvoker {
    generator: Arc<BoxGenerator>,
    temperature: f64,
    max_tokens: u32,
    timeout: Duration,
}

impl AgentInvoker {
    pub fn new(generator: Arc<BoxGenerator>, settings: &GenerationConfig) -> Self {
        Self {
            generator,
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }

    /// Same generator and limits, different sampling temperature.
    pub fn with_temperature(&self, temperature: f64) -> Self {
        Self {
            temperature,
            ..self.clone()
        }
    }

    pub fn with_timeout(&self, timeout: Duration) -> Self {
        Self {
            timeout,
            ..self.clone()
        }
    }

    pub fn generator_name(&self) -> &str {
        self.generator.name()
    }

    /// Run one non-streaming call and return the trimmed text with its usage.
    pub async fn invoke(&self, agent: &Agent, messages: Vec<Message>) -> Result<Generated, PipelineError> {
        let request = self.build_request(agent, messages, false);

        let span = info_span!(
            "gen_ai.complete",
            gen_ai.system = self.generator.name(),
            gen_ai.agent.name = %agent.name,
            gen_ai.request.model = %request.model,
            gen_ai.request.max_tokens = request.max_tokens,
            gen_ai.request.temperature = ?request.temperature,
            gen_ai.request.stream = false,
        );

        let call = self.generator.complete(&request).instrument(span);
        let response = match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(PipelineError::Timeout {
                    seconds: self.timeout.as_secs(),
                });
            }
        };

        debug!(
            agent = %agent.name,
            stop_reason = %response.stop_reason,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "Generation completed"
        );

        let text = response.content.trim();
        if text.is_empty() {
            return Err(PipelineError::EmptyResponse);
        }
        Ok(Generated {
            text: text.to_string(),
            usage: response.usage,
        })
    }

    /// Run one streaming call and yield text fragments as they arrive.
    ///
    /// The whole stream shares one deadline. The first error is yielded as
    /// the final item; a stream that produces no text ends with
    /// `PipelineError::EmptyResponse`.
    pub fn invoke_stream(&self, agent: &Agent, messages: Vec<Message>) -> FragmentStream {
        let request = self.build_request(agent, messages, true);

        let span = info_span!(
            "gen_ai.stream",
            gen_ai.system = self.generator.name(),
            gen_ai.agent.name = %agent.name,
            gen_ai.request.model = %request.model,
            gen_ai.request.max_tokens = request.max_tokens,
            gen_ai.request.temperature = ?request.temperature,
            gen_ai.request.stream = true,
        );

        let mut events = self.generator.stream(request);
        let deadline = tokio::time::Instant::now() + self.timeout;
        let seconds = self.timeout.as_secs();

        let fragments = async_stream::stream! {
            let mut produced = false;
            loop {
                match tokio::time::timeout_at(deadline, events.next()).await {
                    Err(_) => {
                        yield Err(PipelineError::Timeout { seconds });
                        return;
                    }
                    Ok(None) | Ok(Some(Ok(StreamEvent::Done))) => break,
                    Ok(Some(Ok(StreamEvent::TextDelta { text }))) => {
                        if !text.is_empty() {
                            produced = true;
                            yield Ok(text);
                        }
                    }
                    Ok(Some(Ok(_))) => {}
                    Ok(Some(Err(err))) => {
                        yield Err(PipelineError::from(err));
                        return;
                    }
                }
            }
            if !produced {
                yield Err(PipelineError::EmptyResponse);
            }
        };

        Box::pin(InSpan {
            inner: fragments,
            span,
        })
    }

    /// Build a request carrying exactly one system prompt.
    ///
    /// A leading system message (the personalized prompt) becomes the
    /// request's system prompt; otherwise the agent's own instructions are
    /// used.
    fn build_request(&self, agent: &Agent, mut messages: Vec<Message>, stream: bool) -> CompletionRequest {
        let system = match messages.first() {
            Some(first) if first.role == MessageRole::System => messages.remove(0).content,
            _ => agent.instructions.clone(),
        };

        CompletionRequest {
            model: agent.model.clone(),
            messages,
            system: Some(system),
            max_tokens: self.max_tokens,
            temperature: Some(self.temperature),
            stream,
        }
    }
}

pin_project! {
    /// Keeps a tracing span entered while the wrapped stream is polled.
    struct InSpan<S> {
        #[pin]
        inner: S,
        span: tracing::Span,
    }
}

impl<S: Stream> Stream for InSpan<S> {
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();
        let _enter = this.span.enter();
        this.inner.poll_next(cx)
    }
}

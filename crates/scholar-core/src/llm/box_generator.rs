//! BoxGenerator -- object-safe dynamic dispatch wrapper for Generator.
//!
//! 1. Define an object-safe `GeneratorDyn` trait with boxed futures
//! 2. Blanket-impl `GeneratorDyn` for all `T: Generator`
//! 3. `BoxGenerator` wraps `Box<dyn GeneratorDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use scholar_types::llm::{CompletionRequest, CompletionResponse, LlmError};

use super::generator::{EventStream, Generator};

/// Object-safe version of [`Generator`] with boxed futures.
pub trait GeneratorDyn: Send + Sync {
    fn name(&self) -> &str;

    fn complete_boxed<'a>(
        &'a self,
        request: &'a CompletionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<CompletionResponse, LlmError>> + Send + 'a>>;

    fn stream_boxed(&self, request: CompletionRequest) -> EventStream;
}

impl<T: Generator> GeneratorDyn for T {
    fn name(&self) -> &str {
        Generator::name(self)
    }

    fn complete_boxed<'a>(
        &'a self,
        request: &'a CompletionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<CompletionResponse, LlmError>> + Send + 'a>> {
        Box::pin(self.complete(request))
    }

    fn stream_boxed(&self, request: CompletionRequest) -> EventStream {
        self.stream(request)
    }
}

/// Type-erased generator for runtime provider selection.
///
/// Since `Generator` uses RPITIT, it cannot be used as a trait object
/// directly. `BoxGenerator` provides equivalent methods that delegate to
/// the inner `GeneratorDyn` trait object.
pub struct BoxGenerator {
    inner: Box<dyn GeneratorDyn + Send + Sync>,
}

impl BoxGenerator {
    /// Wrap a concrete `Generator` in a type-erased box.
    pub fn new<T: Generator + 'static>(generator: T) -> Self {
        Self {
            inner: Box::new(generator),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, LlmError> {
        self.inner.complete_boxed(request).await
    }

    pub fn stream(&self, request: CompletionRequest) -> EventStream {
        self.inner.stream_boxed(request)
    }
}

impl std::fmt::Debug for BoxGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxGenerator")
            .field("name", &self.name())
            .finish()
    }
}

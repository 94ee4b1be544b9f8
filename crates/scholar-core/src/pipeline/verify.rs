//! Notation verification pass.

use scholar_types::agent::Agent;
use scholar_types::error::PipelineError;
use scholar_types::llm::Message;

use crate::agent::invoker::{AgentInvoker, Generated};
use crate::agent::personas::VERIFY_DIRECTIVE;

/// Ask the verifier to return the draft unchanged or corrected.
///
/// This is a second, dependent generation call. Failures are reported as
/// `PipelineError::Verification`; the caller decides whether to keep the
/// draft.
pub async fn verify(
    invoker: &AgentInvoker,
    verifier: &Agent,
    draft: &str,
) -> Result<Generated, PipelineError> {
    let request = vec![Message::user(format!("{VERIFY_DIRECTIVE}\n\n{draft}"))];

    invoker
        .invoke(verifier, request)
        .await
        .map_err(|err| match err {
            PipelineError::Generation(inner) => PipelineError::Verification(inner),
            other => other,
        })
}

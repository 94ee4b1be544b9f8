//! Verification and formatting applied to a finished draft.
//!
//! Both passes are scoped by the conversation's routing keys. Verification
//! runs only for tutor conversations in a verified subject; formatting runs
//! for the same scope unless `format_all_modes` widens it. Every failure in
//! here degrades to the best text already in hand.

use std::sync::Arc;

use scholar_types::config::{FormattingStrategy, PipelineConfig};
use scholar_types::conversation::{Mode, SubMode};
use scholar_types::llm::Usage;
use tracing::{info, warn};

use crate::agent::invoker::AgentInvoker;
use crate::agent::registry::AgentRegistry;

use super::restructure::{FORMATTER_TEMPERATURE, restructure};
use super::verify::verify;
use super::{APOLOGY_TEXT, markup};

/// Outcome of post-processing one draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Processed {
    /// Final markdown text; this is what gets persisted.
    pub text: String,
    /// Display markup for `text`.
    pub formatted: String,
    pub verified: bool,
    /// Usage of the verifier and formatter calls made for this draft.
    pub usage: Usage,
}

pub struct PostProcessor {
    verifier_invoker: AgentInvoker,
    formatter_invoker: AgentInvoker,
    registry: Arc<AgentRegistry>,
    settings: PipelineConfig,
}

impl PostProcessor {
    pub fn new(invoker: &AgentInvoker, registry: Arc<AgentRegistry>, settings: PipelineConfig) -> Self {
        Self {
            verifier_invoker: invoker.clone(),
            formatter_invoker: invoker.with_temperature(FORMATTER_TEMPERATURE),
            registry,
            settings,
        }
    }

    /// True iff the draft must go through the verifier.
    pub fn requires_verification(&self, mode: Mode, sub_mode: Option<&SubMode>) -> bool {
        mode == Mode::Tutor
            && sub_mode
                .and_then(SubMode::subject)
                .is_some_and(|subject| self.settings.verified_subjects.contains(&subject))
    }

    pub fn applies_formatting(&self, mode: Mode, sub_mode: Option<&SubMode>) -> bool {
        self.settings.format_all_modes || self.requires_verification(mode, sub_mode)
    }

    /// Run the conditional verify and format passes over `draft`.
    ///
    /// Never fails. The returned text is never empty.
    pub async fn postprocess(&self, mode: Mode, sub_mode: Option<&SubMode>, draft: &str) -> Processed {
        let mut text = draft.trim().to_string();
        let mut verified = false;
        let mut usage = Usage::default();

        if self.requires_verification(mode, sub_mode) {
            match verify(&self.verifier_invoker, self.registry.verifier(), &text).await {
                Ok(checked) => {
                    let changed = checked.text != text;
                    info!(changed, "Verification applied");
                    text = checked.text;
                    usage += checked.usage;
                    verified = true;
                }
                Err(err) => {
                    warn!(error = %err, "Verification failed, keeping unverified draft");
                }
            }
        }

        if text.is_empty() {
            text = APOLOGY_TEXT.to_string();
        }

        let formatted = if self.applies_formatting(mode, sub_mode) {
            if self.settings.formatting == FormattingStrategy::Agent {
                let restructured =
                    restructure(&self.formatter_invoker, self.registry.formatter(), &text).await;
                text = restructured.text;
                usage += restructured.usage;
            }
            markup::render(&text)
        } else {
            text.clone()
        };

        Processed {
            text,
            formatted,
            verified,
            usage,
        }
    }
}

//! Model-based restructuring used by the `agent` formatting strategy.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use scholar_types::agent::Agent;
use scholar_types::llm::{Message, Usage};

use crate::agent::invoker::{AgentInvoker, Generated};

/// Sampling temperature for the formatter agent.
pub const FORMATTER_TEMPERATURE: f64 = 0.1;

/// Header, list and numbered-item markers only count at the very start of
/// the text. `_..._` reads as italic, so any two underscores on one line
/// (`snake_case_name`) mark the text as structured.
static STRUCTURE_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^#+\s",
        r"^\*\s",
        r"^\d+\.\s",
        r"\n\n",
        r"\*\*.*\*\*",
        r"_.*_",
    ]
    .into_iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

/// Heuristic: does the text already carry markdown structure?
pub fn is_well_formatted(text: &str) -> bool {
    STRUCTURE_RES.iter().any(|re| re.is_match(text))
}

/// Let the formatter agent restructure `text`, returning the input with
/// zero usage when it is already structured or when the call fails.
pub async fn restructure(invoker: &AgentInvoker, formatter: &Agent, text: &str) -> Generated {
    let unchanged = || Generated {
        text: text.to_string(),
        usage: Usage::default(),
    };

    if is_well_formatted(text) {
        debug!("Text already structured, skipping formatter agent");
        return unchanged();
    }

    match invoker.invoke(formatter, vec![Message::user(text)]).await {
        Ok(formatted) => formatted,
        Err(err) => {
            warn!(error = %err, "Formatter agent failed, keeping unformatted text");
            unchanged()
        }
    }
}

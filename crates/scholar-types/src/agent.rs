//! Agent identity types.

use serde::{Deserialize, Serialize};

/// A named persona plus the model that speaks for it.
///
/// Agents are built once at startup by the registry and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub name: String,
    pub instructions: String,
    pub model: String,
}

impl Agent {
    pub fn new(
        name: impl Into<String>,
        instructions: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
            model: model.into(),
        }
    }
}

//! Conversation, routing key, and turn types.
//!
//! A conversation is created once with a fixed `Mode` (and, for tutoring,
//! a sub-mode naming the subject). Turns accrue append-only underneath it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

pub use crate::llm::MessageRole;

/// Conversation-level behavior selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Tutor,
    StudyTips,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Tutor => "tutor",
            Mode::StudyTips => "study_tips",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tutor" => Ok(Mode::Tutor),
            "study_tips" => Ok(Mode::StudyTips),
            other => Err(format!(
                "invalid mode '{other}': choose either 'tutor' or 'study_tips'"
            )),
        }
    }
}

/// Subjects the tutor can be specialized in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    Math,
    English,
    General,
    History,
    Geography,
    PhysicalScience,
}

impl Subject {
    pub const ALL: [Subject; 6] = [
        Subject::Math,
        Subject::English,
        Subject::General,
        Subject::History,
        Subject::Geography,
        Subject::PhysicalScience,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Subject::Math => "math",
            Subject::English => "english",
            Subject::General => "general",
            Subject::History => "history",
            Subject::Geography => "geography",
            Subject::PhysicalScience => "physical_science",
        }
    }

    /// Human-readable name, e.g. "Physical Science".
    pub fn display_name(&self) -> &'static str {
        match self {
            Subject::Math => "Math",
            Subject::English => "English",
            Subject::General => "General",
            Subject::History => "History",
            Subject::Geography => "Geography",
            Subject::PhysicalScience => "Physical Science",
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Subject {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        Subject::ALL
            .into_iter()
            .find(|subject| subject.as_str() == key)
            .ok_or_else(|| format!("unknown subject: '{key}'"))
    }
}

/// A stored sub-mode value.
///
/// Sub-modes arrive as free text from clients and from older rows, so an
/// unrecognized value is kept verbatim instead of being rejected. Routing
/// treats `Unrecognized` the same as an absent sub-mode.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SubMode {
    Known(Subject),
    Unrecognized(String),
}

impl SubMode {
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<Subject>() {
            Ok(subject) => SubMode::Known(subject),
            Err(_) => SubMode::Unrecognized(raw.trim().to_string()),
        }
    }

    pub fn subject(&self) -> Option<Subject> {
        match self {
            SubMode::Known(subject) => Some(*subject),
            SubMode::Unrecognized(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SubMode::Known(subject) => subject.as_str(),
            SubMode::Unrecognized(raw) => raw,
        }
    }
}

impl From<String> for SubMode {
    fn from(raw: String) -> Self {
        SubMode::parse(&raw)
    }
}

impl From<SubMode> for String {
    fn from(sub_mode: SubMode) -> Self {
        sub_mode.as_str().to_string()
    }
}

impl From<Subject> for SubMode {
    fn from(subject: Subject) -> Self {
        SubMode::Known(subject)
    }
}

impl fmt::Display for SubMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tutoring conversation owned by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub mode: Mode,
    pub sub_mode: Option<SubMode>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Build a fresh conversation. A sub-mode is only kept for `Mode::Tutor`.
    pub fn new(user_id: Uuid, mode: Mode, sub_mode: Option<SubMode>) -> Self {
        let sub_mode = match mode {
            Mode::Tutor => sub_mode,
            Mode::StudyTips => None,
        };
        let now = Utc::now();

        Self {
            id: Uuid::now_v7(),
            user_id,
            title: default_title(mode, sub_mode.as_ref()),
            mode,
            sub_mode,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Title shown in conversation lists, derived from the routing keys.
pub fn default_title(mode: Mode, sub_mode: Option<&SubMode>) -> String {
    match (mode, sub_mode) {
        (Mode::StudyTips, _) => "Study Tips".to_string(),
        (Mode::Tutor, Some(SubMode::Known(subject))) => {
            format!("{} Tutor", subject.display_name())
        }
        (Mode::Tutor, Some(SubMode::Unrecognized(raw))) if !raw.is_empty() => {
            format!("{} Tutor", title_case(raw))
        }
        (Mode::Tutor, _) => "Tutor".to_string(),
    }
}

fn title_case(raw: &str) -> String {
    raw.split(['_', ' ', '-'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// A conversation plus list-view statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSummary {
    #[serde(flatten)]
    pub conversation: Conversation,
    pub message_count: u32,
    pub last_activity: DateTime<Utc>,
}

/// One role-tagged message persisted under a conversation.
///
/// `seq` is the store-assigned ordering key; turns are always read back in
/// ascending `seq` order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub seq: i64,
    pub role: MessageRole,
    pub content: String,
    /// Tokens spent generating this turn; `None` for turns that were not
    /// generated or whose usage was not reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<u32>,
    pub created_at: DateTime<Utc>,
}

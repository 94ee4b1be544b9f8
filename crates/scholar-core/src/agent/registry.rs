//! Agent registry.
//!
//! An immutable catalog built once at startup. Every routable key resolves
//! to an agent; the verifier and formatter are held outside the routable
//! set and are only reachable through their dedicated accessors.

use scholar_types::agent::Agent;
use scholar_types::config::ModelsConfig;
use scholar_types::conversation::{SubMode, Subject};

use super::personas;

/// The subject used when a tutor conversation names no known subject.
pub const DEFAULT_SUBJECT: Subject = Subject::General;

#[derive(Debug, Clone)]
pub struct AgentRegistry {
    math: Agent,
    english: Agent,
    general: Agent,
    history: Agent,
    geography: Agent,
    physical_science: Agent,
    study_coach: Agent,
    verifier: Agent,
    formatter: Agent,
}

impl AgentRegistry {
    /// Build every agent from the per-role model configuration.
    pub fn from_models(models: &ModelsConfig) -> Self {
        let tutor = |subject: Subject| {
            Agent::new(
                format!("{subject}_tutor"),
                personas::subject_instructions(subject),
                models.tutor.clone(),
            )
        };

        Self {
            math: tutor(Subject::Math),
            english: tutor(Subject::English),
            general: tutor(Subject::General),
            history: tutor(Subject::History),
            geography: tutor(Subject::Geography),
            physical_science: tutor(Subject::PhysicalScience),
            study_coach: Agent::new(
                "study_coach",
                personas::study_coach_instructions(),
                models.study_coach.clone(),
            ),
            verifier: Agent::new(
                "verifier",
                personas::VERIFIER_INSTRUCTIONS,
                models.verifier.clone(),
            ),
            formatter: Agent::new(
                "formatter",
                personas::FORMATTER_INSTRUCTIONS,
                models.formatter.clone(),
            ),
        }
    }

    /// The tutor registered for a subject. Total over `Subject`.
    pub fn subject(&self, subject: Subject) -> &Agent {
        match subject {
            Subject::Math => &self.math,
            Subject::English => &self.english,
            Subject::General => &self.general,
            Subject::History => &self.history,
            Subject::Geography => &self.geography,
            Subject::PhysicalScience => &self.physical_science,
        }
    }

    /// Look up a tutor by sub-mode; unknown or absent keys get the default agent.
    pub fn lookup(&self, sub_mode: Option<&SubMode>) -> &Agent {
        match sub_mode.and_then(SubMode::subject) {
            Some(subject) => self.subject(subject),
            None => self.default_agent(),
        }
    }

    pub fn default_agent(&self) -> &Agent {
        self.subject(DEFAULT_SUBJECT)
    }

    pub fn study_coach(&self) -> &Agent {
        &self.study_coach
    }

    pub fn verifier(&self) -> &Agent {
        &self.verifier
    }

    pub fn formatter(&self) -> &Agent {
        &self.formatter
    }

    /// User-selectable agents, subject tutors first.
    pub fn routable(&self) -> impl Iterator<Item = &Agent> {
        Subject::ALL
            .into_iter()
            .map(|subject| self.subject(subject))
            .chain(std::iter::once(&self.study_coach))
    }

    /// Pipeline-only agents.
    pub fn internal(&self) -> impl Iterator<Item = &Agent> {
        [&self.verifier, &self.formatter].into_iter()
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::from_models(&ModelsConfig::default())
    }
}

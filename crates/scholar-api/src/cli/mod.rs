//! CLI command definitions for the `scholar` binary.
//!
//! Uses clap derive macros for argument parsing. Commands that act on behalf
//! of a student take `--user`, which can also come from `SCHOLAR_USER_ID`.

pub mod agents;
pub mod ask;
pub mod conversation;
pub mod user;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use uuid::Uuid;

/// Multi-agent tutoring service.
#[derive(Parser)]
#[command(name = "scholar", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Export spans to stdout through OpenTelemetry.
    #[arg(long, global = true)]
    pub otel: bool,

    /// Data directory holding `config.toml` and `scholar.db`.
    #[arg(long, env = "SCHOLAR_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Port to listen on (overrides config).
        #[arg(short, long, env = "SCHOLAR_PORT")]
        port: Option<u16>,

        /// Host to bind to (overrides config).
        #[arg(long, env = "SCHOLAR_HOST")]
        host: Option<String>,
    },

    /// Manage user profiles used for personalization.
    User {
        #[command(subcommand)]
        action: UserCommand,
    },

    /// Manage conversations.
    #[command(alias = "conv")]
    Conversation {
        #[command(subcommand)]
        action: ConversationCommand,
    },

    /// Send one message to a conversation and print the reply.
    Ask {
        #[arg(long, env = "SCHOLAR_USER_ID")]
        user: Uuid,

        /// Conversation ID.
        conversation: Uuid,

        /// The message to send.
        message: String,

        /// Print fragments as they arrive (no verification or formatting).
        #[arg(long)]
        stream: bool,
    },

    /// List the registered agents and their models.
    Agents,
}

#[derive(Subcommand)]
pub enum UserCommand {
    /// Create or update a profile.
    Add {
        /// Existing user ID to update; a new one is generated when omitted.
        #[arg(long)]
        id: Option<Uuid>,

        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        last_name: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ConversationCommand {
    /// Start a new conversation.
    Create {
        #[arg(long, env = "SCHOLAR_USER_ID")]
        user: Uuid,

        /// `tutor` or `study_tips`.
        #[arg(long)]
        mode: String,

        /// Subject for tutor mode (e.g., math, history).
        #[arg(long)]
        sub_mode: Option<String>,
    },

    /// List conversations, most recent first.
    #[command(alias = "ls")]
    List {
        #[arg(long, env = "SCHOLAR_USER_ID")]
        user: Uuid,
    },

    /// Show a conversation and its turns.
    Show {
        #[arg(long, env = "SCHOLAR_USER_ID")]
        user: Uuid,

        id: Uuid,
    },

    /// Delete a conversation and its turns.
    #[command(alias = "rm")]
    Delete {
        #[arg(long, env = "SCHOLAR_USER_ID")]
        user: Uuid,

        id: Uuid,
    },
}

impl Commands {
    /// Whether the command calls the generation provider.
    pub fn needs_generation(&self) -> bool {
        matches!(self, Commands::Serve { .. } | Commands::Ask { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ask_with_stream() {
        let user = Uuid::now_v7();
        let conversation = Uuid::now_v7();
        let cli = Cli::try_parse_from([
            "scholar",
            "ask",
            "--user",
            &user.to_string(),
            &conversation.to_string(),
            "What is a prime?",
            "--stream",
        ])
        .unwrap();

        match cli.command {
            Commands::Ask {
                user: u,
                conversation: c,
                message,
                stream,
            } => {
                assert_eq!(u, user);
                assert_eq!(c, conversation);
                assert_eq!(message, "What is a prime?");
                assert!(stream);
            }
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn test_parse_conversation_create() {
        let user = Uuid::now_v7();
        let cli = Cli::try_parse_from([
            "scholar",
            "--json",
            "conversation",
            "create",
            "--user",
            &user.to_string(),
            "--mode",
            "tutor",
            "--sub-mode",
            "math",
        ])
        .unwrap();

        assert!(cli.json);
        assert!(!cli.command.needs_generation());
        match cli.command {
            Commands::Conversation {
                action: ConversationCommand::Create { mode, sub_mode, .. },
            } => {
                assert_eq!(mode, "tutor");
                assert_eq!(sub_mode.as_deref(), Some("math"));
            }
            _ => panic!("expected conversation create"),
        }
    }

    #[test]
    fn test_serve_needs_generation() {
        let cli = Cli::try_parse_from(["scholar", "serve", "--port", "8080"]).unwrap();
        assert!(cli.command.needs_generation());
    }

    #[test]
    fn test_invalid_user_id_is_rejected() {
        assert!(Cli::try_parse_from(["scholar", "conversation", "list", "--user", "bob"]).is_err());
    }
}

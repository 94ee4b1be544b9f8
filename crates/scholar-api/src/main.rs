//! Scholar CLI and REST API entry point.
//!
//! Binary name: `scholar`
//!
//! Parses CLI arguments, initializes tracing, the database and the tutor
//! service, then dispatches to a command handler or starts the REST server.

mod cli;
mod http;
mod state;

use clap::Parser;

use cli::{Cli, Commands, ConversationCommand, UserCommand};
use scholar_infra::config::resolve_data_dir;
use scholar_observe::tracing_setup::{
    TracingOptions, init_tracing, shutdown_tracing, verbosity_directive,
};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(&TracingOptions {
        default_directive: verbosity_directive(cli.verbose, cli.quiet).to_string(),
        json: cli.log_json,
        otel: cli.otel,
    })
    .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let data_dir = cli.data_dir.clone().unwrap_or_else(resolve_data_dir);
    let state = AppState::init(data_dir, cli.command.needs_generation()).await?;
    let json = cli.json;

    match cli.command {
        Commands::Serve { port, host } => serve(state, host, port, cli.quiet).await?,

        Commands::User { action } => match action {
            UserCommand::Add {
                id,
                first_name,
                last_name,
            } => cli::user::add_user(&state, id, first_name, last_name, json).await?,
        },

        Commands::Conversation { action } => match action {
            ConversationCommand::Create {
                user,
                mode,
                sub_mode,
            } => {
                cli::conversation::create_conversation(
                    &state,
                    user,
                    &mode,
                    sub_mode.as_deref(),
                    json,
                )
                .await?;
            }
            ConversationCommand::List { user } => {
                cli::conversation::list_conversations(&state, &user, json).await?;
            }
            ConversationCommand::Show { user, id } => {
                cli::conversation::show_conversation(&state, &user, &id, json).await?;
            }
            ConversationCommand::Delete { user, id } => {
                cli::conversation::delete_conversation(&state, &user, &id, json).await?;
            }
        },

        Commands::Ask {
            user,
            conversation,
            message,
            stream,
        } => {
            if stream {
                cli::ask::ask_stream(&state, &user, &conversation, &message, json).await?;
            } else {
                cli::ask::ask(&state, &user, &conversation, &message, json).await?;
            }
        }

        Commands::Agents => cli::agents::list_agents(&state, json)?,
    }

    Ok(())
}

/// Bind the listener and serve the REST API until a shutdown signal.
///
/// CLI/env host and port take precedence over the `[server]` config section.
async fn serve(
    state: AppState,
    host: Option<String>,
    port: Option<u16>,
    quiet: bool,
) -> anyhow::Result<()> {
    let host = host.unwrap_or_else(|| state.config.server.host.clone());
    let port = port.unwrap_or(state.config.server.port);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(%addr, data_dir = %state.data_dir.display(), "Scholar API listening");
    if !quiet {
        println!();
        println!(
            "  {} Scholar API listening on {}",
            console::style("⚡").bold(),
            console::style(format!("http://{addr}")).cyan()
        );
        println!(
            "  {} {}",
            console::style("Data:").dim(),
            console::style(state.data_dir.display()).dim()
        );
        println!("  {}", console::style("Press Ctrl+C to stop").dim());
    }

    let router = http::router::build_router(state);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if !quiet {
        println!("\n  Server stopped.");
    }
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

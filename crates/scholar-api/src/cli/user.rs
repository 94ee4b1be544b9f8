//! User profile CLI commands.

use anyhow::Result;
use console::style;
use uuid::Uuid;

use scholar_core::conversation::repository::ProfileRepository;
use scholar_types::user::UserProfile;

use crate::state::AppState;

/// Create or update a profile. Prints the user id to pass as `--user`.
pub async fn add_user(
    state: &AppState,
    id: Option<Uuid>,
    first_name: Option<String>,
    last_name: Option<String>,
    json: bool,
) -> Result<()> {
    let profile = UserProfile {
        user_id: id.unwrap_or_else(Uuid::now_v7),
        first_name: first_name.filter(|name| !name.trim().is_empty()),
        last_name: last_name.filter(|name| !name.trim().is_empty()),
    };

    state.tutor.profiles().upsert_profile(&profile).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Saved profile for {}",
        style("✓").green().bold(),
        style(profile.display_first_name()).cyan().bold()
    );
    println!(
        "  {}  {}",
        style("ID:").bold(),
        style(profile.user_id.to_string()).dim()
    );
    println!();
    println!(
        "  Use it with: {}",
        style(format!("export SCHOLAR_USER_ID={}", profile.user_id)).yellow()
    );
    println!();

    Ok(())
}

use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::models::Role;
use crate::database::{Store, UserRepository};

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Grant the admin role to an existing user")]
    Promote {
        #[arg(help = "Email address of the user")]
        email: String,
    },

    #[command(about = "Revoke the admin role from a user")]
    Demote {
        #[arg(help = "Email address of the user")]
        email: String,
    },
}

pub async fn handle(
    cmd: UserCommands,
    config: &AppConfig,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let db = super::connect(config).await?;
    let store = Store::postgres(db.clone());

    let result = match cmd {
        UserCommands::Promote { email } => set_role(store.users.as_ref(), &email, Role::Admin).await,
        UserCommands::Demote { email } => set_role(store.users.as_ref(), &email, Role::User).await,
    };
    db.close().await;

    let (email, role) = result?;
    output_success(
        &output_format,
        &format!("User '{}' now has role '{}'", email, role),
        Some(json!({ "email": email, "role": role })),
    )
}

/// Looks the user up by email and applies `role`
pub async fn set_role(
    users: &dyn UserRepository,
    email: &str,
    role: Role,
) -> anyhow::Result<(String, Role)> {
    let email = email.trim().to_lowercase();
    let user = users
        .find_by_email(&email)
        .await?
        .ok_or_else(|| anyhow::anyhow!("User '{}' not found", email))?;

    let user = users
        .set_role(user.id, role)
        .await?
        .ok_or_else(|| anyhow::anyhow!("User '{}' was deleted concurrently", email))?;

    tracing::info!("Set role of user {} to {}", user.id, role);
    Ok((user.email, user.role))
}

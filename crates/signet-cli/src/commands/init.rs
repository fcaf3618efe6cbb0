//! Interactive first-time setup.

use std::path::PathBuf;

use signet_api_client::ApiClient;
use signet_core::{config_path, AppConfig};

use super::prompt_line;

pub async fn run() -> anyhow::Result<()> {
    let existing = AppConfig::load().unwrap_or_default();

    let admin_email = prompt_line("Workspace admin email", existing.admin_email.as_deref())?;
    let customer_id = prompt_line("Directory customer id", Some(&existing.customer_id))?;
    let token_file = prompt_line(
        "Token file path (empty to use SIGNET_ACCESS_TOKEN)",
        existing
            .token_file
            .as_deref()
            .and_then(|p| p.to_str()),
    )?;

    let config = AppConfig {
        admin_email: (!admin_email.is_empty()).then_some(admin_email),
        customer_id: if customer_id.is_empty() {
            AppConfig::default().customer_id
        } else {
            customer_id
        },
        token_file: (!token_file.is_empty()).then(|| PathBuf::from(token_file)),
    };

    // Verify the token actually opens the directory before persisting, but
    // save anyway on failure; the token may simply not be issued yet.
    match ApiClient::from_config(&config) {
        Ok(client) => match client.probe_directory(&config.customer_id).await {
            Ok(()) => println!("Directory access verified."),
            Err(err) => println!("Warning: directory probe failed: {err}"),
        },
        Err(err) => println!("Warning: {err:#}"),
    }

    config.save()?;
    println!("Saved {}", config_path().display());
    Ok(())
}

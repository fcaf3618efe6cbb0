//! Print the stored configuration and whether a deployment could run.

use signet_core::{config_path, AppConfig};

pub fn run() -> anyhow::Result<()> {
    let config = AppConfig::load()?;

    println!("Config file: {}", config_path().display());
    println!(
        "Admin email: {}",
        config.admin_email.as_deref().unwrap_or("(not set)")
    );
    println!("Customer id: {}", config.customer_id);
    println!(
        "Token file:  {}",
        config
            .token_file
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(not set)".to_string())
    );
    println!(
        "Status:      {}",
        if config.is_configured() {
            "ready"
        } else {
            "incomplete (run `signet init`)"
        }
    );
    Ok(())
}

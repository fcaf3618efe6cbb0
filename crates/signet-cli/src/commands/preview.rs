//! Show the signature currently stored for one user.

use anyhow::Context;

use signet_api_client::ApiClient;
use signet_cli::format_size;
use signet_core::AppConfig;
use signet_services::fetch_current;

pub async fn run(email: &str) -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    let client = ApiClient::from_config(&config)?;

    let signature = fetch_current(&client, email)
        .await
        .with_context(|| format!("Failed to fetch signature for {email}"))?;

    match signature {
        Some(body) => {
            println!("Signature for {email} ({}):", format_size(body.len()));
            println!("{body}");
        }
        None => println!("No signature set for {email}"),
    }
    Ok(())
}

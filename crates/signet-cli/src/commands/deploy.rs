//! Deploy (and validate / dry-run) a signatures folder.

use std::path::Path;

use anyhow::{bail, Context};
use tokio::sync::mpsc;

use signet_api_client::{ApiClient, DirectoryProvider};
use signet_cli::render;
use signet_core::{match_candidates, scan_signature_folder, AppConfig, IdentityProvider};
use signet_services::{deploy_batch, DeployPolicy, ProgressEvent};

use super::confirm;

/// How many failed items get their error printed in full.
const MAX_PRINTED_ERRORS: usize = 5;

pub async fn run(folder: &Path, dry_run: bool, assume_yes: bool) -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    if config.admin_email.is_none() {
        bail!("Not configured. Run `signet init` first");
    }

    let client = ApiClient::from_config(&config)?;
    let provider = DirectoryProvider::new(client.clone(), config.customer_id.clone());

    let recipients = provider
        .list_recipients()
        .await
        .context("Failed to list directory users")?;
    println!("Found {} directory users", recipients.len());

    let documents = scan_signature_folder(folder)?;
    let report = match_candidates(documents, &recipients)?;

    println!();
    print!("{}", render::match_table(&report));
    println!();
    print!("{}", render::match_leftovers(&report));
    println!("{}", render::match_summary(&report));

    if report.matched.is_empty() {
        println!("Nothing to deploy: no file matched a directory user.");
        println!("Filenames must normalize to an email prefix or a user's name.");
        return Ok(());
    }

    for record in &report.matched {
        if record.validation.has_external_images {
            println!(
                "Warning: {} references external images ({}); they may be blocked by mail clients",
                record.document.filename,
                record.validation.external_image_urls.join(", ")
            );
        }
    }

    if dry_run {
        println!("Dry run: no signatures were deployed.");
        return Ok(());
    }

    if !assume_yes
        && !confirm(&format!(
            "Deploy {} signature(s) to Gmail?",
            report.matched.len()
        ))?
    {
        println!("Aborted.");
        return Ok(());
    }

    // Bodies are read here, in match order, so the batch itself never touches
    // the filesystem. A file that vanished since validation fails its item.
    let mut items = Vec::with_capacity(report.matched.len());
    for record in &report.matched {
        let body = record.document.read_body().with_context(|| {
            format!("Failed to read {}", record.document.path.display())
        })?;
        items.push((record.recipient.email.clone(), body));
    }

    let (tx, mut rx) = mpsc::unbounded_channel::<ProgressEvent>();
    let total = items.len();
    let printer = tokio::spawn(async move {
        let mut done = 0usize;
        while let Some(event) = rx.recv().await {
            done += 1;
            match event.error_message {
                None => println!("[{done}/{total}] {} OK", event.email),
                Some(err) => println!(
                    "[{done}/{total}] {} FAILED after {} attempt(s): {err}",
                    event.email, event.attempts_used
                ),
            }
        }
    });

    let deploy_report = deploy_batch(&client, &items, &DeployPolicy::default(), Some(&tx)).await;
    drop(tx);
    printer.await.context("Progress printer task failed")?;

    println!();
    println!(
        "{}",
        render::deployment_summary(&deploy_report, report.unmatched.len())
    );

    let failures: Vec<_> = deploy_report.errors().collect();
    for outcome in failures.iter().take(MAX_PRINTED_ERRORS) {
        println!(
            "  {}: {}",
            outcome.recipient_email,
            outcome.error_message.as_deref().unwrap_or("unknown error")
        );
    }
    if failures.len() > MAX_PRINTED_ERRORS {
        println!("  ... and {} more", failures.len() - MAX_PRINTED_ERRORS);
    }

    Ok(())
}

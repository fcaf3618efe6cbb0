//! Plain-text tables and summaries for terminal output.

use signet_core::{DeployReport, MatchReport};

use crate::{format_size, truncate_string};

const FILE_WIDTH: usize = 36;
const EMAIL_WIDTH: usize = 34;

/// Matched pairs as an aligned three-column table, one row per record.
pub fn match_table(report: &MatchReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<FILE_WIDTH$}  {:<EMAIL_WIDTH$}  {}\n",
        "File", "Recipient", "Size"
    ));
    out.push_str(&format!(
        "{}  {}  {}\n",
        "-".repeat(FILE_WIDTH),
        "-".repeat(EMAIL_WIDTH),
        "-".repeat(8)
    ));
    for record in &report.matched {
        out.push_str(&format!(
            "{:<FILE_WIDTH$}  {:<EMAIL_WIDTH$}  {}\n",
            truncate_string(&record.document.filename, FILE_WIDTH),
            truncate_string(&record.recipient.email, EMAIL_WIDTH),
            format_size(record.validation.size_bytes)
        ));
    }
    out
}

/// One-line partition counts for a matching pass.
pub fn match_summary(report: &MatchReport) -> String {
    format!(
        "{} matched, {} unmatched, {} invalid ({} files total)",
        report.matched.len(),
        report.unmatched.len(),
        report.invalid.len(),
        report.total_documents()
    )
}

/// Unmatched and invalid partitions as indented lists; empty when both are.
pub fn match_leftovers(report: &MatchReport) -> String {
    let mut out = String::new();
    if !report.unmatched.is_empty() {
        out.push_str("Unmatched files (no directory user claims them):\n");
        for doc in &report.unmatched {
            out.push_str(&format!("  {}\n", doc.filename));
        }
    }
    if !report.invalid.is_empty() {
        out.push_str("Invalid files:\n");
        for doc in &report.invalid {
            out.push_str(&format!("  {}: {}\n", doc.filename, doc.reason));
        }
    }
    out
}

/// One-line result counts for a deployment batch. `skipped` is the number of
/// files the matcher left unclaimed, so the line accounts for every file.
pub fn deployment_summary(report: &DeployReport, skipped: usize) -> String {
    format!(
        "Deployed: {}  Failed: {}  Skipped: {}",
        report.success_count(),
        report.failed_count(),
        skipped
    )
}

use std::fs;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::models::Recipient;

/// A signature HTML file discovered in the signatures folder.
///
/// Bodies are loaded lazily: matching only needs the filename, validation and
/// deployment read the content from disk when they need it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CandidateDocument {
    pub filename: String,
    pub path: PathBuf,
    pub size_bytes: u64,
}

impl CandidateDocument {
    /// Read the document body as UTF-8 text.
    pub fn read_body(&self) -> io::Result<String> {
        fs::read_to_string(&self.path)
    }
}

/// Image analysis attached to a validated document.
///
/// Computed exactly once per claimed document. External image references are
/// a warning for the caller, never a validation failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationInfo {
    pub size_bytes: usize,
    pub has_embedded_images: bool,
    pub has_external_images: bool,
    pub external_image_urls: Vec<String>,
}

/// A validated document claimed by exactly one recipient.
///
/// The matched set forms a partial bijection: no recipient or document
/// appears in more than one record. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchRecord {
    pub document: CandidateDocument,
    pub recipient: Recipient,
    pub validation: ValidationInfo,
}

/// A document no recipient claimed during the pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnmatchedDocument {
    pub filename: String,
    pub path: PathBuf,
}

/// A claimed document that failed validation, with the reason.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InvalidDocument {
    pub filename: String,
    pub path: PathBuf,
    pub reason: String,
}

/// Three-way partition produced by one matching pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchReport {
    pub matched: Vec<MatchRecord>,
    pub unmatched: Vec<UnmatchedDocument>,
    pub invalid: Vec<InvalidDocument>,
}

impl MatchReport {
    /// Total candidate documents across all three partitions.
    pub fn total_documents(&self) -> usize {
        self.matched.len() + self.unmatched.len() + self.invalid.len()
    }
}

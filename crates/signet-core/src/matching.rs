//! Signature file to recipient matching.
//!
//! Filenames and directory identities are both reduced to a normalized form
//! and compared for exact equality; there is no fuzzy matching. A recipient
//! claims at most one document and a claimed document is unavailable to later
//! recipients, so the matched set is a partial bijection. Claimed documents
//! are validated before they count as matched.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::models::{
    CandidateDocument, InvalidDocument, MatchRecord, MatchReport, Recipient, UnmatchedDocument,
    ValidationInfo,
};

/// Gmail rejects signatures larger than roughly 10KB of encoded HTML.
pub const MAX_SIGNATURE_BYTES: usize = 10 * 1024;

/// Anchor-style image reference; capture group 1 is the src value.
static IMG_SRC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<img[^>]+src=["']([^"']+)["']"#).expect("image src pattern is valid")
});

/// Trailing `sig` / `signature` token, matched case-insensitively.
static SIG_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(sig|signature)$").expect("sig suffix pattern is valid"));

/// Fatal errors for a matching pass.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Signatures folder not found: {0}")]
    FolderNotFound(PathBuf),

    #[error("Path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("No HTML signature files found in {0}")]
    EmptyDirectory(PathBuf),

    #[error("No candidate documents to match")]
    NoCandidates,

    #[error("Failed to read signatures folder {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Per-document validation failures. Non-fatal: they route the claimed pair
/// to the `invalid` partition.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("File is empty")]
    Empty,

    #[error("File size ({size_bytes} bytes) exceeds limit ({limit} bytes)")]
    TooLarge { size_bytes: usize, limit: usize },

    #[error("Could not read file: {0}")]
    Unreadable(#[from] io::Error),
}

/// Normalize a filename or identity string for matching.
///
/// Strips a trailing `.html`/`.htm` extension and a trailing `sig`/`signature`
/// token, lowercases, turns `.`/`_`/`-` into spaces, drops everything outside
/// `[a-z0-9 ]`, and collapses whitespace. Applied identically to both sides
/// of a comparison, and idempotent.
pub fn normalize(name: &str) -> String {
    let stem = strip_extension(name);
    let stem = SIG_SUFFIX_RE.replace(stem, "");

    let mut cleaned = String::with_capacity(stem.len());
    for ch in stem.chars() {
        match ch {
            '.' | '_' | '-' => cleaned.push(' '),
            c if c.is_ascii_alphanumeric() => cleaned.push(c.to_ascii_lowercase()),
            c if c.is_whitespace() => cleaned.push(' '),
            _ => {}
        }
    }

    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Drop a trailing `.html`/`.htm`, case-insensitively.
///
/// Only document extensions are stripped: identity strings like the email
/// local-part `john.smith` keep their dots (which then become spaces), so
/// `john.smith.html` and `john.smith` normalize to the same form.
fn strip_extension(name: &str) -> &str {
    for ext in [".html", ".htm"] {
        // The split point can land inside a multibyte character when the name
        // is non-ASCII; such a name cannot end in an ASCII extension anyway.
        let Some(split) = name.len().checked_sub(ext.len()) else {
            continue;
        };
        if split > 0 && name.is_char_boundary(split) {
            let (stem, tail) = name.split_at(split);
            if tail.eq_ignore_ascii_case(ext) {
                return stem;
            }
        }
    }
    name
}

/// Normalized identity strings for a recipient, in match priority order:
/// email local-part, full display name, then the four given/family
/// concatenation variants. Duplicates are dropped, order preserved.
pub fn identity_keys(recipient: &Recipient) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();

    if !recipient.email.is_empty() {
        push_key(&mut keys, normalize(recipient.email_local_part()));
    }
    if !recipient.display_name.is_empty() {
        push_key(&mut keys, normalize(&recipient.display_name));
    }

    let given = recipient.given_name.trim().to_lowercase();
    let family = recipient.family_name.trim().to_lowercase();
    if !given.is_empty() && !family.is_empty() {
        for combo in [
            format!("{given} {family}"),
            format!("{given}{family}"),
            format!("{family} {given}"),
            format!("{family}{given}"),
        ] {
            push_key(&mut keys, normalize(&combo));
        }
    }

    keys
}

fn push_key(keys: &mut Vec<String>, key: String) {
    if !key.is_empty() && !keys.contains(&key) {
        keys.push(key);
    }
}

/// List candidate signature documents in a folder.
///
/// Non-recursive; only `html`/`htm` files are considered. Results are sorted
/// by filename so multi-candidate ties break deterministically rather than by
/// filesystem order.
pub fn scan_signature_folder(folder: &Path) -> Result<Vec<CandidateDocument>, MatchError> {
    if !folder.exists() {
        return Err(MatchError::FolderNotFound(folder.to_path_buf()));
    }
    if !folder.is_dir() {
        return Err(MatchError::NotADirectory(folder.to_path_buf()));
    }

    let entries = fs::read_dir(folder).map_err(|source| MatchError::Io {
        path: folder.to_path_buf(),
        source,
    })?;

    let mut documents = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| MatchError::Io {
            path: folder.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if !path.is_file() || !has_html_extension(&path) {
            continue;
        }
        let size_bytes = entry
            .metadata()
            .map_err(|source| MatchError::Io {
                path: path.clone(),
                source,
            })?
            .len();
        let filename = match path.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => continue,
        };
        documents.push(CandidateDocument {
            filename,
            path,
            size_bytes,
        });
    }

    if documents.is_empty() {
        return Err(MatchError::EmptyDirectory(folder.to_path_buf()));
    }

    documents.sort_by(|a, b| a.filename.cmp(&b.filename));
    tracing::debug!(
        folder = %folder.display(),
        count = documents.len(),
        "Scanned signatures folder"
    );
    Ok(documents)
}

fn has_html_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
        .unwrap_or(false)
}

/// Validate a claimed signature document.
///
/// The body must decode as UTF-8, be non-empty after trimming, and stay
/// within [`MAX_SIGNATURE_BYTES`] (a document of exactly the limit passes).
/// Image analysis flags embedded (`data:image`) and external (`http://`,
/// `https://`, `//`) references; external references never fail validation.
pub fn validate_document(document: &CandidateDocument) -> Result<ValidationInfo, ValidationError> {
    let content = document.read_body()?;
    let size_bytes = content.len();

    if size_bytes > MAX_SIGNATURE_BYTES {
        return Err(ValidationError::TooLarge {
            size_bytes,
            limit: MAX_SIGNATURE_BYTES,
        });
    }
    if content.trim().is_empty() {
        return Err(ValidationError::Empty);
    }

    let mut info = ValidationInfo {
        size_bytes,
        ..ValidationInfo::default()
    };

    if content.contains("data:image") {
        info.has_embedded_images = true;
    }

    for captures in IMG_SRC_RE.captures_iter(&content) {
        let src = &captures[1];
        if src.starts_with("http://") || src.starts_with("https://") || src.starts_with("//") {
            info.has_external_images = true;
            info.external_image_urls.push(src.to_string());
        }
    }

    Ok(info)
}

/// Partition candidate documents into matched, unmatched, and invalid.
///
/// Recipients are scanned in the given order; each claims the first still
/// available document whose normalized filename equals one of its identity
/// keys. A claimed document that fails validation goes to `invalid` and the
/// recipient stays unmatched for this pass (no fallback to a second
/// candidate). Documents nobody claimed end up in `unmatched`.
pub fn match_candidates(
    documents: Vec<CandidateDocument>,
    recipients: &[Recipient],
) -> Result<MatchReport, MatchError> {
    if documents.is_empty() {
        return Err(MatchError::NoCandidates);
    }

    // Normalize each filename once; the per-recipient scan is then a string
    // comparison against precomputed keys.
    let mut pool: Vec<Option<(CandidateDocument, String)>> = documents
        .into_iter()
        .map(|doc| {
            let normalized = normalize(&doc.filename);
            Some((doc, normalized))
        })
        .collect();

    let mut report = MatchReport::default();

    for recipient in recipients {
        if recipient.email.is_empty() {
            continue;
        }
        let keys = identity_keys(recipient);
        if keys.is_empty() {
            continue;
        }

        let claimed = pool.iter().position(|slot| {
            slot.as_ref()
                .is_some_and(|(_, normalized)| keys.iter().any(|key| key == normalized))
        });
        let Some(index) = claimed else {
            continue;
        };
        let Some((document, _)) = pool[index].take() else {
            continue;
        };

        match validate_document(&document) {
            Ok(validation) => {
                tracing::debug!(
                    file = %document.filename,
                    email = %recipient.email,
                    "Matched signature file to user"
                );
                report.matched.push(MatchRecord {
                    document,
                    recipient: recipient.clone(),
                    validation,
                });
            }
            Err(err) => {
                tracing::warn!(
                    file = %document.filename,
                    email = %recipient.email,
                    error = %err,
                    "Matched signature file failed validation"
                );
                report.invalid.push(InvalidDocument {
                    filename: document.filename.clone(),
                    path: document.path.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }

    for slot in pool {
        if let Some((document, _)) = slot {
            report.unmatched.push(UnmatchedDocument {
                filename: document.filename,
                path: document.path,
            });
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn recipient(email: &str, display: &str, given: &str, family: &str) -> Recipient {
        Recipient {
            email: email.to_string(),
            display_name: display.to_string(),
            given_name: given.to_string(),
            family_name: family.to_string(),
        }
    }

    fn write_doc(dir: &TempDir, filename: &str, body: &str) -> CandidateDocument {
        let path = dir.path().join(filename);
        fs::write(&path, body).unwrap();
        CandidateDocument {
            filename: filename.to_string(),
            path,
            size_bytes: body.len() as u64,
        }
    }

    #[test]
    fn normalize_strips_extension_and_separators() {
        assert_eq!(normalize("john.smith.html"), "john smith");
        assert_eq!(normalize("jane_doe.htm"), "jane doe");
        assert_eq!(normalize("Bob-Smith.HTML"), "bob smith");
    }

    #[test]
    fn normalize_strips_sig_suffix() {
        assert_eq!(normalize("jane-doe-sig.html"), "jane doe");
        assert_eq!(normalize("john.smith.signature.html"), "john smith");
        assert_eq!(normalize("JohnSIG.html"), "john");
    }

    #[test]
    fn normalize_drops_special_characters_and_collapses_whitespace() {
        assert_eq!(normalize("  John   O'Brien!.html"), "john obrien");
        assert_eq!(normalize("a@b#c.html"), "abc");
    }

    #[test]
    fn normalize_accepts_non_ascii_names() {
        // Multibyte characters near the extension must not panic the byte
        // arithmetic; they are dropped like any other non-alphanumeric.
        assert_eq!(normalize("josé.htm"), "jos");
        assert_eq!(normalize("josé-garcía.html"), "jos garca");
        assert_eq!(normalize("José García"), "jos garca");
        assert_eq!(normalize("é.html"), "");
    }

    #[test]
    fn normalize_keeps_dots_in_identity_strings() {
        // The email local-part has no file extension to strip; its dots
        // become spaces so it lines up with dotted filenames.
        assert_eq!(normalize("john.smith"), "john smith");
        assert_eq!(normalize("john.smith"), normalize("john.smith.html"));
    }

    #[test]
    fn normalize_is_idempotent() {
        for input in [
            "john.smith.html",
            "jane-doe-sig.htm",
            "  Mixed CASE__name  ",
            "",
            "data.signature",
            "josé.htm",
        ] {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn identity_keys_priority_order() {
        let keys = identity_keys(&recipient("john.smith@co.com", "John Smith", "John", "Smith"));
        assert_eq!(keys[0], "john smith");
        assert!(keys.contains(&"johnsmith".to_string()));
        assert!(keys.contains(&"smith john".to_string()));
        assert!(keys.contains(&"smithjohn".to_string()));
    }

    #[test]
    fn identity_keys_skip_empty_parts() {
        let keys = identity_keys(&recipient("solo@co.com", "", "", "Smith"));
        assert_eq!(keys, vec!["solo".to_string()]);
    }

    #[test]
    fn matches_by_email_prefix() {
        let dir = TempDir::new().unwrap();
        let docs = vec![write_doc(&dir, "john.smith.html", "<p>Sig</p>")];
        let recipients = vec![recipient("john.smith@co.com", "", "", "")];

        let report = match_candidates(docs, &recipients).unwrap();
        assert_eq!(report.matched.len(), 1);
        assert_eq!(report.matched[0].recipient.email, "john.smith@co.com");
        assert!(report.unmatched.is_empty());
        assert!(report.invalid.is_empty());
    }

    #[test]
    fn matches_by_given_family_after_sig_suffix() {
        let dir = TempDir::new().unwrap();
        let docs = vec![write_doc(&dir, "jane-doe-sig.html", "<p>Sig</p>")];
        let recipients = vec![recipient("jdoe@co.com", "", "Jane", "Doe")];

        let report = match_candidates(docs, &recipients).unwrap();
        assert_eq!(report.matched.len(), 1);
        assert_eq!(report.matched[0].document.filename, "jane-doe-sig.html");
    }

    #[test]
    fn unclaimed_document_is_unmatched() {
        let dir = TempDir::new().unwrap();
        let docs = vec![write_doc(&dir, "stranger.html", "<p>Sig</p>")];
        let recipients = vec![
            recipient("a@co.com", "Alice Ames", "Alice", "Ames"),
            recipient("b@co.com", "Bob Burns", "Bob", "Burns"),
        ];

        let report = match_candidates(docs, &recipients).unwrap();
        assert!(report.matched.is_empty());
        assert_eq!(report.unmatched.len(), 1);
        assert_eq!(report.unmatched[0].filename, "stranger.html");
    }

    #[test]
    fn claimed_document_unavailable_to_later_recipients() {
        let dir = TempDir::new().unwrap();
        let docs = vec![write_doc(&dir, "smith.html", "<p>Sig</p>")];
        // Both recipients normalize to "smith" via family-only display name.
        let recipients = vec![
            recipient("first@co.com", "Smith", "", ""),
            recipient("second@co.com", "Smith", "", ""),
        ];

        let report = match_candidates(docs, &recipients).unwrap();
        assert_eq!(report.matched.len(), 1);
        assert_eq!(report.matched[0].recipient.email, "first@co.com");
        assert!(report.unmatched.is_empty());
    }

    #[test]
    fn matched_set_is_partial_bijection_and_partitions_cover_all() {
        let dir = TempDir::new().unwrap();
        let docs = vec![
            write_doc(&dir, "alice.html", "<p>A</p>"),
            write_doc(&dir, "bob.html", "<p>B</p>"),
            write_doc(&dir, "orphan.html", "<p>O</p>"),
        ];
        let total = docs.len();
        let recipients = vec![
            recipient("alice@co.com", "Alice Ames", "Alice", "Ames"),
            recipient("bob@co.com", "Bob Burns", "Bob", "Burns"),
        ];

        let report = match_candidates(docs, &recipients).unwrap();
        assert_eq!(report.total_documents(), total);

        let mut emails: Vec<&str> = report
            .matched
            .iter()
            .map(|m| m.recipient.email.as_str())
            .collect();
        emails.sort_unstable();
        emails.dedup();
        assert_eq!(emails.len(), report.matched.len());

        let mut files: Vec<&str> = report
            .matched
            .iter()
            .map(|m| m.document.filename.as_str())
            .collect();
        files.sort_unstable();
        files.dedup();
        assert_eq!(files.len(), report.matched.len());
    }

    #[test]
    fn matching_is_deterministic() {
        let dir = TempDir::new().unwrap();
        let build = |dir: &TempDir| {
            vec![
                write_doc(dir, "alice.html", "<p>A</p>"),
                write_doc(dir, "bob.html", "<p>B</p>"),
            ]
        };
        let recipients = vec![
            recipient("alice@co.com", "Alice Ames", "Alice", "Ames"),
            recipient("bob@co.com", "Bob Burns", "Bob", "Burns"),
        ];

        let first = match_candidates(build(&dir), &recipients).unwrap();
        let second = match_candidates(build(&dir), &recipients).unwrap();
        assert_eq!(first.matched, second.matched);
        assert_eq!(first.unmatched, second.unmatched);
    }

    #[test]
    fn invalid_document_keeps_recipient_unmatched_without_fallback() {
        let dir = TempDir::new().unwrap();
        let docs = vec![
            // Sorted scan order would put this first; it is oversized.
            write_doc(&dir, "jane.doe.html", &"x".repeat(MAX_SIGNATURE_BYTES + 1)),
            write_doc(&dir, "janedoe.html", "<p>valid fallback</p>"),
        ];
        let recipients = vec![recipient("jane.doe@co.com", "Jane Doe", "Jane", "Doe")];

        let report = match_candidates(docs, &recipients).unwrap();
        assert!(report.matched.is_empty(), "no fallback to a second file");
        assert_eq!(report.invalid.len(), 1);
        assert!(report.invalid[0].reason.contains("exceeds limit"));
        assert_eq!(report.unmatched.len(), 1);
        assert_eq!(report.unmatched[0].filename, "janedoe.html");
    }

    #[test]
    fn empty_candidate_set_is_an_error() {
        let recipients = vec![recipient("a@co.com", "", "", "")];
        let err = match_candidates(Vec::new(), &recipients).unwrap_err();
        assert!(matches!(err, MatchError::NoCandidates));
    }

    #[test]
    fn empty_recipient_list_yields_all_unmatched() {
        let dir = TempDir::new().unwrap();
        let docs = vec![write_doc(&dir, "a.html", "<p>A</p>")];
        let report = match_candidates(docs, &[]).unwrap();
        assert!(report.matched.is_empty());
        assert_eq!(report.unmatched.len(), 1);
    }

    #[test]
    fn validation_size_boundary() {
        let dir = TempDir::new().unwrap();
        let at_limit = write_doc(&dir, "at.html", &"x".repeat(MAX_SIGNATURE_BYTES));
        let over_limit = write_doc(&dir, "over.html", &"x".repeat(MAX_SIGNATURE_BYTES + 1));

        let info = validate_document(&at_limit).unwrap();
        assert_eq!(info.size_bytes, MAX_SIGNATURE_BYTES);

        let err = validate_document(&over_limit).unwrap_err();
        match err {
            ValidationError::TooLarge { size_bytes, limit } => {
                assert_eq!(size_bytes, MAX_SIGNATURE_BYTES + 1);
                assert_eq!(limit, MAX_SIGNATURE_BYTES);
            }
            other => panic!("expected TooLarge, got {other:?}"),
        }
    }

    #[test]
    fn validation_rejects_empty_and_whitespace_files() {
        let dir = TempDir::new().unwrap();
        let empty = write_doc(&dir, "empty.html", "");
        let blank = write_doc(&dir, "blank.html", "   \n\t ");

        assert!(matches!(
            validate_document(&empty),
            Err(ValidationError::Empty)
        ));
        assert!(matches!(
            validate_document(&blank),
            Err(ValidationError::Empty)
        ));
    }

    #[test]
    fn validation_flags_embedded_and_external_images() {
        let dir = TempDir::new().unwrap();
        let body = concat!(
            "<img src=\"data:image/png;base64,AAAA\">",
            "<img src=\"https://cdn.example.com/logo.png\">",
            "<IMG SRC='//example.com/pixel.gif'>",
            "<img src=\"cid:inline-ref\">",
        );
        let doc = write_doc(&dir, "images.html", body);

        let info = validate_document(&doc).unwrap();
        assert!(info.has_embedded_images);
        assert!(info.has_external_images);
        assert_eq!(
            info.external_image_urls,
            vec![
                "https://cdn.example.com/logo.png".to_string(),
                "//example.com/pixel.gif".to_string(),
            ]
        );
    }

    #[test]
    fn scan_sorts_by_filename_and_filters_extensions() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("zeta.html"), "<p>z</p>").unwrap();
        fs::write(dir.path().join("alpha.htm"), "<p>a</p>").unwrap();
        fs::write(dir.path().join("notes.txt"), "skip me").unwrap();
        fs::create_dir(dir.path().join("nested.html")).unwrap();

        let docs = scan_signature_folder(dir.path()).unwrap();
        let names: Vec<&str> = docs.iter().map(|d| d.filename.as_str()).collect();
        assert_eq!(names, vec!["alpha.htm", "zeta.html"]);
    }

    #[test]
    fn scan_errors() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            scan_signature_folder(&missing),
            Err(MatchError::FolderNotFound(_))
        ));

        let file = dir.path().join("plain.html");
        fs::write(&file, "<p>x</p>").unwrap();
        assert!(matches!(
            scan_signature_folder(&file),
            Err(MatchError::NotADirectory(_))
        ));

        let empty = TempDir::new().unwrap();
        assert!(matches!(
            scan_signature_folder(empty.path()),
            Err(MatchError::EmptyDirectory(_))
        ));
    }
}

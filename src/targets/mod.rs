//! Target list handling
//!
//! This module loads the ordered list of profile URLs to crawl and extracts
//! the numeric player id that keys everything downstream.
//!
//! # List format
//!
//! - A line starting with `//` or `#` is an annotation applied to the next
//!   URL line
//! - Blank lines are ignored
//! - A non-blank line that is neither a comment nor an `http(s)` URL is
//!   reported as a warning and skipped
//!
//! # Example
//!
//! ```no_run
//! use leaguemine::targets::load_targets;
//! use std::path::Path;
//!
//! let targets = load_targets(Path::new("targets.txt")).unwrap();
//! println!("Loaded {} targets", targets.len());
//! ```

use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use thiserror::Error;

/// Errors that can occur while loading the target list
#[derive(Debug, Error)]
pub enum TargetListError {
    #[error("Target list not found: {0}")]
    NotFound(String),

    #[error("Failed to read target list: {0}")]
    Io(#[from] std::io::Error),

    #[error("Target list {0} contains no valid URLs")]
    Empty(String),
}

/// Result type for target list operations
pub type TargetListResult<T> = Result<T, TargetListError>;

/// One profile page to crawl, with the annotation that preceded it in the list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTarget {
    /// The profile URL
    pub url: String,

    /// Annotation from the preceding comment line (empty if none)
    pub annotation: String,
}

impl CrawlTarget {
    /// Creates a target with no annotation
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            annotation: String::new(),
        }
    }
}

/// Loads crawl targets from the given list file
///
/// A missing or unreadable file is fatal; malformed lines are skipped with a
/// warning so a single bad line never aborts the run.
///
/// # Arguments
///
/// * `path` - Path to the target list file
///
/// # Returns
///
/// * `Ok(Vec<CrawlTarget>)` - The targets in file order
/// * `Err(TargetListError)` - The file is missing, unreadable, or has no URLs
pub fn load_targets(path: &Path) -> TargetListResult<Vec<CrawlTarget>> {
    if !path.exists() {
        return Err(TargetListError::NotFound(path.display().to_string()));
    }

    let content = std::fs::read_to_string(path)?;
    let targets = parse_target_lines(&content);

    if targets.is_empty() {
        return Err(TargetListError::Empty(path.display().to_string()));
    }

    tracing::info!("Loaded {} targets from {}", targets.len(), path.display());
    Ok(targets)
}

/// Parses target list content into crawl targets
///
/// Annotations accumulate from comment lines and attach to the next URL line;
/// consuming a URL resets the pending annotation.
pub fn parse_target_lines(content: &str) -> Vec<CrawlTarget> {
    let mut targets = Vec::new();
    let mut pending_annotation = String::new();

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix("//") {
            pending_annotation = rest.trim().to_string();
        } else if let Some(rest) = trimmed.strip_prefix('#') {
            pending_annotation = rest.trim().to_string();
        } else if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            targets.push(CrawlTarget {
                url: trimmed.to_string(),
                annotation: std::mem::take(&mut pending_annotation),
            });
        } else {
            tracing::warn!("Skipping malformed target line: {}", trimmed);
        }
    }

    targets
}

/// Extracts the numeric player id from a profile URL
///
/// The id is the decimal path segment following `popup/`. Returns None when
/// the URL carries no such segment; extraction itself never fails.
///
/// # Example
///
/// ```
/// use leaguemine::targets::extract_player_id;
///
/// let id = extract_player_id("https://example.com/profile/popup/1155593160");
/// assert_eq!(id.as_deref(), Some("1155593160"));
/// ```
pub fn extract_player_id(url: &str) -> Option<String> {
    static PLAYER_ID_RE: OnceLock<Regex> = OnceLock::new();
    let re = PLAYER_ID_RE.get_or_init(|| Regex::new(r"popup/(\d+)").expect("valid regex"));

    re.captures(url)
        .map(|caps| caps[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_extract_player_id() {
        assert_eq!(
            extract_player_id("https://site.example/profile/popup/1155593160?n=1"),
            Some("1155593160".to_string())
        );
        assert_eq!(extract_player_id("https://site.example/profile/"), None);
        assert_eq!(extract_player_id("https://site.example/popup/abc"), None);
    }

    #[test]
    fn test_annotation_applies_to_next_url() {
        let content = "// first squad\nhttps://a.example/popup/1\nhttps://a.example/popup/2\n";
        let targets = parse_target_lines(content);

        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].annotation, "first squad");
        assert_eq!(targets[1].annotation, "");
    }

    #[test]
    fn test_hash_comment_marker() {
        let content = "# veteran\nhttps://a.example/popup/3\n";
        let targets = parse_target_lines(content);

        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].annotation, "veteran");
    }

    #[test]
    fn test_blank_and_malformed_lines_skipped() {
        let content = "\n\nnot a url at all\nhttps://a.example/popup/4\n\n";
        let targets = parse_target_lines(content);

        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].url, "https://a.example/popup/4");
    }

    #[test]
    fn test_load_targets_missing_file() {
        let result = load_targets(Path::new("/nonexistent/targets.txt"));
        assert!(matches!(result, Err(TargetListError::NotFound(_))));
    }

    #[test]
    fn test_load_targets_empty_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "// only a comment").unwrap();

        let result = load_targets(file.path());
        assert!(matches!(result, Err(TargetListError::Empty(_))));
    }

    #[test]
    fn test_load_targets_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "// top seed").unwrap();
        writeln!(file, "https://a.example/popup/10").unwrap();
        writeln!(file, "https://a.example/popup/11").unwrap();

        let targets = load_targets(file.path()).unwrap();
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].annotation, "top seed");
    }
}

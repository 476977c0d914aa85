//! Hunk fingerprinting
//!
//! Turns the unified diff of one pull request into one content fingerprint per
//! hunk. Only the added and removed lines take part in the digest, in their
//! original order and byte for byte, so identical edits collapse to the same
//! fingerprint no matter which file, PR or branch they come from.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// Added/removed lines of one hunk, in diff order
pub type ChangeLines = Vec<String>;

/// Content-derived identity of a hunk (hex SHA-256 of its change lines)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Digest a sequence of change lines
    pub fn of_lines<S: AsRef<str>>(lines: &[S]) -> Self {
        let mut hasher = Sha256::new();
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                hasher.update(b"\n");
            }
            hasher.update(line.as_ref().as_bytes());
        }
        Self(hex::encode(hasher.finalize()))
    }

    /// Full hex string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form for compact display
    pub fn short(&self) -> &str {
        self.0.get(..12).unwrap_or(&self.0)
    }
}

impl From<&str> for Fingerprint {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Fingerprint {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fingerprints of one diff
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffFingerprints {
    /// Fingerprints in order of appearance (repeated hunks repeat here)
    pub fingerprints: Vec<Fingerprint>,
    /// Change lines behind each fingerprint
    pub changes: HashMap<Fingerprint, ChangeLines>,
}

impl DiffFingerprints {
    fn close_hunk(&mut self, lines: &mut ChangeLines) {
        if lines.is_empty() {
            return;
        }
        let hunk = std::mem::take(lines);
        let fingerprint = Fingerprint::of_lines(&hunk);
        self.fingerprints.push(fingerprint.clone());
        self.changes.entry(fingerprint).or_insert(hunk);
    }
}

fn is_change_line(line: &str) -> bool {
    (line.starts_with('+') || line.starts_with('-'))
        && !line.starts_with("+++")
        && !line.starts_with("---")
}

/// Fingerprint every hunk of a unified diff
///
/// Lines before the first `@@` header are ignored. Hunks without any added or
/// removed line produce no fingerprint.
pub fn fingerprint_diff(diff: &str) -> DiffFingerprints {
    let mut result = DiffFingerprints::default();
    let mut hunk: ChangeLines = Vec::new();
    let mut in_hunk = false;

    // split on '\n' only: a trailing '\r' is content
    for line in diff.split('\n') {
        if line.starts_with("@@") {
            result.close_hunk(&mut hunk);
            in_hunk = true;
            continue;
        }
        if in_hunk && is_change_line(line) {
            hunk.push(line.to_string());
        }
    }
    result.close_hunk(&mut hunk);

    result
}

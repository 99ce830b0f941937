// src/hooks/secrets.rs
// =============================================================================
// A small regex secret scanner, usable as a hook.
//
// Each text file is scanned line by line against a fixed rule set; every
// (line, rule) match becomes a Finding. Files that look binary (a NUL byte
// near the start, the same heuristic git uses) are skipped.
// =============================================================================

use std::sync::{LazyLock, Mutex, PoisonError};

use regex::Regex;
use serde::Serialize;

use crate::acquire::ExtractedFile;
use crate::pipeline::Hook;

// How far into a file to look for a NUL byte before calling it binary.
const BINARY_SNIFF_LEN: usize = 8000;

struct Rule {
    name: &'static str,
    pattern: Regex,
}

static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    [
        ("aws-access-key-id", r"\b(AKIA|ASIA)[0-9A-Z]{16}\b"),
        ("github-token", r"\bgh[pousr]_[A-Za-z0-9]{36,}\b"),
        ("slack-token", r"\bxox[abposr]-[A-Za-z0-9-]{10,}"),
        (
            "private-key",
            r"-----BEGIN (RSA |EC |DSA |OPENSSH |PGP )?PRIVATE KEY( BLOCK)?-----",
        ),
        (
            "password-assignment",
            r#"(?i)(password|passwd|secret|api_?key)[a-z_]*\s*[:=]\s*["'][^"'\s]{6,}["']"#,
        ),
    ]
    .into_iter()
    .map(|(name, pattern)| Rule {
        name,
        pattern: Regex::new(pattern).expect("secret rule pattern is valid"),
    })
    .collect()
});

/// One rule match in one file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Finding {
    /// `owner/name` of the repository the blob came from
    pub repository: String,
    /// Entry name of the blob; empty if no tree named it
    pub filename: String,
    pub rule: &'static str,
    /// 1-based line number
    pub line: usize,
}

/// Collects findings from every file it is shown. Safe to share across
/// repository tasks.
#[derive(Debug, Default)]
pub struct SecretScanner {
    findings: Mutex<Vec<Finding>>,
}

impl SecretScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Findings so far, sorted by repository, filename, rule and line.
    pub fn findings(&self) -> Vec<Finding> {
        let mut findings = self
            .findings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        findings.sort();
        findings
    }
}

impl Hook for SecretScanner {
    fn inspect(&self, file: &ExtractedFile<'_>) {
        let found = scan(file);
        if !found.is_empty() {
            self.findings
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .extend(found);
        }
    }
}

/// Scans a single file without recording anything.
pub fn scan(file: &ExtractedFile<'_>) -> Vec<Finding> {
    if looks_binary(&file.content) {
        return Vec::new();
    }

    let text = file.text();
    let mut findings = Vec::new();
    for (index, line) in text.lines().enumerate() {
        for rule in RULES.iter() {
            if rule.pattern.is_match(line) {
                findings.push(Finding {
                    repository: file.source_repository.full_name.clone(),
                    filename: file.filename.clone(),
                    rule: rule.name,
                    line: index + 1,
                });
            }
        }
    }
    findings
}

fn looks_binary(content: &[u8]) -> bool {
    content.iter().take(BINARY_SNIFF_LEN).any(|&b| b == 0)
}

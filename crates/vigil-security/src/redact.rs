// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Redaction of secrets and personal data from outbound prompts.
//!
//! A [`Redactor`] is an ordered list of [`Matcher`]s. Each matcher scans the
//! output of the previous one and replaces every hit with
//! `[REDACTED:<category>]`. The order is fixed, so the same input always
//! produces the same output and counts.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::{NoExpand, Regex};
use tracing::debug;

/// Always-on secret patterns, in application order.
static SECRET_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    vec![
        ("openai_key", Regex::new(r"\bsk-[A-Za-z0-9]{20,}\b").unwrap()),
        ("aws_access_key", Regex::new(r"\bAKIA[0-9A-Z]{16}\b").unwrap()),
        (
            "jwt",
            Regex::new(r"\beyJ[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+\b").unwrap(),
        ),
        (
            "password_kv",
            Regex::new(r"(?i)\b(password|passwd|pwd)\s*[:=]\s*([^\s,;]{6,})").unwrap(),
        ),
        (
            "bearer_token",
            Regex::new(r"(?i)\bBearer\s+([A-Za-z0-9._-]{20,})").unwrap(),
        ),
    ]
});

/// Opt-in personal data patterns, applied after the secret patterns.
static PII_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    vec![
        (
            "email",
            Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap(),
        ),
        (
            "phone",
            Regex::new(r"\b(?:\+?1[-.\s]?)?(?:\(\d{3}\)|\d{3})[-.\s]?\d{3}[-.\s]?\d{4}\b").unwrap(),
        ),
    ]
});

/// Placeholder written in place of a match.
pub fn placeholder(category: &str) -> String {
    format!("[REDACTED:{category}]")
}

/// One redaction category.
pub trait Matcher: Send + Sync {
    /// Category name used in the placeholder and in counts.
    fn category(&self) -> &str;

    /// Replace every match in `text`, returning the new text and the number
    /// of replacements.
    fn apply(&self, text: &str) -> (String, usize);
}

/// A [`Matcher`] backed by a regular expression. The whole match is replaced.
#[derive(Debug, Clone)]
pub struct RegexMatcher {
    category: String,
    regex: Regex,
    replacement: String,
}

impl RegexMatcher {
    pub fn new(category: impl Into<String>, regex: Regex) -> Self {
        let category = category.into();
        let replacement = placeholder(&category);
        Self {
            category,
            regex,
            replacement,
        }
    }
}

impl Matcher for RegexMatcher {
    fn category(&self) -> &str {
        &self.category
    }

    fn apply(&self, text: &str) -> (String, usize) {
        let hits = self.regex.find_iter(text).count();
        if hits == 0 {
            return (text.to_string(), 0);
        }
        let replaced = self
            .regex
            .replace_all(text, NoExpand(&self.replacement))
            .into_owned();
        (replaced, hits)
    }
}

/// Sanitized text plus per-category counts. Only categories with at least
/// one match appear in `counts`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedactionResult {
    pub text: String,
    pub counts: BTreeMap<String, usize>,
}

/// An ordered pipeline of matchers.
pub struct Redactor {
    matchers: Vec<Box<dyn Matcher>>,
}

impl Redactor {
    /// The built-in pipeline. `redact_emails_phones` appends the email and
    /// phone matchers after the secret matchers.
    pub fn new(redact_emails_phones: bool) -> Self {
        let mut matchers: Vec<Box<dyn Matcher>> = SECRET_PATTERNS
            .iter()
            .map(|(category, regex)| {
                Box::new(RegexMatcher::new(*category, regex.clone())) as Box<dyn Matcher>
            })
            .collect();
        if redact_emails_phones {
            matchers.extend(PII_PATTERNS.iter().map(|(category, regex)| {
                Box::new(RegexMatcher::new(*category, regex.clone())) as Box<dyn Matcher>
            }));
        }
        Self { matchers }
    }

    /// Append a matcher to the end of the pipeline.
    pub fn with_matcher(mut self, matcher: impl Matcher + 'static) -> Self {
        self.matchers.push(Box::new(matcher));
        self
    }

    /// Category names in application order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.matchers.iter().map(|m| m.category())
    }

    pub fn redact(&self, text: &str) -> RedactionResult {
        let mut out = text.to_string();
        let mut counts = BTreeMap::new();
        for matcher in &self.matchers {
            let (next, hits) = matcher.apply(&out);
            if hits > 0 {
                *counts.entry(matcher.category().to_string()).or_insert(0) += hits;
                out = next;
            }
        }
        if !counts.is_empty() {
            debug!(categories = ?counts.keys().collect::<Vec<_>>(), "redacted prompt");
        }
        RedactionResult { text: out, counts }
    }
}

impl std::fmt::Debug for Redactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.categories()).finish()
    }
}

/// Redact `text` with the built-in pipeline.
pub fn redact(text: &str, redact_emails_phones: bool) -> RedactionResult {
    Redactor::new(redact_emails_phones).redact(text)
}

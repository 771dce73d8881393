//! Critique and deterministic scoring of curriculum drafts.
//!
//! Nothing in this module raises on a defective draft. Every defect is a
//! [`Diagnostic`]; the judge's report is the acceptance authority.

pub mod content_rules;
pub mod critic;
pub mod judge;
pub mod structure_rules;
pub mod types;

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

pub use critic::critique;
pub use judge::evaluate;
pub use types::{
    Diagnostic, PedagogyCritique, PedagogySummary, QualityDimensions, QualityReport, RuleId,
    ScoreSummary, Severity,
};

/// Words of four or more lowercase alphanumerics. Compiled once.
fn word_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[a-z0-9]{4,}").expect("Invalid word token regex"))
}

/// Lowercased alphanumeric words of at least four characters.
pub fn tokens(text: &str) -> BTreeSet<String> {
    let lowered = text.to_lowercase();
    word_pattern()
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

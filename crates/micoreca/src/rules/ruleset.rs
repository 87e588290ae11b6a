//! Compiled, immutable filtering rules.

use std::path::Path;

use indexmap::IndexSet;
use log::warn;
use regex::{Regex, RegexBuilder};

use crate::error::{MicorecaError, Result};

use super::config::KeywordConfig;

/// Characters that mark a keyword as a regex rather than a literal term.
const REGEX_MARKERS: &[char] = &['.', '*', '+', '?'];

/// A strict whole-word term and its boundary pattern.
#[derive(Debug, Clone)]
pub struct StrictTerm {
    /// Upper-case reference form.
    pub term: String,
    /// `\b<term>\b`, case-sensitive.
    pub pattern: Regex,
}

impl StrictTerm {
    fn new(term: String) -> Result<Self> {
        let pattern = Regex::new(&format!(r"\b{}\b", regex::escape(&term)))
            .map_err(|e| MicorecaError::Config(e.to_string()))?;
        Ok(Self { term, pattern })
    }

    /// Whole-word, case-sensitive search in raw content.
    pub fn is_found_in(&self, content: &str) -> bool {
        self.pattern.is_match(content)
    }
}

/// Counts of compiled criteria, for display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuleSetSummary {
    pub topics: usize,
    pub operations: usize,
    pub fragments: usize,
    pub strict_terms: usize,
}

/// Filtering criteria ready to be evaluated.
///
/// Built once per run from a [`KeywordConfig`] and never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct KeywordRuleSet {
    target_topics: IndexSet<String>,
    target_operations: IndexSet<String>,
    fragment_patterns: Vec<Regex>,
    strict_terms: Vec<StrictTerm>,
}

impl KeywordRuleSet {
    /// Compile a configuration. Malformed fragment patterns are skipped.
    pub fn compile(config: &KeywordConfig) -> Result<Self> {
        let target_topics = config.edam.topics.iter().cloned().collect();
        let target_operations = config.edam.operations.iter().cloned().collect();

        let mut fragment_patterns = Vec::new();
        for raw in config.keywords.iter().filter(|k| !k.trim().is_empty()) {
            match RegexBuilder::new(raw).case_insensitive(true).build() {
                Ok(pattern) => fragment_patterns.push(pattern),
                Err(e) => warn!("Could not compile regex pattern '{}': {}", raw, e),
            }
        }

        let derived = config
            .keywords
            .iter()
            .filter(|k| !k.trim().is_empty() && is_literal_acronym(k));
        let mut names: IndexSet<String> = IndexSet::new();
        for term in config.acronyms.iter().chain(derived) {
            let term = term.trim();
            if !term.is_empty() {
                names.insert(term.to_uppercase());
            }
        }

        let strict_terms = names
            .into_iter()
            .map(StrictTerm::new)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            target_topics,
            target_operations,
            fragment_patterns,
            strict_terms,
        })
    }

    /// Load and compile a keyword configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::compile(&KeywordConfig::load(path)?)
    }

    pub fn target_topics(&self) -> &IndexSet<String> {
        &self.target_topics
    }

    pub fn target_operations(&self) -> &IndexSet<String> {
        &self.target_operations
    }

    pub fn fragment_patterns(&self) -> &[Regex] {
        &self.fragment_patterns
    }

    pub fn strict_terms(&self) -> &[StrictTerm] {
        &self.strict_terms
    }

    /// Whether `candidate`, upper-cased, is one of the strict terms.
    pub fn is_strict_term(&self, candidate: &str) -> bool {
        let upper = candidate.to_uppercase();
        self.strict_terms.iter().any(|s| s.term == upper)
    }

    pub fn is_empty(&self) -> bool {
        self.target_topics.is_empty()
            && self.target_operations.is_empty()
            && self.fragment_patterns.is_empty()
            && self.strict_terms.is_empty()
    }

    pub fn summary(&self) -> RuleSetSummary {
        RuleSetSummary {
            topics: self.target_topics.len(),
            operations: self.target_operations.len(),
            fragments: self.fragment_patterns.len(),
            strict_terms: self.strict_terms.len(),
        }
    }
}

/// A keyword without regex markers and already upper-case is also an acronym.
fn is_literal_acronym(keyword: &str) -> bool {
    !keyword.contains(REGEX_MARKERS) && keyword.to_uppercase() == keyword
}

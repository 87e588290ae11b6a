//! The three-level matching cascade.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::record::{Field, KeywordField, MatchReason, Record, TextField};
use crate::rules::KeywordRuleSet;

static TRAILING_PUNCTUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.,;()?!]+$").expect("static regex is valid"));

/// Evaluates records against an immutable rule set.
///
/// Checks run in priority order and stop at the first success:
///
/// 1. EDAM topics, then EDAM operations
/// 2. keyword lists (strict terms first, then fragments)
/// 3. free-text fields in priority order (strict terms first, then fragments)
#[derive(Debug, Clone)]
pub struct MatchEngine {
    rules: KeywordRuleSet,
}

impl MatchEngine {
    pub fn new(rules: KeywordRuleSet) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &KeywordRuleSet {
        &self.rules
    }

    /// Find the rule that keeps `record`, without touching its state.
    pub fn find_match(&self, record: &Record) -> Option<MatchReason> {
        self.check_vocabulary(record)
            .or_else(|| {
                record
                    .keyword_fields()
                    .into_iter()
                    .find_map(|kf| self.check_keywords(kf))
            })
            .or_else(|| {
                record
                    .text_fields()
                    .into_iter()
                    .find_map(|tf| self.check_text(tf))
            })
    }

    /// Run the cascade and record the outcome on `record`.
    ///
    /// Returns whether the record is kept.
    pub fn evaluate(&self, record: &mut Record) -> bool {
        match self.find_match(record) {
            Some(reason) => {
                record.state.keep = true;
                record.state.filtered_on = reason.to_string();
                record.state.matched = Some(reason);
            }
            None => {
                record.state.keep = false;
                record.state.filtered_on.clear();
                record.state.matched = None;
            }
        }
        record.state.keep
    }

    fn check_vocabulary(&self, record: &Record) -> Option<MatchReason> {
        if let Some(topic) = record
            .edam_topics()
            .iter()
            .find(|t| self.rules.target_topics().contains(t.as_str()))
        {
            return Some(MatchReason::new(Field::EdamTopics, topic.as_str()));
        }
        record
            .edam_operations()
            .iter()
            .find(|op| self.rules.target_operations().contains(op.as_str()))
            .map(|op| MatchReason::new(Field::EdamOperations, op.as_str()))
    }

    fn check_keywords(&self, keywords: KeywordField<'_>) -> Option<MatchReason> {
        if let Some(term) = keywords
            .terms
            .iter()
            .find(|t| self.rules.is_strict_term(t))
        {
            return Some(MatchReason::new(keywords.field, term.as_str()));
        }

        keywords.terms.iter().find_map(|term| {
            let lower = term.to_lowercase();
            self.rules.fragment_patterns().iter().find_map(|pattern| {
                pattern
                    .find_iter(&lower)
                    .find(|m| !m.as_str().is_empty())
                    .map(|m| MatchReason::new(keywords.field, m.as_str()))
            })
        })
    }

    fn check_text(&self, text: TextField<'_>) -> Option<MatchReason> {
        if text.content.trim().is_empty() {
            return None;
        }

        if let Some(strict) = self
            .rules
            .strict_terms()
            .iter()
            .find(|s| s.is_found_in(text.content))
        {
            return Some(MatchReason::new(text.field, strict.term.as_str()));
        }

        let lower = text.content.to_lowercase();
        self.rules.fragment_patterns().iter().find_map(|pattern| {
            pattern
                .find_iter(&lower)
                .filter_map(|m| first_token(m.as_str()))
                .next()
                .map(|token| MatchReason::new(text.field, token))
        })
    }
}

/// First whitespace token of a match, without trailing punctuation.
fn first_token(matched: &str) -> Option<String> {
    let token = matched.split_whitespace().next()?;
    let token = TRAILING_PUNCTUATION.replace(token, "");
    if token.is_empty() {
        None
    } else {
        Some(token.into_owned())
    }
}

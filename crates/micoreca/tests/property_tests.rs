//! Property-based tests for the matching cascade.
//!
//! Property-based tests verify:
//! 1. **No panics**: rule compilation and evaluation never crash on any input
//! 2. **Determinism**: the same record always gets the same decision
//! 3. **Invariants**: `filtered_on` is set exactly when a rule matched
//!
//! # Running Property Tests
//!
//! ```bash
//! PROPTEST_CASES=10000 cargo test -p micoreca --test property_tests
//! ```

use proptest::prelude::*;

use micoreca::record::{Recipe, Tool, Workflow};
use micoreca::{FilterLevel, KeywordConfig, KeywordRuleSet, MatchEngine, Record};

// =============================================================================
// Test Strategies
// =============================================================================

/// Free text, including punctuation and regex metacharacters.
fn free_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 .,;()?!*+\\-]{0,80}"
}

/// Short upper-case words usable as acronyms.
fn acronym() -> impl Strategy<Value = String> {
    "[A-Z]{2,6}"
}

fn keyword() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z]{3,10}",
        "[a-z]{3,8}\\.\\*",
        "[A-Z]{2,5}",
        // Not always a valid regex.
        "[a-z(\\[]{1,6}",
    ]
}

fn rules() -> impl Strategy<Value = KeywordRuleSet> {
    (
        prop::collection::vec("[A-Z][a-z]{3,12}", 0..4),
        prop::collection::vec(keyword(), 0..6),
        prop::collection::vec(acronym(), 0..4),
    )
        .prop_map(|(topics, keywords, acronyms)| {
            let config = KeywordConfig::new()
                .with_topics(topics)
                .with_keywords(keywords)
                .with_acronyms(acronyms);
            KeywordRuleSet::compile(&config).expect("literal acronyms always compile")
        })
}

fn record() -> impl Strategy<Value = Record> {
    prop_oneof![
        (
            free_text(),
            free_text(),
            prop::collection::vec("[A-Za-z ]{1,12}", 0..4),
            prop::collection::vec("[A-Z][a-z]{3,12}", 0..3),
        )
            .prop_map(|(name, description, tags, topics)| {
                Workflow::new("https://workflowhub.eu/workflows/1", name)
                    .with_description(description)
                    .with_tags(tags)
                    .with_topics(topics)
                    .into()
            }),
        (free_text(), free_text()).prop_map(|(description, summary)| {
            Recipe::new("pkg")
                .with_description(description)
                .with_summary(summary)
                .into()
        }),
        (
            free_text(),
            free_text(),
            prop::collection::vec("[A-Za-z ]{1,12}", 0..4),
        )
            .prop_map(|(biotools, galaxy, keywords)| {
                Tool::new("tool")
                    .with_biotools_description(biotools)
                    .with_galaxy_description(galaxy)
                    .with_keywords(keywords)
                    .into()
            }),
    ]
}

// =============================================================================
// Cascade invariants
// =============================================================================

proptest! {
    #[test]
    fn evaluation_never_panics(rules in rules(), mut record in record()) {
        let engine = MatchEngine::new(rules);
        engine.evaluate(&mut record);
    }

    #[test]
    fn evaluation_is_idempotent(rules in rules(), mut record in record()) {
        let engine = MatchEngine::new(rules);
        engine.evaluate(&mut record);
        let first = record.state.clone();
        engine.evaluate(&mut record);
        prop_assert_eq!(record.state, first);
    }

    #[test]
    fn filtered_on_set_iff_kept(rules in rules(), mut record in record()) {
        let engine = MatchEngine::new(rules);
        let kept = engine.evaluate(&mut record);

        prop_assert_eq!(kept, !record.filtered_on().is_empty());
        prop_assert_eq!(kept, record.matched().is_some());
        if let Some(reason) = record.matched() {
            prop_assert_eq!(record.filtered_on(), reason.to_string());
            prop_assert!(!reason.value.is_empty());
        }
    }

    #[test]
    fn topic_match_always_wins(rules in rules(), record in record()) {
        let engine = MatchEngine::new(rules);
        let has_target_topic = record
            .edam_topics()
            .iter()
            .any(|t| engine.rules().target_topics().contains(t.as_str()));

        if has_target_topic {
            let reason = engine.find_match(&record).unwrap();
            prop_assert_eq!(reason.level(), FilterLevel::Vocabulary);
        }
    }

    #[test]
    fn strict_term_ignores_embedded_words(term in acronym(), prefix in "[A-Z]{1,3}", suffix in "[A-Z]{1,3}") {
        let config = KeywordConfig::new().with_acronyms([term.clone()]);
        let rules = KeywordRuleSet::compile(&config).unwrap();
        let strict = &rules.strict_terms()[0];
        let embedded = format!("{}{}{}", prefix, term, suffix);
        let spaced = format!("{} {} {}", prefix, term, suffix);

        prop_assert!(!strict.is_found_in(&embedded));
        prop_assert!(strict.is_found_in(&spaced));
    }
}

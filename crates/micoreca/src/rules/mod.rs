//! Filtering criteria: the keyword configuration document and its compiled form.
//!
//! # Example
//!
//! ```
//! use micoreca::rules::{KeywordConfig, KeywordRuleSet};
//!
//! let config = KeywordConfig::new()
//!     .with_topics(["Metagenomics"])
//!     .with_keywords(["MAGS", "metage.*"]);
//! let rules = KeywordRuleSet::compile(&config).unwrap();
//!
//! assert!(rules.is_strict_term("mags"));
//! assert_eq!(rules.fragment_patterns().len(), 2);
//! ```

mod config;
mod ruleset;

pub use config::{EdamTerms, KeywordConfig};
pub use ruleset::{KeywordRuleSet, RuleSetSummary, StrictTerm};

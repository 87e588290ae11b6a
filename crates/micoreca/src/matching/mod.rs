//! Rule evaluation against records.

mod engine;

pub use engine::MatchEngine;

//! Batch filtering and curation of records.

use std::fmt::Write as _;

use log::{debug, info};
use serde::Serialize;

use crate::curation::CurationStatus;
use crate::matching::MatchEngine;
use crate::record::{FilterLevel, Record, RecordKind};

/// Counters of a filtering run, bucketed by the check that kept each record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FilterCounts {
    pub total: usize,
    pub validated_filter_1: usize,
    pub validated_filter_2: usize,
    pub validated_filter_3: usize,
    pub kept_by_curation: usize,
    pub did_not_pass_any: usize,
}

impl FilterCounts {
    pub fn kept(&self) -> usize {
        self.validated_filter_1
            + self.validated_filter_2
            + self.validated_filter_3
            + self.kept_by_curation
    }

    fn record_level(&mut self, level: FilterLevel) {
        match level {
            FilterLevel::Vocabulary => self.validated_filter_1 += 1,
            FilterLevel::KeywordList => self.validated_filter_2 += 1,
            FilterLevel::FreeText => self.validated_filter_3 += 1,
        }
    }

    /// Plain-text counts report.
    pub fn report(&self, kind: RecordKind) -> String {
        let rule = "=".repeat(40);
        let sub = "-".repeat(25);
        let mut out = String::new();

        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, " {} FILTERING REPORT", kind.plural().to_uppercase());
        let _ = writeln!(out, "{}\n", rule);
        let _ = writeln!(out, "Total {} analyzed : {}", kind.plural(), self.total);
        let _ = writeln!(out, "Total {} kept : {}", kind.plural(), self.kept());
        let _ = writeln!(out, "Total {} discarded : {}\n", kind.plural(), self.did_not_pass_any);
        let _ = writeln!(out, "{}", sub);
        let _ = writeln!(out, "{} kept by criterion (Stop at first match):", capitalize(kind.plural()));
        let _ = writeln!(out, "{}", sub);
        for (level, count) in [
            (FilterLevel::Vocabulary, self.validated_filter_1),
            (FilterLevel::KeywordList, self.validated_filter_2),
            (FilterLevel::FreeText, self.validated_filter_3),
        ] {
            let _ = writeln!(
                out,
                " {}. Validated by Filter {} ({}) : {}",
                level.number(),
                level.number(),
                level.label(),
                count
            );
        }
        let _ = writeln!(out, " Kept by manual curation : {}\n", self.kept_by_curation);
        let _ = writeln!(
            out,
            "{} that failed ANY filter : {}",
            capitalize(kind.plural()),
            self.did_not_pass_any
        );
        out
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Result of [`Collection::filter`].
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    pub kind: RecordKind,
    pub kept: Vec<Record>,
    pub discarded: Vec<Record>,
    pub counts: FilterCounts,
}

/// Result of [`Collection::curate`].
#[derive(Debug, Clone)]
pub struct CurateOutcome {
    pub kind: RecordKind,
    pub kept: Vec<Record>,
    pub dropped: Vec<Record>,
}

/// An ordered batch of records of one kind.
#[derive(Debug, Clone)]
pub struct Collection {
    kind: RecordKind,
    records: Vec<Record>,
}

impl Collection {
    pub fn new(kind: RecordKind) -> Self {
        Self {
            kind,
            records: Vec::new(),
        }
    }

    pub fn from_records(kind: RecordKind, records: Vec<Record>) -> Self {
        Self { kind, records }
    }

    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Apply curator decisions, then the engine, to every record in order.
    pub fn filter(self, engine: &MatchEngine, status: &CurationStatus) -> FilterOutcome {
        let mut counts = FilterCounts::default();
        let mut kept = Vec::new();
        let mut discarded = Vec::new();

        for mut record in self.records {
            counts.total += 1;

            if status.apply(&mut record) {
                debug!("{} kept by curation", record.id());
                counts.kept_by_curation += 1;
                kept.push(record);
                continue;
            }

            if engine.evaluate(&mut record) {
                if let Some(level) = record.matched().map(|m| m.level()) {
                    counts.record_level(level);
                }
                debug!("{} kept: {}", record.id(), record.filtered_on());
                kept.push(record);
            } else {
                counts.did_not_pass_any += 1;
                discarded.push(record);
            }
        }

        info!(
            "Filtered {} {}: {} kept, {} discarded",
            counts.total,
            self.kind.plural(),
            kept.len(),
            discarded.len()
        );

        FilterOutcome {
            kind: self.kind,
            kept,
            discarded,
            counts,
        }
    }

    /// Apply curator decisions in both directions and keep only the records
    /// marked to keep.
    pub fn curate(self, status: &CurationStatus) -> CurateOutcome {
        let (kept, dropped): (Vec<_>, Vec<_>) = self
            .records
            .into_iter()
            .map(|mut record| {
                status.curate(&mut record);
                record
            })
            .partition(|record| record.keep());

        info!(
            "Curated {} {}: {} kept, {} dropped",
            kept.len() + dropped.len(),
            self.kind.plural(),
            kept.len(),
            dropped.len()
        );

        CurateOutcome {
            kind: self.kind,
            kept,
            dropped,
        }
    }
}

//! Prior human decisions, read from the curator-edited status table.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{MicorecaError, Result};
use crate::record::{normalize_date, Record, RecordKind, UNSET_CURATION_DATE};

/// Reason recorded when a curator keeps a record without a stated match.
pub const MANUAL_CURATION: &str = "manual curation";

const KEEP_COLUMNS: &[&str] = &["To keep", "keep", "to_keep"];
const DATE_COLUMNS: &[&str] = &["Curation date", "curation_date"];
const FILTERED_COLUMNS: &[&str] = &["Filtered on", "filtered_on"];

/// One curator decision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub keep: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curation_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filtered_on: Option<String>,
}

impl StatusEntry {
    pub fn keep() -> Self {
        Self {
            keep: true,
            ..Default::default()
        }
    }

    pub fn discard() -> Self {
        Self::default()
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.curation_date = Some(date.into());
        self
    }

    pub fn with_filtered_on(mut self, filtered_on: impl Into<String>) -> Self {
        self.filtered_on = Some(filtered_on.into());
        self
    }
}

/// Mapping from record identity to the curator's decision.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurationStatus {
    entries: IndexMap<String, StatusEntry>,
}

impl CurationStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, entry: StatusEntry) {
        self.entries.insert(id.into(), entry);
    }

    pub fn with_entry(mut self, id: impl Into<String>, entry: StatusEntry) -> Self {
        self.insert(id, entry);
        self
    }

    pub fn get(&self, id: &str) -> Option<&StatusEntry> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StatusEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Load a status table. Never fails: a missing or unreadable table is an
    /// empty mapping and a warning.
    pub fn load(path: impl AsRef<Path>, kind: RecordKind) -> Self {
        let path = path.as_ref();
        if !path.is_file() {
            warn!(
                "No curation status found at '{}'; every record will be evaluated",
                path.display()
            );
            return Self::default();
        }

        let loaded = File::open(path)
            .map_err(|e| MicorecaError::io(path, e))
            .and_then(|file| Self::from_reader(file, kind));
        match loaded {
            Ok(status) => {
                debug!("Loaded {} curation decisions from {}", status.len(), path.display());
                status
            }
            Err(e) => {
                warn!("Ignoring curation status '{}': {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse a tab-separated status table.
    ///
    /// The identity column depends on `kind`; header lookup is
    /// case-insensitive. Rows with an empty identity or an unreadable keep
    /// flag are skipped.
    pub fn from_reader<R: Read>(reader: R, kind: RecordKind) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .flexible(true)
            .from_reader(reader);
        let headers = reader.headers()?.clone();

        let id_col = find_column(&headers, kind.identity_columns());
        let keep_col = find_column(&headers, KEEP_COLUMNS);
        let (Some(id_col), Some(keep_col)) = (id_col, keep_col) else {
            warn!(
                "Curation status has no '{}' or '{}' column; ignoring it",
                kind.identity_column(),
                KEEP_COLUMNS[0]
            );
            return Ok(Self::default());
        };
        let date_col = find_column(&headers, DATE_COLUMNS);
        let filtered_col = find_column(&headers, FILTERED_COLUMNS);

        let mut status = Self::default();
        for (line, row) in reader.records().enumerate() {
            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    warn!("Skipping unreadable status row {}: {}", line + 2, e);
                    continue;
                }
            };
            let id = row.get(id_col).unwrap_or("").trim();
            if id.is_empty() {
                continue;
            }
            let raw_keep = row.get(keep_col).unwrap_or("");
            let Some(keep) = parse_flag(raw_keep) else {
                warn!(
                    "Skipping status row for '{}': unreadable keep flag '{}'",
                    id, raw_keep
                );
                continue;
            };

            let curation_date = date_col
                .and_then(|c| row.get(c))
                .and_then(|raw| present(raw))
                .filter(|d| d != UNSET_CURATION_DATE)
                .map(|d| normalize_date(&d).unwrap_or(d));
            let filtered_on = filtered_col.and_then(|c| row.get(c)).and_then(present);

            status.insert(
                id,
                StatusEntry {
                    keep,
                    curation_date,
                    filtered_on,
                },
            );
        }
        Ok(status)
    }

    /// Apply the prior decision before automatic evaluation.
    ///
    /// A stored `keep=true` settles the record (returns `true`) and keeps its
    /// existing match reason. Otherwise only the curation date is copied and
    /// the record still has to be evaluated.
    pub fn apply(&self, record: &mut Record) -> bool {
        let Some(entry) = self.entries.get(record.id()) else {
            return false;
        };
        if let Some(date) = &entry.curation_date {
            record.state.curation_date = date.clone();
        }
        if !entry.keep {
            return false;
        }

        record.state.keep = true;
        if let Some(filtered_on) = &entry.filtered_on {
            record.state.filtered_on = filtered_on.clone();
        } else if record.state.filtered_on.is_empty() {
            record.state.filtered_on = MANUAL_CURATION.to_string();
        }
        true
    }

    /// Take the curator's decision in both directions. Returns the final keep flag.
    pub fn curate(&self, record: &mut Record) -> bool {
        if let Some(entry) = self.entries.get(record.id()) {
            record.state.keep = entry.keep;
            if let Some(date) = &entry.curation_date {
                record.state.curation_date = date.clone();
            }
            if let Some(filtered_on) = &entry.filtered_on {
                record.state.filtered_on = filtered_on.clone();
            }
        }
        record.state.keep
    }
}

fn find_column(headers: &csv::StringRecord, candidates: &[&str]) -> Option<usize> {
    candidates.iter().find_map(|candidate| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(candidate))
    })
}

/// Cell value, or `None` for blanks and the `N/A` sentinel.
fn present(raw: &str) -> Option<String> {
    let value = raw.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("N/A") {
        None
    } else {
        Some(value.to_string())
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => Some(true),
        "false" | "0" | "no" | "n" | "" => Some(false),
        _ => None,
    }
}

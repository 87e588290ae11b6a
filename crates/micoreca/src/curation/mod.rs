//! Human curation decisions.
//!
//! Curators review the status table written after each filtering run and
//! flip the `To keep` column. The table is read back on the next run:
//!
//! ```text
//! Link                               Name          To keep   Curation date
//! https://workflowhub.eu/workflows/1 MAGs building True      2024-02-01
//! https://workflowhub.eu/workflows/2 RNA-seq       False     2024-02-01
//! ```
//!
//! A stored `keep=true` always wins over automatic evaluation.

mod status;

pub use status::{CurationStatus, StatusEntry, MANUAL_CURATION};

//! Point log persistence.
//!
//! [`PointLogStore`] is the only way the recorder and the analyzers reach
//! stored rallies. [`MemoryStore`] keeps rows in memory, [`CsvStore`] keeps
//! them in a CSV file with the export column layout.

mod csv_store;
mod memory;

pub use csv_store::CsvStore;
pub use memory::MemoryStore;

use anyhow::Result;

use crate::model::RallyRecord;

/// Rally rows keyed by (match, set, rally, phase).
pub trait PointLogStore {
    /// Inserts the row, or replaces the row with the same key.
    fn save(&mut self, rally: &RallyRecord) -> Result<()>;

    /// All rows of a match, or of one set of it, possibly several phases per rally.
    fn query(&self, match_id: i64, set_no: Option<u8>) -> Result<Vec<RallyRecord>>;

    /// Removes the most recent rally of a set, returning its highest-phase row.
    fn delete_last(&mut self, match_id: i64, set_no: u8) -> Result<Option<RallyRecord>>;
}

/// Inserts or replaces `rally` in `rows`; returns `true` when a row was replaced.
pub(crate) fn upsert(rows: &mut Vec<RallyRecord>, rally: &RallyRecord) -> bool {
    let key = rally.key();
    match rows.iter_mut().find(|r| r.key() == key) {
        Some(existing) => {
            *existing = rally.clone();
            true
        }
        None => {
            rows.push(rally.clone());
            false
        }
    }
}

/// Removes every phase of the highest rally number of a set.
pub(crate) fn remove_last(
    rows: &mut Vec<RallyRecord>,
    match_id: i64,
    set_no: u8,
) -> Option<RallyRecord> {
    let in_set = |r: &RallyRecord| r.match_id == match_id && r.set_no == set_no;
    let last_no = rows.iter().filter(|r| in_set(r)).map(|r| r.rally_no).max()?;

    let mut removed: Vec<RallyRecord> = Vec::new();
    rows.retain(|r| {
        if in_set(r) && r.rally_no == last_no {
            removed.push(r.clone());
            false
        } else {
            true
        }
    });
    removed.into_iter().max_by_key(|r| r.phase)
}

use anyhow::Result;

use super::{PointLogStore, remove_last, upsert};
use crate::model::RallyRecord;

/// In-memory point log, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    rows: Vec<RallyRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<RallyRecord>) -> Self {
        Self { rows }
    }

    /// Every stored row across matches.
    pub fn rows(&self) -> &[RallyRecord] {
        &self.rows
    }
}

impl PointLogStore for MemoryStore {
    fn save(&mut self, rally: &RallyRecord) -> Result<()> {
        upsert(&mut self.rows, rally);
        Ok(())
    }

    fn query(&self, match_id: i64, set_no: Option<u8>) -> Result<Vec<RallyRecord>> {
        Ok(self
            .rows
            .iter()
            .filter(|r| r.match_id == match_id && set_no.is_none_or(|s| r.set_no == s))
            .cloned()
            .collect())
    }

    fn delete_last(&mut self, match_id: i64, set_no: u8) -> Result<Option<RallyRecord>> {
        Ok(remove_last(&mut self.rows, match_id, set_no))
    }
}

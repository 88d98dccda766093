use anyhow::{Context, Result};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{PointLogStore, remove_last, upsert};
use crate::model::RallyRecord;
use crate::output::{append_record, write_records};

/// Point log kept in a single CSV file, one row per stored rally phase.
///
/// New keys are appended; replacing or deleting a row rewrites the file.
#[derive(Debug, Clone)]
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every row in the file, in file order. A missing file is an empty log.
    pub fn load_all(&self) -> Result<Vec<RallyRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)
            .with_context(|| format!("failed to open point log {}", self.path.display()))?;
        let mut rdr = csv::Reader::from_reader(file);
        let mut rows = Vec::new();

        for result in rdr.deserialize() {
            let record: RallyRecord = result?;
            rows.push(record);
        }

        Ok(rows)
    }
}

impl PointLogStore for CsvStore {
    fn save(&mut self, rally: &RallyRecord) -> Result<()> {
        let mut rows = self.load_all()?;
        if upsert(&mut rows, rally) {
            debug!(path = %self.path.display(), rally_no = rally.rally_no, "Rewriting point log");
            write_records(&self.path, &rows)
        } else {
            append_record(&self.path, rally)
        }
    }

    fn query(&self, match_id: i64, set_no: Option<u8>) -> Result<Vec<RallyRecord>> {
        Ok(self
            .load_all()?
            .into_iter()
            .filter(|r| r.match_id == match_id && set_no.is_none_or(|s| r.set_no == s))
            .collect())
    }

    fn delete_last(&mut self, match_id: i64, set_no: u8) -> Result<Option<RallyRecord>> {
        let mut rows = self.load_all()?;
        let removed = remove_last(&mut rows, match_id, set_no);
        if removed.is_some() {
            write_records(&self.path, &rows)?;
        }
        Ok(removed)
    }
}

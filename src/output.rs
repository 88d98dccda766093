//! Output formatting and persistence for rally rows and reports.
//!
//! Supports JSON reports, CSV append/rewrite and the canonical CSV export
//! (optionally gzip-compressed).

use anyhow::{Context, Result};
use csv::WriterBuilder;
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::model::RallyRecord;

/// Writes a report as pretty JSON to `path`, or to stdout when no path is given.
pub fn write_json(path: Option<&Path>, value: &impl Serialize) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match path {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), "Report written");
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// Appends a [`RallyRecord`] as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_record(path: &Path, rally: &RallyRecord) -> Result<()> {
    let file_exists = path.exists();
    debug!(path = %path.display(), file_exists, "Appending CSV record");

    let file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    writer.serialize(rally)?;
    writer.flush()?;

    Ok(())
}

/// Replaces the content of a CSV file with `rows`.
pub fn write_records(path: &Path, rows: &[RallyRecord]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = WriterBuilder::new().from_writer(file);
    for rally in rows {
        writer.serialize(rally)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes one CSV row per rally in the point log column order.
///
/// With `gzip` the output is compressed and `.gz` is appended to the file
/// name. Returns the path actually written.
pub fn export_rallies(path: &Path, rallies: &[RallyRecord], gzip: bool) -> Result<PathBuf> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    for rally in rallies {
        writer.serialize(rally)?;
    }
    let csv_bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("failed to finish CSV export: {}", e))?;

    let (body, target) = if gzip {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&csv_bytes)?;
        let compressed = encoder.finish()?;

        let mut name = path.as_os_str().to_owned();
        name.push(".gz");
        (compressed, PathBuf::from(name))
    } else {
        (csv_bytes, path.to_path_buf())
    };

    std::fs::write(&target, &body)
        .with_context(|| format!("failed to write export {}", target.display()))?;
    info!(path = %target.display(), rallies = rallies.len(), gzip, "Export written");

    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Reason, Side};
    use flate2::read::GzDecoder;
    use std::env;
    use std::fs;
    use std::io::Read;

    fn temp_path(name: &str) -> PathBuf {
        env::temp_dir().join(name)
    }

    #[test]
    fn test_append_record_writes_header_once() {
        let path = temp_path("volley_scout_test_header.csv");
        let _ = fs::remove_file(&path);

        append_record(&path, &RallyRecord::new(1, 1, 1)).unwrap();
        append_record(&path, &RallyRecord::new(1, 1, 2)).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let header_count = content.lines().filter(|l| l.starts_with("match_id")).count();
        assert_eq!(header_count, 1);
        assert_eq!(content.lines().count(), 3);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_export_column_order() {
        let path = temp_path("volley_scout_test_export.csv");
        let rally = RallyRecord {
            serve_side: Some(Side::Fora),
            point_won_by: Some(Side::Casa),
            reason: Some(Reason::Se),
            ..RallyRecord::new(3, 2, 7)
        };

        let written = export_rallies(&path, &[rally], false).unwrap();
        assert_eq!(written, path);

        let content = fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with(
            "match_id,set_no,rally_no,phase,serve_side,serve_rot,recv_side,recv_rot,point_won_by,reason,s_player_id"
        ));
        assert!(header.ends_with("d_player_id,d_no,d_code,fault_player_id"));
        assert!(lines.next().unwrap().starts_with("3,2,7,1,FORA,,,,CASA,SE,"));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_export_gzip_roundtrip() {
        let path = temp_path("volley_scout_test_export_gz.csv");
        let written = export_rallies(&path, &[RallyRecord::new(1, 1, 1)], true).unwrap();
        assert!(written.to_string_lossy().ends_with(".csv.gz"));

        let mut decoder = GzDecoder::new(File::open(&written).unwrap());
        let mut content = String::new();
        decoder.read_to_string(&mut content).unwrap();
        assert!(content.starts_with("match_id,"));

        fs::remove_file(&written).unwrap();
    }

    #[test]
    fn test_write_json_to_file() {
        let path = temp_path("volley_scout_test_report.json");
        write_json(Some(&path), &RallyRecord::new(2, 1, 1)).unwrap();

        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["match_id"], 2);
        assert_eq!(value["phase"], 1);

        fs::remove_file(&path).unwrap();
    }
}

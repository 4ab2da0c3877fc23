//! Report sinks: CSV file and console text

use chrono::Local;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{CheckError, CheckResult};
use crate::models::Report;

/// Separator character for console output
const RULE: char = '—';

/// Check that `dir` exists and is a directory
pub fn validate_output_dir(dir: &Path) -> CheckResult<()> {
    if !dir.exists() {
        return Err(CheckError::InvalidOutputDir(
            "The provided path don't exists".to_string(),
        ));
    }
    if !dir.is_dir() {
        return Err(CheckError::InvalidOutputDir(
            "The provided path is not a directory".to_string(),
        ));
    }
    Ok(())
}

/// File name for a report generated now
pub fn report_file_name() -> String {
    format!("report_{}.csv", Local::now().format("%d-%m-%Y_%H-%M-%S"))
}

/// Write `report` as CSV: one header row, then one row per entry
pub fn write_csv_to<W: io::Write>(report: &Report, writer: W) -> CheckResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(report.columns())?;
    for entry in &report.entries {
        wtr.write_record(report.row(entry))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write `report` to a timestamped CSV file in `dir` and return its path
pub fn write_csv(report: &Report, dir: &Path) -> CheckResult<PathBuf> {
    validate_output_dir(dir)?;

    let path = dir.canonicalize()?.join(report_file_name());
    let file = std::fs::File::create(&path)?;
    write_csv_to(report, file)?;

    info!("Wrote {} rows to {}", report.len(), path.display());
    Ok(path)
}

/// Render `report` as `key: value` blocks separated by a rule `width` wide
pub fn render_console(report: &Report, width: usize) -> String {
    let columns = report.columns();
    let rule: String = std::iter::repeat(RULE).take(width).collect();

    let mut out = String::new();
    for entry in &report.entries {
        for (key, value) in columns.iter().zip(report.row(entry)) {
            out.push_str(&format!("{}: {}\n", key, value));
        }
        out.push_str(&rule);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Expiry, FieldValue, ReportEntry};
    use tempfile::TempDir;

    fn report(include_notes: bool) -> Report {
        Report {
            entries: vec![
                ReportEntry {
                    title: "Broken, badly".to_string(),
                    expire: Expiry::Broken(Some(FieldValue::Text("soon".to_string()))),
                    owner: None,
                    notes: None,
                },
                ReportEntry {
                    title: "Badge".to_string(),
                    expire: Expiry::Date("2023/11/14".to_string()),
                    owner: Some("L2 Support".to_string()),
                    notes: Some("line one\nline two".to_string()),
                },
            ],
            include_notes,
            warnings: Vec::new(),
        }
    }

    #[test]
    fn test_csv_rows() {
        let mut buf = Vec::new();
        write_csv_to(&report(false), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "title,expire,ID revalidation owner\n\"Broken, badly\",soon,\nBadge,2023/11/14,L2 Support\n"
        );
    }

    #[test]
    fn test_csv_with_notes_round_trips() {
        let mut buf = Vec::new();
        write_csv_to(&report(true), &mut buf).unwrap();

        let mut rdr = csv::Reader::from_reader(buf.as_slice());
        let headers = rdr.headers().unwrap().clone();
        assert_eq!(headers.iter().last(), Some("notes"));
        let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[1][3], "line one\nline two");
    }

    #[test]
    fn test_csv_empty_report_writes_header() {
        let mut buf = Vec::new();
        write_csv_to(&Report::default(), &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "title,expire,ID revalidation owner\n");
    }

    #[test]
    fn test_write_csv_creates_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_csv(&report(false), temp_dir.path()).unwrap();

        assert!(path.is_absolute());
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("report_") && name.ends_with(".csv"));
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 3);
    }

    #[test]
    fn test_validate_output_dir() {
        let temp_dir = TempDir::new().unwrap();
        assert!(validate_output_dir(temp_dir.path()).is_ok());

        let missing = temp_dir.path().join("missing");
        match validate_output_dir(&missing) {
            Err(CheckError::InvalidOutputDir(msg)) => assert_eq!(msg, "The provided path don't exists"),
            other => panic!("unexpected: {:?}", other),
        }

        let file = temp_dir.path().join("file.txt");
        std::fs::write(&file, "x").unwrap();
        match validate_output_dir(&file) {
            Err(CheckError::InvalidOutputDir(msg)) => {
                assert_eq!(msg, "The provided path is not a directory")
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_render_console() {
        let text = render_console(&report(false), 5);
        assert_eq!(
            text,
            "title: Broken, badly\nexpire: soon\nID revalidation owner: \n—————\n\
             title: Badge\nexpire: 2023/11/14\nID revalidation owner: L2 Support\n—————\n"
        );
    }
}

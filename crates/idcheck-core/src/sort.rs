//! Ordering of extracted records into report rows
//!
//! Records whose expiry is missing, not an integer, or outside the
//! calendar range go first in their input order. The rest follow,
//! stably sorted by ascending epoch and formatted as `YYYY/MM/DD` (UTC).

use chrono::{DateTime, Utc};

use crate::models::{Expiry, RecordSummary, ReportEntry};

/// Date format used in report rows
pub const DATE_FORMAT: &str = "%Y/%m/%d";

/// Format an epoch timestamp (seconds) as a UTC calendar date
pub fn format_epoch(epoch: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp(epoch, 0).map(|dt| dt.format(DATE_FORMAT).to_string())
}

/// Partition, sort, and format `records` into report rows
pub fn finalize(records: Vec<RecordSummary>) -> Vec<ReportEntry> {
    let mut broken = Vec::new();
    let mut dated = Vec::new();

    for record in records {
        let epoch = record.expiration.as_ref().and_then(|v| v.as_integer());
        match epoch.and_then(|e| format_epoch(e).map(|date| (e, date))) {
            Some((epoch, date)) => dated.push((epoch, date, record)),
            None => broken.push(entry(Expiry::Broken(record.expiration.clone()), record)),
        }
    }

    // sort_by_key is stable: equal expiries keep their input order
    dated.sort_by_key(|(epoch, _, _)| *epoch);

    broken
        .into_iter()
        .chain(
            dated
                .into_iter()
                .map(|(_, date, record)| entry(Expiry::Date(date), record)),
        )
        .collect()
}

fn entry(expire: Expiry, record: RecordSummary) -> ReportEntry {
    ReportEntry {
        title: record.title,
        expire,
        owner: record.owner,
        notes: record.notes,
    }
}

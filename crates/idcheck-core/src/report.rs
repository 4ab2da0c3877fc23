//! Report assembly: list, filter, fetch, extract, order
//!
//! Items are fetched strictly one at a time in filtered order. Any vault
//! client error aborts the whole report; extraction warnings do not.

use tracing::{debug, info};

use crate::client::VaultCli;
use crate::config::{CheckerConfig, FILTER_TAG};
use crate::error::CheckResult;
use crate::extract::{extract_summary, Diagnostics, Warning};
use crate::filter::filter_by_tag;
use crate::models::Report;
use crate::sort::finalize;

/// Progress hooks for report assembly. All hooks default to no-ops.
pub trait ReportObserver {
    /// Vault listing finished with `total` items
    fn on_listed(&mut self, _total: usize) {}

    /// Tag filtering kept `count` items
    fn on_filtered(&mut self, _count: usize) {}

    /// Item `index` (1-based) of `total` was fetched and extracted
    fn on_item(&mut self, _index: usize, _total: usize) {}

    /// A record did not match the expected format
    fn on_warning(&mut self, _warning: &Warning) {}
}

/// Observer that ignores every event
pub struct NoopObserver;

impl ReportObserver for NoopObserver {}

/// Collects warnings for the report while forwarding them to the observer
struct Forwarding<'a, O: ReportObserver + ?Sized> {
    observer: &'a mut O,
    warnings: Vec<Warning>,
}

impl<O: ReportObserver + ?Sized> Diagnostics for Forwarding<'_, O> {
    fn warn(&mut self, warning: Warning) {
        self.observer.on_warning(&warning);
        self.warnings.push(warning);
    }
}

/// Build the expiry report for `config.vault`
pub async fn build_report<C, O>(
    client: &C,
    config: &CheckerConfig,
    include_notes: bool,
    observer: &mut O,
) -> CheckResult<Report>
where
    C: VaultCli,
    O: ReportObserver + ?Sized,
{
    info!("Listing items in vault '{}'", config.vault);
    let items = client.list_items(&config.vault).await?;
    observer.on_listed(items.len());

    let uuids = filter_by_tag(&items, FILTER_TAG);
    info!("{} of {} items tagged '{}'", uuids.len(), items.len(), FILTER_TAG);
    observer.on_filtered(uuids.len());

    let total = uuids.len();
    let mut diagnostics = Forwarding {
        observer: &mut *observer,
        warnings: Vec::new(),
    };
    let mut summaries = Vec::with_capacity(total);

    for (i, uuid) in uuids.iter().enumerate() {
        debug!("Fetching item {}", uuid);
        let record = client.get_item(uuid).await?;
        summaries.push(extract_summary(&record, config, include_notes, &mut diagnostics));
        diagnostics.observer.on_item(i + 1, total);
    }

    let warnings = diagnostics.warnings;
    Ok(Report {
        entries: finalize(summaries),
        include_notes,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CheckError;
    use crate::models::{Expiry, RawRecord};
    use serde_json::json;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// In-memory vault keyed by uuid
    struct FakeVault {
        listing: Vec<RawRecord>,
        items: HashMap<String, RawRecord>,
        fail_on: Option<String>,
        fetched: RefCell<Vec<String>>,
    }

    impl FakeVault {
        fn new(items: Vec<serde_json::Value>) -> Self {
            let items: Vec<RawRecord> = items
                .into_iter()
                .map(|v| serde_json::from_value(v).unwrap())
                .collect();
            let listing = items
                .iter()
                .map(|item| RawRecord {
                    uuid: item.uuid.clone(),
                    overview: item.overview.clone(),
                    ..RawRecord::default()
                })
                .collect();
            Self {
                listing,
                items: items.into_iter().map(|i| (i.uuid.clone(), i)).collect(),
                fail_on: None,
                fetched: RefCell::new(Vec::new()),
            }
        }
    }

    impl VaultCli for FakeVault {
        async fn list_items(&self, vault: &str) -> CheckResult<Vec<RawRecord>> {
            assert_eq!(vault, "SE&TS Shared OPs");
            Ok(self.listing.clone())
        }

        async fn get_item(&self, uuid: &str) -> CheckResult<RawRecord> {
            self.fetched.borrow_mut().push(uuid.to_string());
            if self.fail_on.as_deref() == Some(uuid) {
                return Err(CheckError::NotSignedIn);
            }
            self.items
                .get(uuid)
                .cloned()
                .ok_or_else(|| CheckError::CommandFailed(format!("no item {}", uuid)))
        }
    }

    #[derive(Default)]
    struct Recorder {
        listed: usize,
        filtered: usize,
        progress: Vec<(usize, usize)>,
        warnings: Vec<String>,
    }

    impl ReportObserver for Recorder {
        fn on_listed(&mut self, total: usize) {
            self.listed = total;
        }
        fn on_filtered(&mut self, count: usize) {
            self.filtered = count;
        }
        fn on_item(&mut self, index: usize, total: usize) {
            self.progress.push((index, total));
        }
        fn on_warning(&mut self, warning: &Warning) {
            self.warnings.push(warning.title.clone());
        }
    }

    fn id(uuid: &str, title: &str, tags: &[&str], expiry: serde_json::Value) -> serde_json::Value {
        json!({
            "uuid": uuid,
            "overview": { "title": title, "tags": tags },
            "details": {
                "notesPlain": format!("notes for {}", title),
                "sections": [{ "title": "Expiry", "fields": [{ "t": "Expiry date", "v": expiry }] }]
            }
        })
    }

    fn vault() -> FakeVault {
        FakeVault::new(vec![
            id("1", "Late", &["IDChecker"], json!(1800000000)),
            id("2", "Untagged", &["other"], json!(1)),
            json!({
                "uuid": "3",
                "overview": { "title": "Broken", "tags": ["IDChecker"] },
                "details": { "sections": [] }
            }),
            id("4", "Early", &["IDChecker", "x"], json!(1700000000)),
        ])
    }

    #[tokio::test]
    async fn test_builds_ordered_report() {
        let vault = vault();
        let mut recorder = Recorder::default();
        let config = CheckerConfig::default();

        let report = build_report(&vault, &config, false, &mut recorder).await.unwrap();

        let titles: Vec<_> = report.entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Broken", "Early", "Late"]);
        assert_eq!(report.entries[1].expire, Expiry::Date("2023/11/14".to_string()));
        assert!(report.entries.iter().all(|e| e.notes.is_none()));
        assert!(!report.include_notes);

        assert_eq!(*vault.fetched.borrow(), vec!["1", "3", "4"]);
        assert_eq!(recorder.listed, 4);
        assert_eq!(recorder.filtered, 3);
        assert_eq!(recorder.progress, vec![(1, 3), (2, 3), (3, 3)]);
        assert_eq!(recorder.warnings, vec!["Broken"]);
        assert_eq!(report.warnings.len(), 1);
    }

    #[tokio::test]
    async fn test_notes_included_on_request() {
        let report = build_report(&vault(), &CheckerConfig::default(), true, &mut NoopObserver)
            .await
            .unwrap();

        assert!(report.include_notes);
        assert_eq!(report.entries[1].notes.as_deref(), Some("notes for Early"));
        assert_eq!(report.entries[0].notes, None);
    }

    #[tokio::test]
    async fn test_fetch_failure_aborts() {
        let mut vault = vault();
        vault.fail_on = Some("3".to_string());

        let result = build_report(&vault, &CheckerConfig::default(), false, &mut NoopObserver).await;
        assert!(matches!(result, Err(CheckError::NotSignedIn)));
        assert_eq!(*vault.fetched.borrow(), vec!["1", "3"]);
    }

    #[tokio::test]
    async fn test_no_tagged_items() {
        let vault = FakeVault::new(vec![id("1", "x", &["other"], json!(1))]);
        let report = build_report(&vault, &CheckerConfig::default(), false, &mut NoopObserver)
            .await
            .unwrap();
        assert!(report.is_empty());
        assert!(vault.fetched.borrow().is_empty());
    }
}

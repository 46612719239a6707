use crate::domain::model::{Credential, Progress, ResultSet};
use crate::domain::ports::{GstinLookup, ProgressReporter};
use std::collections::HashSet;

/// Trims identifiers, drops blanks and collapses duplicates (compared
/// case-insensitively) keeping the first spelling in first-appearance order.
pub fn unique_identifiers<I, S>(identifiers: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    identifiers
        .into_iter()
        .filter_map(|raw| {
            let trimmed = raw.as_ref().trim();
            if trimmed.is_empty() || !seen.insert(trimmed.to_uppercase()) {
                return None;
            }
            Some(trimmed.to_string())
        })
        .collect()
}

pub fn status_message(gstin: &str, position: usize, total: usize) -> String {
    format!("Validating {} ({}/{})", gstin, position, total)
}

/// Runs one lookup per unique identifier, one at a time.
pub struct BatchRunner<'a, L: GstinLookup + ?Sized> {
    lookup: &'a L,
    reporter: &'a dyn ProgressReporter,
}

impl<'a, L: GstinLookup + ?Sized> BatchRunner<'a, L> {
    pub fn new(lookup: &'a L, reporter: &'a dyn ProgressReporter) -> Self {
        Self { lookup, reporter }
    }

    pub async fn run<I, S>(&self, credential: &Credential, identifiers: I) -> ResultSet
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let gstins = unique_identifiers(identifiers);
        let total = gstins.len();
        let mut results = ResultSet::new();

        if total == 0 {
            tracing::warn!("No GSTINs to validate");
            self.reporter.on_finished(&results);
            return results;
        }

        tracing::info!("Found {} unique GSTINs for validation", total);

        // 依序查詢，不併發：查詢服務沒有併發或限流保證
        for (index, gstin) in gstins.iter().enumerate() {
            let position = index + 1;
            self.reporter.on_lookup_started(gstin, position, total);

            let result = self.lookup.fetch(credential, gstin).await;
            tracing::debug!("{} -> {}", gstin, result.status());
            results.push(result);

            self.reporter.on_progress(Progress::new(position, total));
        }

        self.reporter.on_finished(&results);
        results
    }
}

/// Reports progress through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ProgressReporter for TracingReporter {
    fn on_lookup_started(&self, gstin: &str, position: usize, total: usize) {
        tracing::info!("🔎 {}", status_message(gstin, position, total));
    }

    fn on_progress(&self, progress: Progress) {
        tracing::info!(
            "⏳ Progress: {}% ({}/{})",
            progress.percent,
            progress.completed,
            progress.total
        );
    }

    fn on_finished(&self, results: &ResultSet) {
        let summary = results.summary();
        tracing::info!(
            "✅ Validation completed: {} checked, {} found, {} failed",
            summary.total,
            summary.found,
            summary.failed()
        );
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {
    fn on_lookup_started(&self, _gstin: &str, _position: usize, _total: usize) {}

    fn on_progress(&self, _progress: Progress) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{GstinDetails, LookupOutcome, LookupResult};
    use std::sync::Mutex;

    /// Answers from a fixed table and records every call.
    struct FakeLookup {
        calls: Mutex<Vec<String>>,
    }

    impl FakeLookup {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl GstinLookup for FakeLookup {
        async fn fetch(&self, _credential: &Credential, gstin: &str) -> LookupResult {
            self.calls.lock().unwrap().push(gstin.to_string());
            let outcome = match gstin {
                "BAD" => LookupOutcome::ApiError(500),
                "GONE" => LookupOutcome::NotFound,
                "DOWN" => LookupOutcome::TransportError("connection refused".to_string()),
                _ => LookupOutcome::Success(GstinDetails {
                    status: "Active".to_string(),
                    ..GstinDetails::default()
                }),
            };
            LookupResult::new(gstin, outcome)
        }
    }

    #[derive(Debug, PartialEq)]
    enum Event {
        Started(String, usize, usize),
        Progress(u8),
        Finished(usize),
    }

    #[derive(Default)]
    struct RecordingReporter {
        events: Mutex<Vec<Event>>,
    }

    impl ProgressReporter for RecordingReporter {
        fn on_lookup_started(&self, gstin: &str, position: usize, total: usize) {
            self.events
                .lock()
                .unwrap()
                .push(Event::Started(gstin.to_string(), position, total));
        }

        fn on_progress(&self, progress: Progress) {
            self.events
                .lock()
                .unwrap()
                .push(Event::Progress(progress.percent));
        }

        fn on_finished(&self, results: &ResultSet) {
            self.events
                .lock()
                .unwrap()
                .push(Event::Finished(results.len()));
        }
    }

    fn credential() -> Credential {
        Credential::new("key").unwrap()
    }

    #[test]
    fn test_unique_identifiers_trims_and_dedups() {
        let input = vec![
            " 27AAPFU0939F1ZV ",
            "",
            "29ABCDE1234F1Z5",
            "27aapfu0939f1zv",
            "   ",
            "27AAPFU0939F1ZV",
            "07AAACB1234C1Z9",
        ];

        assert_eq!(
            unique_identifiers(input),
            vec!["27AAPFU0939F1ZV", "29ABCDE1234F1Z5", "07AAACB1234C1Z9"]
        );
    }

    #[test]
    fn test_status_message() {
        assert_eq!(
            status_message("27AAPFU0939F1ZV", 2, 5),
            "Validating 27AAPFU0939F1ZV (2/5)"
        );
    }

    #[tokio::test]
    async fn test_run_one_result_per_unique_identifier() {
        let lookup = FakeLookup::new();
        let runner = BatchRunner::new(&lookup, &SilentReporter);

        let results = runner
            .run(&credential(), ["A1", "B2", " A1", "b2", "C3"])
            .await;

        assert_eq!(results.len(), 3);
        assert_eq!(lookup.calls(), vec!["A1", "B2", "C3"]);
        let order: Vec<&str> = results.iter().map(|r| r.gstin.as_str()).collect();
        assert_eq!(order, vec!["A1", "B2", "C3"]);
    }

    #[tokio::test]
    async fn test_run_with_no_identifiers_makes_no_calls() {
        let lookup = FakeLookup::new();
        let reporter = RecordingReporter::default();
        let runner = BatchRunner::new(&lookup, &reporter);

        let results = runner.run(&credential(), ["", "  ", "\t"]).await;

        assert!(results.is_empty());
        assert!(lookup.calls().is_empty());
        assert_eq!(*reporter.events.lock().unwrap(), vec![Event::Finished(0)]);
    }

    #[tokio::test]
    async fn test_run_failures_do_not_abort_batch() {
        let lookup = FakeLookup::new();
        let runner = BatchRunner::new(&lookup, &SilentReporter);

        let results = runner
            .run(&credential(), ["BAD", "GONE", "DOWN", "OK1"])
            .await;

        let statuses: Vec<String> = results.iter().map(LookupResult::status).collect();
        assert_eq!(
            statuses,
            vec![
                "API Error 500",
                "Invalid / Not Found",
                "Error: connection refused",
                "Active"
            ]
        );
    }

    #[tokio::test]
    async fn test_run_reports_progress_after_each_lookup() {
        let lookup = FakeLookup::new();
        let reporter = RecordingReporter::default();
        let runner = BatchRunner::new(&lookup, &reporter);

        runner.run(&credential(), ["A", "B", "C"]).await;

        let events = reporter.events.lock().unwrap();
        assert_eq!(
            *events,
            vec![
                Event::Started("A".to_string(), 1, 3),
                Event::Progress(33),
                Event::Started("B".to_string(), 2, 3),
                Event::Progress(66),
                Event::Started("C".to_string(), 3, 3),
                Event::Progress(100),
                Event::Finished(3),
            ]
        );
    }
}

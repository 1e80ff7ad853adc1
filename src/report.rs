use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

use crate::archive::{ArchiveType, Entry};
use chrono::NaiveDate;

/// Result of materializing one entry during the write phase: either the
/// paths it was written to, or the path that was attempted plus the reason
/// it failed.
///
/// Outcomes are the run's notification stream: one record per entry,
/// collected during the write phase and consumed by the caller afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct EntryOutcome {
    pub entry_id: u64,
    pub archive_type: ArchiveType,
    pub date: NaiveDate,

    /// Paths written on success (primary first), or the single attempted
    /// path on failure
    pub paths: Vec<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EntryOutcome {
    pub fn success(entry: &Entry, paths: Vec<PathBuf>) -> Self {
        EntryOutcome {
            entry_id: entry.id,
            archive_type: entry.archive_type,
            date: entry.date,
            paths,
            error: None,
        }
    }

    pub fn failure(entry: &Entry, attempted: PathBuf, reason: String) -> Self {
        EntryOutcome {
            entry_id: entry.id,
            archive_type: entry.archive_type,
            date: entry.date,
            paths: vec![attempted],
            error: Some(reason),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Summary of one sync run: counts plus the per-entry outcome records.
#[derive(Debug, Serialize)]
pub struct SyncReport {
    /// Entries fetched for the requested range (after trimming)
    pub fetched: usize,
    /// Entries whose content was written this run
    pub written: usize,
    /// Entries that failed to download or write
    pub failed: usize,
    pub outcomes: Vec<EntryOutcome>,
}

impl SyncReport {
    /// Report for a run that had nothing to write.
    pub fn empty() -> Self {
        SyncReport {
            fetched: 0,
            written: 0,
            failed: 0,
            outcomes: Vec::new(),
        }
    }

    pub fn from_outcomes(fetched: usize, outcomes: Vec<EntryOutcome>) -> Self {
        let written = outcomes.iter().filter(|o| o.is_success()).count();
        let failed = outcomes.len() - written;
        SyncReport {
            fetched,
            written,
            failed,
            outcomes,
        }
    }

    /// Print the run summary: counts, then one line per entry. Failed
    /// entries are named individually so they can be retried by hand.
    pub fn print_summary(&self) {
        println!("\n{}", "=== Sync Summary ===".bold().cyan());
        println!(
            "  {} Fetched    {} Written    {} Failed",
            format!("{}", self.fetched).cyan(),
            format!("{}", self.written).green(),
            if self.failed > 0 {
                format!("{}", self.failed).red()
            } else {
                format!("{}", self.failed).dimmed()
            },
        );

        if self.outcomes.is_empty() {
            return;
        }

        println!();
        for outcome in &self.outcomes {
            if outcome.is_success() {
                println!(
                    "  {} {} {} {}",
                    "WROTE".green(),
                    outcome.entry_id,
                    format!("({})", outcome.archive_type.as_str()).dimmed(),
                    outcome
                        .paths
                        .first()
                        .map(|p| p.display().to_string())
                        .unwrap_or_default()
                        .dimmed(),
                );
            } else {
                println!(
                    "  {} {} {} {}",
                    "FAILED".red().bold(),
                    outcome.entry_id,
                    outcome
                        .paths
                        .first()
                        .map(|p| p.display().to_string())
                        .unwrap_or_default(),
                    outcome.error.as_deref().unwrap_or("unknown error").red(),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entry() -> Entry {
        Entry::new(
            1,
            123,
            100,
            ArchiveType::Text,
            NaiveDate::from_ymd_opt(2021, 1, 4).unwrap(),
            None,
            Some("hi".to_string()),
            None,
            None,
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_report_counts_from_outcomes() {
        let entry = sample_entry();
        let outcomes = vec![
            EntryOutcome::success(&entry, vec![PathBuf::from("/m/a.txt")]),
            EntryOutcome::failure(&entry, PathBuf::from("/m/b.jpg"), "boom".to_string()),
        ];

        let report = SyncReport::from_outcomes(3, outcomes);
        assert_eq!(report.fetched, 3);
        assert_eq!(report.written, 1);
        assert_eq!(report.failed, 1);
    }

    #[test]
    fn test_empty_report() {
        let report = SyncReport::empty();
        assert_eq!(report.fetched, 0);
        assert_eq!(report.written, 0);
        assert_eq!(report.failed, 0);
        assert!(report.outcomes.is_empty());
    }

    #[test]
    fn test_outcome_serializes_without_null_error() {
        let entry = sample_entry();
        let outcome = EntryOutcome::success(&entry, vec![PathBuf::from("/m/a.txt")]);
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(!json.contains("error"));
    }
}

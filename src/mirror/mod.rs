// Module declarations
mod fetch;
mod manifest;
pub mod paths;
mod write;

// Re-export public types and functions
pub use fetch::{get_archives, months_spanning};
pub use manifest::{
    find_dates_with_recent_changes, load_day_manifest, load_month_manifest, DayManifest,
    DaySummary, ManifestEntry, MonthManifest, DAY_MANIFEST_FILE, MONTH_MANIFEST_FILE,
};
pub use write::write_archives;

use chrono::NaiveDate;

use crate::api::ApiClient;
use crate::error::Result;
use crate::report::SyncReport;
use crate::settings::Settings;

/// States a sync run moves through. `Failed` is reachable from any state on
/// an unrecoverable error; per-entry download failures do not leave
/// `Writing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    FetchingRange,
    Writing,
    Done,
    Failed,
}

impl SyncPhase {
    /// Returns a human-readable string representation
    pub fn as_str(&self) -> &str {
        match self {
            SyncPhase::Idle => "idle",
            SyncPhase::FetchingRange => "fetching-range",
            SyncPhase::Writing => "writing",
            SyncPhase::Done => "done",
            SyncPhase::Failed => "failed",
        }
    }
}

/// Run the whole pipeline for one date range: fetch the months covering the
/// range, trim, write content, write manifests.
///
/// A fetch or storage failure aborts the run; per-entry failures end up in
/// the report.
pub fn sync_range(
    settings: &Settings,
    journal_id: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<SyncReport> {
    let client = ApiClient::new(settings)?;
    let mut phase = SyncPhase::Idle;

    let transition = |from: SyncPhase, to: SyncPhase| {
        log::info!("sync phase: {} -> {}", from.as_str(), to.as_str());
        to
    };

    phase = transition(phase, SyncPhase::FetchingRange);
    let entries = match get_archives(&client, journal_id, start, end) {
        Ok(entries) => entries,
        Err(e) => {
            transition(phase, SyncPhase::Failed);
            return Err(e);
        }
    };

    phase = transition(phase, SyncPhase::Writing);
    let report = match write_archives(&client, settings, &entries) {
        Ok(report) => report,
        Err(e) => {
            transition(phase, SyncPhase::Failed);
            return Err(e);
        }
    };

    transition(phase, SyncPhase::Done);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_as_str() {
        assert_eq!(SyncPhase::Idle.as_str(), "idle");
        assert_eq!(SyncPhase::FetchingRange.as_str(), "fetching-range");
        assert_eq!(SyncPhase::Writing.as_str(), "writing");
        assert_eq!(SyncPhase::Done.as_str(), "done");
        assert_eq!(SyncPhase::Failed.as_str(), "failed");
    }
}

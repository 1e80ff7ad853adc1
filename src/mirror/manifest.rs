use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::paths;
use crate::api::ApiClient;
use crate::archive::{ArchiveType, Entry};
use crate::error::{MirrorError, Result};
use crate::settings::Settings;

/// File name of the per-day index, written into each day directory
pub const DAY_MANIFEST_FILE: &str = "day-manifest.json";
/// File name of the per-month index, written into each month directory
pub const MONTH_MANIFEST_FILE: &str = "month-manifest.json";

/// One mirrored entry as recorded in a day manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub id: u64,

    pub archive_type: ArchiveType,

    /// Normalized zero-based position within the day
    pub sort_position: usize,

    /// Remote change marker at the time the entry was mirrored
    pub version: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,

    /// File names relative to the day directory, primary first
    pub files: Vec<String>,

    /// SHA-256 of the primary file as written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

/// Index of the entries mirrored for one calendar day
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayManifest {
    pub journal_id: u64,
    pub date: NaiveDate,
    pub entry_count: usize,
    pub entries: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub day: u32,
    pub entry_count: usize,
}

/// Index of the days mirrored for one calendar month
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthManifest {
    pub journal_id: u64,
    pub year: i32,
    pub month: u32,
    pub generated_at: DateTime<Utc>,
    pub entry_count: usize,
    pub days: Vec<DaySummary>,
}

/// Write day and month manifests for every entry that was materialized this
/// run.
///
/// Months are processed in ascending order and days ascending within each
/// month, entries ordered by normalized sort position. The fixed ordering is
/// what lets a partially completed run be detected later by comparing
/// expected-vs-found counts per month and day.
pub fn write_manifests(
    root: &Path,
    entries: &[Entry],
    written: &HashMap<u64, Vec<PathBuf>>,
) -> Result<()> {
    let mut by_month: BTreeMap<(i32, u32), BTreeMap<u32, Vec<&Entry>>> = BTreeMap::new();
    for entry in entries {
        if !written.contains_key(&entry.id) {
            continue;
        }
        by_month
            .entry((entry.date.year(), entry.date.month()))
            .or_default()
            .entry(entry.date.day())
            .or_default()
            .push(entry);
    }

    for ((year, month), days) in &by_month {
        let mut day_summaries = Vec::new();
        let mut month_total = 0;
        let mut journal_id = 0;

        for (day, day_entries) in days {
            let mut ordered = day_entries.clone();
            ordered.sort_by_key(|e| e.sort_position);

            let date = ordered[0].date;
            journal_id = ordered[0].journal_id;
            let day_dir = paths::entry_dir(root, journal_id, date);

            let manifest_entries: Vec<ManifestEntry> = ordered
                .iter()
                .map(|entry| {
                    let written_paths = &written[&entry.id];
                    let files = written_paths
                        .iter()
                        .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
                        .collect();
                    let sha256 = written_paths
                        .first()
                        .and_then(|p| paths::sha256_file(p).ok());

                    ManifestEntry {
                        id: entry.id,
                        archive_type: entry.archive_type,
                        sort_position: entry.sort_position,
                        version: entry.version,
                        caption: entry.caption.clone(),
                        files,
                        sha256,
                    }
                })
                .collect();

            let manifest = DayManifest {
                journal_id,
                date,
                entry_count: manifest_entries.len(),
                entries: manifest_entries,
            };

            write_manifest_file(&day_dir.join(DAY_MANIFEST_FILE), &manifest)?;

            day_summaries.push(DaySummary {
                day: *day,
                entry_count: manifest.entry_count,
            });
            month_total += manifest.entry_count;
        }

        let month_manifest = MonthManifest {
            journal_id,
            year: *year,
            month: *month,
            generated_at: Utc::now(),
            entry_count: month_total,
            days: day_summaries,
        };

        let month_dir = paths::month_dir(root, journal_id, *year, *month);
        write_manifest_file(&month_dir.join(MONTH_MANIFEST_FILE), &month_manifest)?;
        log::info!(
            "wrote manifests for {year}-{month:02}: {month_total} entries across {} days",
            month_manifest.days.len()
        );
    }

    Ok(())
}

fn write_manifest_file<T: Serialize>(path: &Path, manifest: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(manifest)
        .map_err(|e| MirrorError::storage(format!("failed to serialize manifest: {e}")))?;
    paths::write_atomic(path, json.as_bytes())
        .map_err(|e| MirrorError::storage(format!("failed to write {}: {e}", path.display())))
}

/// Load a day manifest from disk.
pub fn load_day_manifest(path: &Path) -> Result<DayManifest> {
    let content = fs::read_to_string(path)
        .map_err(|e| MirrorError::storage(format!("failed to read {}: {e}", path.display())))?;
    serde_json::from_str(&content)
        .map_err(|e| MirrorError::parse(format!("malformed manifest {}: {e}", path.display())))
}

/// Load a month manifest from disk.
pub fn load_month_manifest(path: &Path) -> Result<MonthManifest> {
    let content = fs::read_to_string(path)
        .map_err(|e| MirrorError::storage(format!("failed to read {}: {e}", path.display())))?;
    serde_json::from_str(&content)
        .map_err(|e| MirrorError::parse(format!("malformed manifest {}: {e}", path.display())))
}

/// Find the calendar dates whose remote content no longer matches the local
/// mirror.
///
/// The day manifests record each entry's remote version as mirrored; every
/// mirrored month is re-fetched once and a date is reported when a fetched
/// entry is new, carries a different version, or a mirrored entry has
/// disappeared remotely. Dates come back ascending, deduplicated.
pub fn find_dates_with_recent_changes(
    client: &ApiClient,
    settings: &Settings,
    journal_id: &str,
) -> Result<Vec<NaiveDate>> {
    let journal_id: u64 = journal_id.trim().parse().map_err(|_| {
        MirrorError::argument(format!("journal id must be numeric, got {journal_id:?}"))
    })?;

    let journal_root = settings.mirror_root.join(journal_id.to_string());
    if !journal_root.is_dir() {
        log::info!("nothing mirrored yet for journal {journal_id}");
        return Ok(Vec::new());
    }

    // month -> entry id -> mirrored version
    let mut mirrored: BTreeMap<(i32, u32), HashMap<u64, i64>> = BTreeMap::new();
    let mut mirrored_dates: HashMap<u64, NaiveDate> = HashMap::new();

    for dir_entry in WalkDir::new(&journal_root)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if dir_entry.file_name().to_str() != Some(DAY_MANIFEST_FILE) {
            continue;
        }
        let manifest = load_day_manifest(dir_entry.path())?;
        let month_key = (manifest.date.year(), manifest.date.month());
        for recorded in &manifest.entries {
            mirrored
                .entry(month_key)
                .or_default()
                .insert(recorded.id, recorded.version);
            mirrored_dates.insert(recorded.id, manifest.date);
        }
    }

    let mut changed: BTreeSet<NaiveDate> = BTreeSet::new();
    for ((year, month), local) in &mirrored {
        let fresh = client.get_entries_by_month(*year, *month, journal_id)?;

        let mut fresh_ids = HashSet::new();
        for entry in &fresh {
            fresh_ids.insert(entry.id);
            match local.get(&entry.id) {
                Some(&version) if version == entry.version => {}
                _ => {
                    changed.insert(entry.date);
                }
            }
        }

        // Entries that vanished remotely also mean the day changed.
        for id in local.keys() {
            if !fresh_ids.contains(id) {
                if let Some(date) = mirrored_dates.get(id) {
                    changed.insert(*date);
                }
            }
        }
    }

    Ok(changed.into_iter().collect())
}

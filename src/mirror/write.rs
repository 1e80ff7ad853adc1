use rayon::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::{manifest, paths};
use crate::api::ApiClient;
use crate::archive::{ArchiveType, Entry};
use crate::error::{MirrorError, Result};
use crate::report::{EntryOutcome, SyncReport};
use crate::settings::Settings;

/// Write a batch of entries to the local mirror.
///
/// Phase 1 materializes content: text bodies are written from their
/// captions, media is downloaded. Entries are independent; a failure is
/// recorded in that entry's outcome and the rest continue. Work runs on a
/// pool of `max_thread_count` workers and the phase completes before any
/// manifest is touched.
///
/// Phase 2 indexes what was written: day and month manifests, months
/// ascending, days ascending within each month.
///
/// # Errors
/// `Storage` if the mirror root does not exist (it is created by `init`,
/// never here) or if a manifest cannot be written. Per-entry failures are
/// never errors; they come back in the report.
pub fn write_archives(
    client: &ApiClient,
    settings: &Settings,
    entries: &[Entry],
) -> Result<SyncReport> {
    if entries.is_empty() {
        log::info!("no entries to write");
        return Ok(SyncReport::empty());
    }

    let root = settings.mirror_root.as_path();
    if !root.is_dir() {
        return Err(MirrorError::storage(format!(
            "mirror root does not exist: {}",
            root.display()
        )));
    }

    // Phase 1: materialize content, one outcome per entry.
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(settings.max_thread_count)
        .build()
        .map_err(|e| MirrorError::storage(format!("failed to build worker pool: {e}")))?;

    let outcomes: Vec<EntryOutcome> = pool.install(|| {
        entries
            .par_iter()
            .map(|entry| materialize_entry(client, root, entry))
            .collect()
    });

    for outcome in &outcomes {
        match &outcome.error {
            None => log::info!(
                "wrote entry {} ({} files)",
                outcome.entry_id,
                outcome.paths.len()
            ),
            Some(reason) => log::warn!("entry {} failed: {reason}", outcome.entry_id),
        }
    }

    // Phase 2: manifests, strictly after every download settled.
    let written: HashMap<u64, Vec<PathBuf>> = outcomes
        .iter()
        .filter(|o| o.is_success())
        .map(|o| (o.entry_id, o.paths.clone()))
        .collect();

    manifest::write_manifests(root, entries, &written)?;

    Ok(SyncReport::from_outcomes(entries.len(), outcomes))
}

fn materialize_entry(client: &ApiClient, root: &Path, entry: &Entry) -> EntryOutcome {
    let day_dir = paths::entry_dir(root, entry.journal_id, entry.date);
    if let Err(e) = fs::create_dir_all(&day_dir) {
        return EntryOutcome::failure(
            entry,
            day_dir,
            format!("failed to create day directory: {e}"),
        );
    }

    match entry.archive_type {
        ArchiveType::Text => {
            let path = day_dir.join(paths::text_file_name(entry.journal_id, entry.id));
            let body = entry.caption.as_deref().unwrap_or_default();
            match paths::write_atomic(&path, body.as_bytes()) {
                Ok(()) => EntryOutcome::success(entry, vec![path]),
                Err(e) => EntryOutcome::failure(entry, path, e.to_string()),
            }
        }
        ArchiveType::Image | ArchiveType::Video => match client.download(entry, &day_dir) {
            Ok(info) => EntryOutcome::success(entry, info.all_paths()),
            Err(e) => {
                let attempted = entry
                    .source_url
                    .as_deref()
                    .and_then(|url| paths::media_file_name(url).ok())
                    .map(|name| day_dir.join(name))
                    .unwrap_or(day_dir);
                EntryOutcome::failure(entry, attempted, e.to_string())
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use httpmock::prelude::*;
    use tempfile::TempDir;

    fn settings_for(server: &MockServer, root: &Path) -> Settings {
        Settings {
            api_base_url: server.base_url(),
            auth_header_key: "X-Access-Token".to_string(),
            auth_header_value: "secret-token".to_string(),
            max_thread_count: 2,
            mirror_root: root.to_path_buf(),
        }
    }

    fn text_entry(id: u64, caption: &str) -> Entry {
        Entry::new(
            id,
            123,
            id as i64,
            ArchiveType::Text,
            NaiveDate::from_ymd_opt(2021, 1, 4).unwrap(),
            None,
            Some(caption.to_string()),
            None,
            None,
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_missing_root_is_storage_error() {
        let server = MockServer::start();
        let temp = TempDir::new().unwrap();
        let missing_root = temp.path().join("not-created");
        let settings = settings_for(&server, &missing_root);
        let client = ApiClient::new(&settings).unwrap();

        let err = write_archives(&client, &settings, &[text_entry(1, "hi")]).unwrap_err();
        assert!(matches!(err, MirrorError::Storage(_)));
    }

    #[test]
    fn test_empty_batch_is_a_no_op() {
        let server = MockServer::start();
        let temp = TempDir::new().unwrap();
        let settings = settings_for(&server, temp.path());
        let client = ApiClient::new(&settings).unwrap();

        let report = write_archives(&client, &settings, &[]).unwrap();
        assert_eq!(report.fetched, 0);
        assert!(report.outcomes.is_empty());
    }

    #[test]
    fn test_text_entries_written_from_caption() {
        let server = MockServer::start();
        let temp = TempDir::new().unwrap();
        let settings = settings_for(&server, temp.path());
        let client = ApiClient::new(&settings).unwrap();

        let report = write_archives(&client, &settings, &[text_entry(1, "hello world")]).unwrap();
        assert_eq!(report.written, 1);
        assert_eq!(report.failed, 0);

        let path = &report.outcomes[0].paths[0];
        assert!(path.starts_with(temp.path().join("123").join("2021").join("01").join("04")));
        assert_eq!(fs::read_to_string(path).unwrap(), "hello world");
    }
}

use chrono::{NaiveDate, TimeZone, Utc};
use serde::Deserialize;
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

use crate::archive::{ArchiveType, Child, Entry, Gender, JournalSummary};
use crate::error::{MirrorError, Result};

/// Blob key carrying an image entry's source file
const BLOB_SOURCE: &str = "o";
/// Blob key carrying the rectangular thumbnail
const BLOB_THUMB_RECT: &str = "t";
/// Blob key carrying the square thumbnail
const BLOB_THUMB_SQUARE: &str = "o2";

/// Wire shape of a single entry record
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEntry {
    id: u64,
    journal_id: u64,
    /// Remote change marker, not a display time
    timestamp: i64,
    #[serde(rename = "type")]
    entry_type: String,
    attachment_type: Option<String>,
    attachment_url: Option<String>,
    /// "FAILED" when the remote transcode of a video attachment failed
    attachment_status: Option<String>,
    #[serde(default)]
    deleted: bool,
    sort_order: Option<i64>,
    year: i32,
    month: u32,
    day: u32,
    caption: Option<String>,
    #[serde(default)]
    blobs: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct EntriesEnvelope {
    entries: Vec<RawEntry>,
}

/// Wire shape of a journal summary record
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawJournal {
    id: u64,
    title: String,
    created_timestamp: i64,
    url: String,
    #[serde(default)]
    children: Vec<RawChild>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawChild {
    id: u64,
    url: String,
    first_name: String,
    last_name: String,
    dob: String,
    gender: String,
}

#[derive(Debug, Deserialize)]
struct JournalsEnvelope {
    journals: Vec<RawJournal>,
}

/// Parse an entries response body into normalized entries.
///
/// Deleted records and videos whose remote transcode failed are skipped
/// without error; every other malformed record rejects the whole response,
/// since a consistent schema is assumed. Sort positions are normalized per
/// day before returning.
pub fn parse_entries(raw_json: &str) -> Result<Vec<Entry>> {
    let envelope: EntriesEnvelope =
        serde_json::from_str(raw_json).map_err(MirrorError::parse)?;

    let mut entries = Vec::with_capacity(envelope.entries.len());
    for raw in envelope.entries {
        if let Some(entry) = map_entry(raw)? {
            entries.push(entry);
        }
    }

    normalize_sort_positions(&mut entries);
    Ok(entries)
}

fn map_entry(raw: RawEntry) -> Result<Option<Entry>> {
    if raw.deleted {
        log::debug!("skipping deleted entry {}", raw.id);
        return Ok(None);
    }

    let archive_type = ArchiveType::resolve(&raw.entry_type, raw.attachment_type.as_deref())?;

    if archive_type == ArchiveType::Video
        && raw
            .attachment_status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("FAILED"))
    {
        log::debug!("skipping entry {}: video attachment failed remotely", raw.id);
        return Ok(None);
    }

    let date = NaiveDate::from_ymd_opt(raw.year, raw.month, raw.day).ok_or_else(|| {
        MirrorError::parse(format!(
            "entry {} has invalid date {}-{}-{}",
            raw.id, raw.year, raw.month, raw.day
        ))
    })?;

    let (source_url, thumb_rect, thumb_square) = match archive_type {
        ArchiveType::Text => (None, None, None),
        ArchiveType::Image => (
            raw.blobs.get(BLOB_SOURCE).cloned(),
            raw.blobs.get(BLOB_THUMB_RECT).cloned(),
            raw.blobs.get(BLOB_THUMB_SQUARE).cloned(),
        ),
        ArchiveType::Video => (
            raw.attachment_url.clone(),
            raw.blobs.get(BLOB_THUMB_RECT).cloned(),
            raw.blobs.get(BLOB_THUMB_SQUARE).cloned(),
        ),
    };

    Entry::new(
        raw.id,
        raw.journal_id,
        raw.timestamp,
        archive_type,
        date,
        raw.sort_order,
        raw.caption,
        source_url,
        thumb_rect,
        thumb_square,
    )
    .map(Some)
}

/// Assign zero-based, per-day-contiguous sort positions.
///
/// When the payload carries no explicit sort value anywhere, every day is
/// numbered in arrival order. When it does, a day without its own override
/// still uses arrival order; a day with one is ranked by the remote
/// convention (highest raw value first) and renumbered. Entries missing a
/// value on an overridden day rank last, arrival order preserved among ties.
pub fn normalize_sort_positions(entries: &mut [Entry]) {
    let payload_has_override = entries.iter().any(|e| e.sort_override.is_some());

    let mut by_day: BTreeMap<NaiveDate, Vec<usize>> = BTreeMap::new();
    for (idx, entry) in entries.iter().enumerate() {
        by_day.entry(entry.date).or_default().push(idx);
    }

    for indices in by_day.values() {
        let day_has_override =
            payload_has_override && indices.iter().any(|&i| entries[i].sort_override.is_some());

        if day_has_override {
            let mut ranked = indices.clone();
            // Stable sort keeps arrival order among equal raw values.
            ranked.sort_by_key(|&i| Reverse(entries[i].sort_override.unwrap_or(i64::MIN)));
            for (position, &i) in ranked.iter().enumerate() {
                entries[i].sort_position = position;
            }
        } else {
            for (position, &i) in indices.iter().enumerate() {
                entries[i].sort_position = position;
            }
        }
    }
}

/// Parse a journals response body into journal summaries.
pub fn parse_journal_summaries(raw_json: &str) -> Result<Vec<JournalSummary>> {
    let envelope: JournalsEnvelope =
        serde_json::from_str(raw_json).map_err(MirrorError::parse)?;

    envelope.journals.into_iter().map(map_journal).collect()
}

fn map_journal(raw: RawJournal) -> Result<JournalSummary> {
    let created = Utc
        .timestamp_millis_opt(raw.created_timestamp)
        .single()
        .ok_or_else(|| {
            MirrorError::parse(format!(
                "journal {} has invalid creation timestamp {}",
                raw.id, raw.created_timestamp
            ))
        })?;

    let children = raw
        .children
        .into_iter()
        .map(map_child)
        .collect::<Result<Vec<_>>>()?;

    Ok(JournalSummary {
        id: raw.id,
        title: raw.title,
        created,
        url: raw.url,
        children,
    })
}

fn map_child(raw: RawChild) -> Result<Child> {
    let dob = NaiveDate::parse_from_str(&raw.dob, "%Y-%m-%d").map_err(|e| {
        MirrorError::parse(format!("child {} has invalid dob {:?}: {e}", raw.id, raw.dob))
    })?;
    let gender = Gender::from_wire(&raw.gender)?;

    Ok(Child {
        id: raw.id,
        url: raw.url,
        first_name: raw.first_name,
        last_name: raw.last_name,
        dob,
        gender,
    })
}

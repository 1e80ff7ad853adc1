use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::types::ArchiveType;
use crate::error::{MirrorError, Result};

/// One piece of journaled content (a "moment"): a text note, photo, or video
/// tied to a display date.
///
/// Entries are read-only value objects rebuilt fresh on every fetch; the only
/// local state derived from them is the mirrored file tree and its manifests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    /// Remote id, unique within the journal service
    pub id: u64,

    /// Id of the owning journal
    pub journal_id: u64,

    /// Remote change marker; a differing value means the entry was edited
    pub version: i64,

    pub archive_type: ArchiveType,

    /// Display date. Time-of-day and timezone are discarded upstream.
    pub date: NaiveDate,

    /// Explicit display-order value among same-day entries, when the remote
    /// carries one. Highest value ranks first by remote convention.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_override: Option<i64>,

    /// Normalized zero-based position within the day, contiguous per day
    pub sort_position: usize,

    /// Body text for Text entries, optional caption otherwise
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,

    /// Source content URL; absent exactly when the entry is Text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,

    /// Rectangular thumbnail URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumb_rect_url: Option<String>,

    /// Square thumbnail URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumb_square_url: Option<String>,
}

impl Entry {
    /// Create an entry, enforcing the type/content invariants
    ///
    /// # Errors
    /// Returns a parse error if a Text entry carries a source URL or lacks a
    /// caption, or if an Image/Video entry has no source URL.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: u64,
        journal_id: u64,
        version: i64,
        archive_type: ArchiveType,
        date: NaiveDate,
        sort_override: Option<i64>,
        caption: Option<String>,
        source_url: Option<String>,
        thumb_rect_url: Option<String>,
        thumb_square_url: Option<String>,
    ) -> Result<Self> {
        match archive_type {
            ArchiveType::Text => {
                if source_url.is_some() {
                    return Err(MirrorError::parse(format!(
                        "text entry {id} must not carry a source URL"
                    )));
                }
                if caption.as_deref().map_or(true, |c| c.is_empty()) {
                    return Err(MirrorError::parse(format!(
                        "text entry {id} is missing its caption body"
                    )));
                }
            }
            ArchiveType::Image | ArchiveType::Video => {
                if source_url.is_none() {
                    return Err(MirrorError::parse(format!(
                        "{} entry {id} is missing its source URL",
                        archive_type.as_str()
                    )));
                }
            }
        }

        Ok(Entry {
            id,
            journal_id,
            version,
            archive_type,
            date,
            sort_override,
            sort_position: 0,
            caption,
            source_url,
            thumb_rect_url,
            thumb_square_url,
        })
    }

    /// True for photo and video entries, which carry downloadable content
    pub fn has_media(&self) -> bool {
        self.archive_type != ArchiveType::Text
    }

    /// Thumbnail URLs actually present, rectangular first
    pub fn thumbnail_urls(&self) -> Vec<&str> {
        [&self.thumb_rect_url, &self.thumb_square_url]
            .into_iter()
            .filter_map(|u| u.as_deref())
            .collect()
    }
}

/// Local paths written for one entry's content: the primary file plus up to
/// two thumbnails. Transient; consumed for reporting, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDownloadInfo {
    pub entry_id: u64,
    pub primary: PathBuf,
    pub thumbnails: Vec<PathBuf>,
}

impl EntryDownloadInfo {
    /// All written paths, primary first
    pub fn all_paths(&self) -> Vec<PathBuf> {
        let mut paths = vec![self.primary.clone()];
        paths.extend(self.thumbnails.iter().cloned());
        paths
    }
}

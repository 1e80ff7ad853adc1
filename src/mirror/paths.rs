use chrono::{Datelike, NaiveDate};
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::error::{MirrorError, Result};

/// Directory an entry's content lands in: `root/{journalId}/{yyyy}/{mm}/{dd}`.
///
/// Always recomputed from the entry, never stored; identical entries map to
/// identical paths, which is what makes re-running a sync overwrite instead
/// of duplicate.
pub fn entry_dir(root: &Path, journal_id: u64, date: NaiveDate) -> PathBuf {
    root.join(journal_id.to_string())
        .join(format!("{:04}", date.year()))
        .join(format!("{:02}", date.month()))
        .join(format!("{:02}", date.day()))
}

/// Directory a month's manifest lands in: `root/{journalId}/{yyyy}/{mm}`.
pub fn month_dir(root: &Path, journal_id: u64, year: i32, month: u32) -> PathBuf {
    root.join(journal_id.to_string())
        .join(format!("{year:04}"))
        .join(format!("{month:02}"))
}

/// File name for a text entry's body.
///
/// Text entries have no source URL to take a name from, so the name is a
/// generated token. UUIDv5 over the journal/entry ids keeps it unique while
/// staying stable across runs.
pub fn text_file_name(journal_id: u64, entry_id: u64) -> String {
    let token = Uuid::new_v5(
        &Uuid::NAMESPACE_OID,
        format!("{journal_id}/{entry_id}").as_bytes(),
    );
    format!("{token}.txt")
}

/// File name for a media file: the source URL's base name, unchanged.
pub fn media_file_name(url: &str) -> Result<String> {
    let parsed = url::Url::parse(url)
        .map_err(|e| MirrorError::parse(format!("invalid media URL {url}: {e}")))?;
    let name = parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .ok_or_else(|| MirrorError::parse(format!("media URL has no file name: {url}")))?;
    Ok(name.to_string())
}

/// Write `bytes` to `dest` without ever exposing a partial file: the content
/// goes to a temp file in the same directory and is renamed into place. One
/// retry on failure.
pub fn write_atomic(dest: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut result = try_write(dest, bytes);
    if let Err(ref e) = result {
        log::warn!("retrying write to {}: {e}", dest.display());
        result = try_write(dest, bytes);
    }
    result
}

fn try_write(dest: &Path, bytes: &[u8]) -> io::Result<()> {
    let parent = dest.parent().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("destination has no parent directory: {}", dest.display()),
        )
    })?;
    let file_name = dest
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("download");
    // Temp name carries a random suffix so concurrent workers never collide.
    let tmp = parent.join(format!(".{file_name}.{}.part", Uuid::new_v4().simple()));

    fs::write(&tmp, bytes)?;
    if let Err(e) = fs::rename(&tmp, dest) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    Ok(())
}

/// Hex-encoded SHA-256 digest of a file's content.
pub fn sha256_file(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_entry_dir_is_zero_padded() {
        let dir = entry_dir(Path::new("/mirror"), 123, date(2021, 1, 4));
        assert_eq!(dir, PathBuf::from("/mirror/123/2021/01/04"));
    }

    #[test]
    fn test_text_file_name_is_stable_and_unique() {
        let a1 = text_file_name(123, 1);
        let a2 = text_file_name(123, 1);
        let b = text_file_name(123, 2);

        assert_eq!(a1, a2);
        assert_ne!(a1, b);
        assert!(a1.ends_with(".txt"));
    }

    #[test]
    fn test_media_file_name_takes_url_base_name() {
        let name = media_file_name("https://cdn.example.test/a/b/pic-o.jpg").unwrap();
        assert_eq!(name, "pic-o.jpg");

        let name = media_file_name("https://cdn.example.test/clip.mp4?sig=abc").unwrap();
        assert_eq!(name, "clip.mp4");
    }

    #[test]
    fn test_media_file_name_rejects_bare_host() {
        assert!(media_file_name("https://cdn.example.test/").is_err());
        assert!(media_file_name("not a url").is_err());
    }

    #[test]
    fn test_write_atomic_overwrites_and_leaves_no_temp() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("note.txt");

        write_atomic(&dest, b"first").unwrap();
        write_atomic(&dest, b"second").unwrap();

        assert_eq!(fs::read_to_string(&dest).unwrap(), "second");

        let leftovers: Vec<_> = fs::read_dir(temp.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".part"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_write_atomic_fails_without_directory() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("missing").join("note.txt");
        assert!(write_atomic(&dest, b"body").is_err());
    }

    #[test]
    fn test_sha256_file_matches_known_digest() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("x.bin");
        fs::write(&path, b"abc").unwrap();

        let digest = sha256_file(&path).unwrap();
        assert_eq!(
            digest,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}

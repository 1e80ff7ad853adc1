use chrono::{Datelike, NaiveDate};
use std::path::Path;
use std::time::Duration;

use crate::archive::{Entry, EntryDownloadInfo, JournalSummary};
use crate::error::{MirrorError, Result};
use crate::mirror::paths::{media_file_name, write_atomic};
use crate::parser;
use crate::settings::Settings;

/// Anything slower than this is treated as an API failure.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Authenticated HTTP client for the journal service.
///
/// Every request carries the configured auth header and advertises
/// gzip/deflate; compressed bodies are decompressed transparently before
/// parsing. Constructed once from settings and shared by reference.
pub struct ApiClient {
    http: reqwest::blocking::Client,
    base_url: String,
    auth_header_key: String,
    auth_header_value: String,
}

impl ApiClient {
    /// Build a client from validated settings.
    pub fn new(settings: &Settings) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .gzip(true)
            .deflate(true)
            .build()
            .map_err(|e| MirrorError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(ApiClient {
            http,
            base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            auth_header_key: settings.auth_header_key.clone(),
            auth_header_value: settings.auth_header_value.clone(),
        })
    }

    /// Fetch all journal summaries the configured token can see.
    pub fn get_journal_summaries(&self) -> Result<Vec<JournalSummary>> {
        let url = format!("{}/api/1/journals", self.base_url);
        let body = self.get_checked(&url)?;
        parser::parse_journal_summaries(&body)
    }

    /// Fetch the entries displayed on a single calendar day.
    pub fn get_entries_by_date(&self, date: NaiveDate, journal_id: u64) -> Result<Vec<Entry>> {
        let url = format!(
            "{}/api/1/journals/{journal_id}/entries?day={}&month={}&year={}&idsOnly=true",
            self.base_url,
            date.day(),
            date.month(),
            date.year()
        );
        let body = self.get_checked(&url)?;
        parser::parse_entries(&body)
    }

    /// Fetch every entry displayed in a calendar month.
    pub fn get_entries_by_month(
        &self,
        year: i32,
        month: u32,
        journal_id: u64,
    ) -> Result<Vec<Entry>> {
        let url = format!(
            "{}/api/1/journals/{journal_id}/entries?month={month}&year={year}&idsOnly=true",
            self.base_url
        );
        let body = self.get_checked(&url)?;
        parser::parse_entries(&body)
    }

    /// Download an entry's media (source plus any thumbnails) into
    /// `dest_dir`, named by URL base name.
    ///
    /// Files are written through a temp-file rename, so a failure never
    /// leaves a partial file behind.
    pub fn download(&self, entry: &Entry, dest_dir: &Path) -> Result<EntryDownloadInfo> {
        let source_url = entry
            .source_url
            .as_deref()
            .ok_or_else(|| MirrorError::download(entry.id, "entry has no source URL"))?;

        let primary_name =
            media_file_name(source_url).map_err(|e| MirrorError::download(entry.id, e))?;
        let primary = dest_dir.join(primary_name);
        self.fetch_to_file(source_url, &primary, entry.id)?;

        let mut thumbnails = Vec::new();
        for url in entry.thumbnail_urls() {
            let name = media_file_name(url).map_err(|e| MirrorError::download(entry.id, e))?;
            let path = dest_dir.join(name);
            self.fetch_to_file(url, &path, entry.id)?;
            thumbnails.push(path);
        }

        Ok(EntryDownloadInfo {
            entry_id: entry.id,
            primary,
            thumbnails,
        })
    }

    /// GET a JSON endpoint, failing on transport errors, non-success HTTP
    /// statuses, and a non-"ok" embedded status field.
    fn get_checked(&self, url: &str) -> Result<String> {
        log::debug!("GET {url}");
        let response = self
            .http
            .get(url)
            .header(self.auth_header_key.as_str(), self.auth_header_value.as_str())
            .send()
            .map_err(|e| MirrorError::api(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MirrorError::api(url, format!("http status {status}")));
        }

        let body = response.text().map_err(|e| MirrorError::api(url, e))?;
        check_embedded_status(&body, url)?;
        Ok(body)
    }

    fn fetch_to_file(&self, url: &str, dest: &Path, entry_id: u64) -> Result<()> {
        let response = self
            .http
            .get(url)
            .header(self.auth_header_key.as_str(), self.auth_header_value.as_str())
            .send()
            .map_err(|e| MirrorError::download(entry_id, format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MirrorError::download(
                entry_id,
                format!("{url}: http status {status}"),
            ));
        }

        let bytes = response
            .bytes()
            .map_err(|e| MirrorError::download(entry_id, format!("{url}: {e}")))?;

        write_atomic(dest, &bytes)
            .map_err(|e| MirrorError::download(entry_id, format!("{}: {e}", dest.display())))
    }
}

/// A response whose embedded status is present and not "ok" is a hard API
/// failure, never silently tolerated. A body that is not JSON at all is left
/// for the parser, which reports it as a parse error.
fn check_embedded_status(body: &str, url: &str) -> Result<()> {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return Ok(());
    };
    match value.get("status").and_then(|s| s.as_str()) {
        Some("ok") => Ok(()),
        Some(other) => Err(MirrorError::api(
            url,
            format!("embedded status is {other:?}"),
        )),
        None => Err(MirrorError::api(url, "response has no embedded status field")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use httpmock::prelude::*;
    use std::path::PathBuf;

    fn settings_for(server: &MockServer) -> Settings {
        Settings {
            api_base_url: server.base_url(),
            auth_header_key: "X-Access-Token".to_string(),
            auth_header_value: "secret-token".to_string(),
            max_thread_count: 2,
            mirror_root: PathBuf::from("/tmp/unused"),
        }
    }

    #[test]
    fn test_journals_request_carries_auth_header() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/1/journals")
                .header("X-Access-Token", "secret-token");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"status":"ok","journals":[]}"#);
        });

        let client = ApiClient::new(&settings_for(&server)).unwrap();
        let journals = client.get_journal_summaries().unwrap();

        mock.assert();
        assert!(journals.is_empty());
    }

    #[test]
    fn test_non_ok_embedded_status_is_api_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/1/journals");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"status":"expired-token","journals":[]}"#);
        });

        let client = ApiClient::new(&settings_for(&server)).unwrap();
        let err = client.get_journal_summaries().unwrap_err();
        assert!(matches!(err, MirrorError::Api { .. }));
    }

    #[test]
    fn test_http_error_status_is_api_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/1/journals");
            then.status(500);
        });

        let client = ApiClient::new(&settings_for(&server)).unwrap();
        let err = client.get_journal_summaries().unwrap_err();
        assert!(matches!(err, MirrorError::Api { .. }));
    }

    #[test]
    fn test_month_query_shape() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/1/journals/123/entries")
                .query_param("month", "1")
                .query_param("year", "2021")
                .query_param("idsOnly", "true");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"status":"ok","entries":[]}"#);
        });

        let client = ApiClient::new(&settings_for(&server)).unwrap();
        let entries = client.get_entries_by_month(2021, 1, 123).unwrap();

        mock.assert();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_day_query_shape() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/1/journals/123/entries")
                .query_param("day", "4")
                .query_param("month", "1")
                .query_param("year", "2021")
                .query_param("idsOnly", "true");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"status":"ok","entries":[]}"#);
        });

        let client = ApiClient::new(&settings_for(&server)).unwrap();
        let date = NaiveDate::from_ymd_opt(2021, 1, 4).unwrap();
        client.get_entries_by_date(date, 123).unwrap();

        mock.assert();
    }
}

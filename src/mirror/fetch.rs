use chrono::{Datelike, NaiveDate};

use crate::api::ApiClient;
use crate::archive::Entry;
use crate::error::{MirrorError, Result};

/// Calendar months from `start`'s month through `end`'s month inclusive.
/// Callers guarantee `start <= end`.
pub fn months_spanning(start: NaiveDate, end: NaiveDate) -> Vec<(i32, u32)> {
    let mut months = Vec::new();
    let (mut year, mut month) = (start.year(), start.month());
    loop {
        months.push((year, month));
        if year == end.year() && month == end.month() {
            break;
        }
        month += 1;
        if month > 12 {
            month = 1;
            year += 1;
        }
    }
    months
}

/// Fetch every entry whose display date falls within `[start, end]`,
/// inclusive on both ends.
///
/// The remote API has no day-range endpoint, only whole-month queries, so
/// the range is covered month by month and trimmed locally; a range inside a
/// single month costs exactly one fetch. Any month fetch failure aborts the
/// whole range.
///
/// # Errors
/// `Argument` if the journal id is not the remote numeric id or the range is
/// inverted — checked before any request is issued. `Api` on any fetch
/// failure.
pub fn get_archives(
    client: &ApiClient,
    journal_id: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<Entry>> {
    let journal_id: u64 = journal_id.trim().parse().map_err(|_| {
        MirrorError::argument(format!("journal id must be numeric, got {journal_id:?}"))
    })?;

    if start > end {
        return Err(MirrorError::argument(format!(
            "start date {start} is after end date {end}"
        )));
    }

    let mut entries = Vec::new();
    for (year, month) in months_spanning(start, end) {
        log::info!("fetching entries for {year}-{month:02}");
        let mut batch = client.get_entries_by_month(year, month, journal_id)?;
        entries.append(&mut batch);
    }

    // Months arrive whole; keep only the requested days.
    entries.retain(|e| e.date >= start && e.date <= end);

    log::info!(
        "fetched {} entries between {start} and {end}",
        entries.len()
    );
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_months_single() {
        assert_eq!(
            months_spanning(date(2021, 1, 5), date(2021, 1, 28)),
            vec![(2021, 1)]
        );
    }

    #[test]
    fn test_months_across_year_boundary() {
        assert_eq!(
            months_spanning(date(2020, 11, 20), date(2021, 2, 3)),
            vec![(2020, 11), (2020, 12), (2021, 1), (2021, 2)]
        );
    }

    #[test]
    fn test_months_same_day() {
        assert_eq!(
            months_spanning(date(2021, 6, 15), date(2021, 6, 15)),
            vec![(2021, 6)]
        );
    }
}

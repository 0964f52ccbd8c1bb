use std::path::Path;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::error::{Result, SummaryError};
use crate::models::{Record, Series, SeriesKind};

const DATE_FORMATS: [&str; 4] = ["%m/%d/%Y", "%Y-%m-%d", "%m/%d/%y", "%Y/%m/%d"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineIssue {
    MissingField,
    InvalidDate,
    InvalidCount,
}

#[derive(Debug, Default, PartialEq)]
pub struct ParsedLines {
    pub records: Vec<Record>,
    pub dropped: usize,
}

/// Parses pipe-delimited `date|count` lines. The first line is a header and
/// is always skipped; every other line either yields a record or is dropped.
pub fn parse(text: &str) -> ParsedLines {
    let mut parsed = ParsedLines::default();

    for (index, line) in text.split('\n').enumerate().skip(1) {
        match parse_line(line) {
            Ok(record) => parsed.records.push(record),
            Err(issue) => {
                debug!(line = index + 1, ?issue, "dropping input line");
                parsed.dropped += 1;
            }
        }
    }

    parsed
}

fn parse_line(line: &str) -> std::result::Result<Record, LineIssue> {
    let mut fields = line.trim_end_matches('\r').split('|').map(str::trim);
    let date = fields.next().filter(|value| !value.is_empty());
    let count = fields.next().filter(|value| !value.is_empty());

    let (Some(date), Some(count)) = (date, count) else {
        return Err(LineIssue::MissingField);
    };

    let date = parse_date(date).ok_or(LineIssue::InvalidDate)?;
    let count = count
        .replace(',', "")
        .parse::<u64>()
        .map_err(|_| LineIssue::InvalidCount)?;

    Ok(Record { date, count })
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

/// Loads a whole input file into memory and parses it into a series.
pub fn read_series(path: &Path, kind: SeriesKind) -> Result<Series> {
    let text = std::fs::read_to_string(path).map_err(|source| SummaryError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let ParsedLines { records, dropped } = parse(&text);
    if dropped > 0 {
        warn!(
            "Dropped {} lines from {} due to invalid data.",
            dropped,
            path.display()
        );
    }
    debug!(%kind, records = records.len(), "parsed {}", path.display());

    Ok(Series {
        kind,
        source: path.to_path_buf(),
        records,
        dropped,
    })
}

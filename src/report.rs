use std::io;
use std::path::Path;

use csv::{Terminator, WriterBuilder};

use crate::error::{Result, SummaryError};
use crate::models::{ReportKind, ReportRow};

pub const SIGNUPS_HEADER: [&str; 4] = [
    "month",
    "total_signups",
    "average_signups",
    "median_signups",
];

pub const COMBINED_HEADER: [&str; 6] = [
    "month",
    "total_signups",
    "average_signups",
    "median_signups",
    "average_actives",
    "median_actives",
];

pub fn header(kind: ReportKind) -> &'static [&'static str] {
    match kind {
        ReportKind::Signups => &SIGNUPS_HEADER,
        ReportKind::Combined => &COMBINED_HEADER,
    }
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|value| value.to_string()).unwrap_or_default()
}

/// Cells of one report line. Averages keep their full precision.
pub fn row_fields(kind: ReportKind, row: &ReportRow) -> Vec<String> {
    let mut fields = vec![
        row.month.to_string(),
        row.total_signups.to_string(),
        row.average_signups.to_string(),
        optional(row.median_signups),
    ];

    if kind == ReportKind::Combined {
        fields.push(optional(row.average_actives));
        fields.push(optional(row.median_actives));
    }

    fields
}

fn write_rows<W: io::Write>(
    writer: W,
    kind: ReportKind,
    rows: &[ReportRow],
) -> std::result::Result<W, csv::Error> {
    let mut writer = WriterBuilder::new()
        .delimiter(b'\t')
        .terminator(Terminator::Any(b'\n'))
        .flexible(false)
        .from_writer(writer);

    writer.write_record(header(kind))?;
    for row in rows {
        writer.write_record(row_fields(kind, row))?;
    }

    writer.flush()?;
    writer
        .into_inner()
        .map_err(|err| csv::Error::from(io::Error::new(err.error().kind(), err.to_string())))
}

pub fn render(kind: ReportKind, rows: &[ReportRow]) -> std::result::Result<String, csv::Error> {
    let bytes = write_rows(Vec::new(), kind, rows)?;
    String::from_utf8(bytes)
        .map_err(|err| csv::Error::from(io::Error::new(io::ErrorKind::InvalidData, err)))
}

/// Writes the tab-delimited report, replacing any existing file at `path`.
pub fn write_report(path: &Path, kind: ReportKind, rows: &[ReportRow]) -> Result<()> {
    let to_write_error = |source: csv::Error| SummaryError::Write {
        path: path.to_path_buf(),
        source,
    };

    let contents = render(kind, rows).map_err(to_write_error)?;
    std::fs::write(path, contents).map_err(|err| to_write_error(csv::Error::from(err)))?;
    Ok(())
}

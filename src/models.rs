use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    Signups,
    Actives,
}

impl fmt::Display for SeriesKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeriesKind::Signups => f.write_str("signups"),
            SeriesKind::Actives => f.write_str("actives"),
        }
    }
}

/// One dated daily count taken from an input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Record {
    pub date: NaiveDate,
    pub count: u64,
}

#[derive(Debug, Clone)]
pub struct Series {
    pub kind: SeriesKind,
    pub source: PathBuf,
    pub records: Vec<Record>,
    pub dropped: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthGroup {
    pub month: u32,
    pub total: u128,
    pub average: f64,
    pub median: Option<u64>,
    pub daily_values: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveMonth {
    pub month: u32,
    pub average: f64,
    pub median: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub month: u32,
    pub total_signups: u128,
    pub average_signups: f64,
    pub median_signups: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_actives: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub median_actives: Option<u64>,
}

/// Layout of a report. Stored documents use the same labels for their `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Signups,
    #[serde(rename = "actives")]
    Combined,
}

impl ReportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Signups => "signups",
            ReportKind::Combined => "actives",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub kind: ReportKind,
    pub rows: Vec<ReportRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InputSnapshot {
    #[serde(rename = "type")]
    pub kind: ReportKind,
    pub dropped_signups: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dropped_actives: Option<usize>,
    pub signups: Vec<Record>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actives: Option<Vec<Record>>,
}

impl InputSnapshot {
    pub fn from_series(signups: &Series, actives: Option<&Series>) -> Self {
        Self {
            kind: if actives.is_some() {
                ReportKind::Combined
            } else {
                ReportKind::Signups
            },
            dropped_signups: signups.dropped,
            dropped_actives: actives.map(|series| series.dropped),
            signups: signups.records.clone(),
            actives: actives.map(|series| series.records.clone()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportSnapshot {
    #[serde(rename = "type")]
    pub kind: ReportKind,
    pub input_id: Option<Uuid>,
    pub lines: Vec<ReportRow>,
}

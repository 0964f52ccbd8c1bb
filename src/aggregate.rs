use std::collections::BTreeMap;

use chrono::Datelike;

use crate::models::{ActiveMonth, MonthGroup, Record, ReportKind, ReportRow, Summary};

/// Middle value of `values`. For an even number of values the two middle
/// values are averaged and rounded half up. Returns `None` when empty.
pub fn median(values: &[u64]) -> Option<u64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let half = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[half])
    } else {
        let (low, high) = (sorted[half - 1], sorted[half]);
        Some(low / 2 + high / 2 + (low % 2 + high % 2 + 1) / 2)
    }
}

/// Groups records by calendar month. The year is deliberately ignored, so
/// January 2021 and January 2022 land in the same group.
pub fn aggregate_one(records: &[Record]) -> Vec<MonthGroup> {
    let mut months: BTreeMap<u32, Vec<u64>> = BTreeMap::new();
    for record in records {
        months
            .entry(record.date.month())
            .or_default()
            .push(record.count);
    }

    months
        .into_iter()
        .map(|(month, daily_values)| {
            let total: u128 = daily_values.iter().map(|&value| u128::from(value)).sum();
            let average = if daily_values.is_empty() {
                0.0
            } else {
                total as f64 / daily_values.len() as f64
            };
            let mut group = MonthGroup {
                month,
                total,
                average,
                median: None,
                daily_values,
            };
            group.median = median(&group.daily_values);
            group
        })
        .collect()
}

pub fn aggregate_actives(records: &[Record]) -> Vec<ActiveMonth> {
    aggregate_one(records)
        .into_iter()
        .map(|group| ActiveMonth {
            month: group.month,
            average: group.average,
            median: group.median,
        })
        .collect()
}

pub fn signup_rows(groups: &[MonthGroup]) -> Vec<ReportRow> {
    groups
        .iter()
        .map(|group| ReportRow {
            month: group.month,
            total_signups: group.total,
            average_signups: group.average,
            median_signups: group.median,
            average_actives: None,
            median_actives: None,
        })
        .collect()
}

/// Left join of the actives statistics onto the signup months. Months seen
/// only in the actives series do not produce rows.
pub fn aggregate_both(signups: &[Record], actives: &[Record]) -> Vec<ReportRow> {
    let actives: BTreeMap<u32, ActiveMonth> = aggregate_actives(actives)
        .into_iter()
        .map(|active| (active.month, active))
        .collect();

    let mut rows = signup_rows(&aggregate_one(signups));
    for row in rows.iter_mut() {
        if let Some(active) = actives.get(&row.month) {
            row.average_actives = Some(active.average);
            row.median_actives = active.median;
        }
    }
    rows
}

pub fn summarize(signups: &[Record], actives: Option<&[Record]>) -> Summary {
    match actives {
        Some(actives) => Summary {
            kind: ReportKind::Combined,
            rows: aggregate_both(signups, actives),
        },
        None => Summary {
            kind: ReportKind::Signups,
            rows: signup_rows(&aggregate_one(signups)),
        },
    }
}

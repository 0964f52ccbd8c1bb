use std::path::PathBuf;

use tracing::{info, warn};
use uuid::Uuid;

use crate::aggregate;
use crate::db::DocumentStore;
use crate::error::{Result, SummaryError};
use crate::models::{InputSnapshot, ReportSnapshot, SeriesKind, Summary};
use crate::parser;
use crate::report;

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub signups: PathBuf,
    pub actives: Option<PathBuf>,
    pub output: PathBuf,
}

impl RunOptions {
    pub fn validate(&self) -> Result<()> {
        if self.signups.as_os_str().is_empty() {
            return Err(SummaryError::Argument(
                "no input file specified".to_string(),
            ));
        }
        if matches!(&self.actives, Some(path) if path.as_os_str().is_empty()) {
            return Err(SummaryError::Argument(
                "must include filename for active users information".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct RunOutcome {
    pub summary: Summary,
    pub output: PathBuf,
    pub input_id: Option<Uuid>,
    pub report_id: Option<Uuid>,
}

/// Read, snapshot, aggregate and write one report. Only a failure to keep
/// the computed report in the store is tolerated.
pub async fn run<S: DocumentStore>(options: &RunOptions, store: Option<&S>) -> Result<RunOutcome> {
    options.validate()?;

    let signups = parser::read_series(&options.signups, SeriesKind::Signups)?;
    let actives = options
        .actives
        .as_deref()
        .map(|path| parser::read_series(path, SeriesKind::Actives))
        .transpose()?;
    for series in std::iter::once(&signups).chain(actives.as_ref()) {
        info!(
            kind = %series.kind,
            records = series.records.len(),
            dropped = series.dropped,
            "loaded {}",
            series.source.display()
        );
    }

    let input_id = match store {
        Some(store) => {
            let snapshot = InputSnapshot::from_series(&signups, actives.as_ref());
            let id = store.store_input(&snapshot).await?;
            info!(%id, "stored input snapshot");
            Some(id)
        }
        None => {
            info!("no document store configured; skipping persistence");
            None
        }
    };

    let summary = aggregate::summarize(
        &signups.records,
        actives.as_ref().map(|series| series.records.as_slice()),
    );
    info!(kind = summary.kind.as_str(), months = summary.rows.len(), "aggregated");

    let mut report_id = None;
    if let Some(store) = store {
        let snapshot = ReportSnapshot {
            kind: summary.kind,
            input_id,
            lines: summary.rows.clone(),
        };
        match store.store_report(&snapshot).await {
            Ok(id) => {
                info!(%id, "stored report snapshot");
                report_id = Some(id);
            }
            Err(err) => warn!("Result not saved to database: {:#}", anyhow::Error::from(err)),
        }
    }

    report::write_report(&options.output, summary.kind, &summary.rows)?;

    Ok(RunOutcome {
        summary,
        output: options.output.clone(),
        input_id,
        report_id,
    })
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Mutex;

    use super::*;
    use crate::db::PgDocumentStore;
    use crate::models::ReportKind;

    #[derive(Default)]
    struct MemoryStore {
        inputs: Mutex<Vec<InputSnapshot>>,
        reports: Mutex<Vec<ReportSnapshot>>,
        fail_inputs: bool,
        fail_reports: bool,
    }

    impl DocumentStore for MemoryStore {
        async fn store_input(&self, snapshot: &InputSnapshot) -> Result<Uuid> {
            if self.fail_inputs {
                return Err(sqlx::Error::PoolTimedOut.into());
            }
            self.inputs.lock().unwrap().push(snapshot.clone());
            Ok(Uuid::new_v4())
        }

        async fn store_report(&self, snapshot: &ReportSnapshot) -> Result<Uuid> {
            if self.fail_reports {
                return Err(sqlx::Error::PoolTimedOut.into());
            }
            self.reports.lock().unwrap().push(snapshot.clone());
            Ok(Uuid::new_v4())
        }
    }

    fn write_input(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn options(dir: &Path, with_actives: bool) -> RunOptions {
        let signups = write_input(
            dir,
            "signups.txt",
            "date|signups\n01/05/2021|100\n01/12/2021|200\n02/01/2021|50\n",
        );
        let actives = with_actives.then(|| {
            write_input(
                dir,
                "actives.txt",
                "date|actives\n02/03/2021|1,000\n02/04/2021|3,000\n03/01/2021|9\n",
            )
        });
        RunOptions {
            signups,
            actives,
            output: dir.join("output.txt"),
        }
    }

    #[tokio::test]
    async fn signups_only_without_store() {
        let dir = tempfile::tempdir().unwrap();
        let options = options(dir.path(), false);

        let outcome = run::<PgDocumentStore>(&options, None).await.unwrap();
        assert_eq!(outcome.summary.kind, ReportKind::Signups);
        assert!(outcome.input_id.is_none());

        let contents = std::fs::read_to_string(&outcome.output).unwrap();
        assert_eq!(
            contents,
            "month\ttotal_signups\taverage_signups\tmedian_signups\n\
             1\t300\t150\t150\n\
             2\t50\t50\t50\n"
        );
    }

    #[tokio::test]
    async fn combined_run_stores_both_documents() {
        let dir = tempfile::tempdir().unwrap();
        let options = options(dir.path(), true);
        let store = MemoryStore::default();

        let outcome = run(&options, Some(&store)).await.unwrap();
        assert!(outcome.input_id.is_some());
        assert!(outcome.report_id.is_some());

        let inputs = store.inputs.lock().unwrap();
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0].kind, ReportKind::Combined);
        assert_eq!(inputs[0].dropped_signups, 1);
        assert_eq!(inputs[0].dropped_actives, Some(1));

        let reports = store.reports.lock().unwrap();
        assert_eq!(reports[0].input_id, outcome.input_id);
        assert_eq!(reports[0].lines, outcome.summary.rows);

        let contents = std::fs::read_to_string(&outcome.output).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "1\t300\t150\t150\t\t");
        assert_eq!(lines[2], "2\t50\t50\t50\t2000\t2000");
    }

    #[tokio::test]
    async fn report_store_failure_still_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let options = options(dir.path(), false);
        let store = MemoryStore {
            fail_reports: true,
            ..Default::default()
        };

        let outcome = run(&options, Some(&store)).await.unwrap();
        assert!(outcome.report_id.is_none());
        assert!(outcome.output.exists());
    }

    #[tokio::test]
    async fn input_store_failure_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let options = options(dir.path(), false);
        let store = MemoryStore {
            fail_inputs: true,
            ..Default::default()
        };

        let err = run(&options, Some(&store)).await.unwrap_err();
        assert!(matches!(err, SummaryError::Persistence(_)));
        assert!(!options.output.exists());
    }

    #[tokio::test]
    async fn unreadable_actives_file_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let mut options = options(dir.path(), false);
        options.actives = Some(dir.path().join("nope.txt"));

        let err = run::<PgDocumentStore>(&options, None).await.unwrap_err();
        assert!(matches!(err, SummaryError::Read { .. }));
        assert!(!options.output.exists());
    }

    #[test]
    fn empty_paths_are_argument_errors() {
        let mut options = RunOptions {
            signups: PathBuf::new(),
            actives: None,
            output: PathBuf::from("output.txt"),
        };
        assert!(matches!(options.validate(), Err(SummaryError::Argument(_))));

        options.signups = PathBuf::from("signups.txt");
        options.actives = Some(PathBuf::new());
        assert!(matches!(options.validate(), Err(SummaryError::Argument(_))));

        options.actives = None;
        assert!(options.validate().is_ok());
    }
}

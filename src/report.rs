//! Result files: one text block per batch of a run.

use crate::{
    dispatch::BatchReport,
    error::RunError,
    records::Records,
    run::RunConfig,
    size::format_size,
};

use std::{
    fs::{self, OpenOptions},
    io::Write as _,
    path::{Path, PathBuf},
};

/// Writes the reports of a run to a single result file.
///
/// The file is named after the run configuration:
/// `Results_<data size>_<threads>_<table size>_<actions>.txt`, inside the
/// configured output directory.
#[derive(Clone, Debug)]
pub struct ReportWriter {
    path: PathBuf,
}

impl ReportWriter {
    pub fn new(config: &RunConfig) -> Self {
        let flow = config
            .flow()
            .iter()
            .map(|step| step.action().name())
            .collect::<Vec<_>>()
            .join("_");

        let file_name = format!(
            "Results_{}_{}_{}_{}.txt",
            format_size(config.data_size()),
            config.threads(),
            format_size(config.table_size()),
            flow
        );

        Self {
            path: config.output_dir().join(file_name),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes one batch. The first batch of a run truncates the file, the
    /// following ones are appended.
    pub fn write(&self, first: bool, records: &Records, report: &BatchReport) -> Result<(), RunError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|e| RunError::io(dir, e))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(first)
            .append(!first)
            .open(&self.path)
            .map_err(|e| RunError::io(&self.path, e))?;

        file.write_all(render(records, report).as_bytes())
            .map_err(|e| RunError::io(&self.path, e))
    }
}

/// Renders one batch as text.
///
/// ```text
/// Actions: insert
/// ExecutionTime: 12 ms
/// NumberOfHandledCollision: 3
/// apple:17:F, banana:4:F, apple:17:T
/// ```
///
/// Each record is written as `key:slot:flag`, where the flag is `T` when the
/// outcome has `found` set. Deletions of absent keys have no slot and are
/// written as `key:F`.
pub fn render(records: &Records, report: &BatchReport) -> String {
    let entries = records
        .iter()
        .zip(report.outcomes())
        .map(|(key, outcome)| {
            let key = String::from_utf8_lossy(key);
            let flag = if outcome.found() { 'T' } else { 'F' };
            match outcome.slot() {
                Some(slot) => format!("{key}:{slot}:{flag}"),
                None => format!("{key}:{flag}"),
            }
        })
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Actions: {}\nExecutionTime: {} ms\nNumberOfHandledCollision: {}\n{}\n",
        report.action(),
        report.elapsed_millis(),
        report.collisions(),
        entries
    )
}

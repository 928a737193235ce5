use crate::{
    dispatch::{dispatch, Action, BatchReport},
    error::RunError,
    records::Records,
    report::ReportWriter,
    table::Table,
};

use std::path::{Path, PathBuf};

const DEFAULT_OUTPUT_DIR: &str = "results";

/// One batch of a run: an action and the file holding its keys.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Step {
    action: Action,
    input: PathBuf,
}

impl Step {
    pub fn new(action: Action, input: impl Into<PathBuf>) -> Self {
        Self {
            action,
            input: input.into(),
        }
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn input(&self) -> &Path {
        &self.input
    }
}

/// The configuration of a run: the table, the worker count and the flow of
/// batches to apply, in order.
///
/// Use [`RunConfig::builder`](#method.builder) to create one.
#[derive(Clone, Debug)]
pub struct RunConfig {
    table_size: usize,
    threads: usize,
    data_size: usize,
    flow: Vec<Step>,
    output_dir: PathBuf,
}

impl RunConfig {
    /// Starts the configuration of a run on a table of `table_size` slots.
    pub fn builder(table_size: usize) -> RunConfigBuilder {
        RunConfigBuilder {
            table_size,
            threads: 1,
            data_size: 0,
            actions: Vec::new(),
            inputs: Vec::new(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }

    pub fn table_size(&self) -> usize {
        self.table_size
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Returns the nominal number of records per input, used to name the
    /// result file.
    pub fn data_size(&self) -> usize {
        self.data_size
    }

    pub fn flow(&self) -> &[Step] {
        &self.flow
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

/// Builds a [`RunConfig`].
///
/// # Examples
///
/// ```rust
/// use lockprobe::{Action, RunConfig};
///
/// let config = RunConfig::builder(100_000)
///     .threads(8)
///     .data_size(50_000)
///     .flow(
///         vec![Action::Insert, Action::Delete],
///         vec!["keys.txt".into(), "stale.txt".into()],
///     )
///     .build()
///     .unwrap();
///
/// assert_eq!(config.flow().len(), 2);
/// assert_eq!(config.output_dir().to_str(), Some("results"));
/// ```
#[derive(Clone, Debug)]
#[must_use]
pub struct RunConfigBuilder {
    table_size: usize,
    threads: usize,
    data_size: usize,
    actions: Vec<Action>,
    inputs: Vec<PathBuf>,
    output_dir: PathBuf,
}

impl RunConfigBuilder {
    /// Sets the number of worker threads per batch. Default: 1.
    ///
    /// Each batch clamps it to its number of records.
    pub fn threads(self, threads: usize) -> Self {
        Self { threads, ..self }
    }

    /// Sets the nominal number of records per input. Default: 0.
    pub fn data_size(self, data_size: usize) -> Self {
        Self { data_size, ..self }
    }

    /// Sets the actions and their input files. Both lists must have the same
    /// length, which is checked by `build`.
    pub fn flow(self, actions: Vec<Action>, inputs: Vec<PathBuf>) -> Self {
        Self {
            actions,
            inputs,
            ..self
        }
    }

    /// Adds one step at the end of the flow.
    pub fn step(mut self, action: Action, input: impl Into<PathBuf>) -> Self {
        self.actions.push(action);
        self.inputs.push(input.into());
        self
    }

    /// Sets the directory of the result file. Default: `results`.
    pub fn output_dir(self, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..self
        }
    }

    pub fn build(self) -> Result<RunConfig, RunError> {
        if self.actions.len() != self.inputs.len() {
            return Err(RunError::FlowMismatch {
                actions: self.actions.len(),
                inputs: self.inputs.len(),
            });
        }

        let flow = self
            .actions
            .into_iter()
            .zip(self.inputs)
            .map(|(action, input)| Step::new(action, input))
            .collect();

        Ok(RunConfig {
            table_size: self.table_size,
            threads: self.threads,
            data_size: self.data_size,
            flow,
            output_dir: self.output_dir,
        })
    }
}

/// Runs every step of the flow against one table.
///
/// The table is created before the first step and destroyed after the last.
/// Each step loads its input, dispatches it and writes its report to the
/// result file. Empty inputs are skipped.
///
/// Returns the reports of the steps that ran, in order.
pub fn run(config: &RunConfig) -> Result<Vec<BatchReport>, RunError> {
    let table = Table::create(config.table_size())?;
    let writer = ReportWriter::new(config);
    let mut reports = Vec::with_capacity(config.flow().len());

    for step in config.flow() {
        #[cfg(feature = "logging")]
        log::info!(
            ">>> Action: {} on file: {}",
            step.action(),
            step.input().display()
        );

        let records = Records::load(step.input())?;
        if records.is_empty() {
            #[cfg(feature = "logging")]
            log::warn!("File {} is empty.", step.input().display());
            continue;
        }

        let report = dispatch(&table, step.action(), &records.views(), config.threads());
        writer.write(reports.is_empty(), &records, &report)?;
        reports.push(report);
    }

    table.destroy();

    Ok(reports)
}

//! Parallel batches of insertions or deletions.

use crate::{
    common::time::Stopwatch,
    error::RunError,
    ops::{self, Outcome},
    table::Table,
};

use crossbeam_utils::thread;
use std::{fmt, mem, ops::Range, panic, str::FromStr, time::Duration};

/// The operation applied to every record of a batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Insert,
    Delete,
}

impl Action {
    /// Returns the lowercase name, as accepted by `FromStr`.
    pub fn name(self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Delete => "delete",
        }
    }

    #[cfg(feature = "logging")]
    fn verb(self) -> &'static str {
        match self {
            Self::Insert => "Inserting",
            Self::Delete => "Deleting",
        }
    }

    fn apply(self, table: &Table, key: &[u8]) -> ops::Probe {
        match self {
            Self::Insert => ops::insert(table, key),
            Self::Delete => ops::delete(table, key),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Action {
    type Err = RunError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "insert" => Ok(Self::Insert),
            "delete" => Ok(Self::Delete),
            _ => Err(RunError::UnknownAction(s.to_string())),
        }
    }
}

/// Splits `0..len` into at most `threads` contiguous ranges of
/// `ceil(len / threads)` records, the last one possibly shorter.
///
/// `threads` is clamped to `1..=len`. Empty ranges are never returned, so an
/// empty batch has no ranges at all.
pub fn partition(len: usize, threads: usize) -> Vec<Range<usize>> {
    if len == 0 {
        return Vec::new();
    }

    let threads = threads.clamp(1, len);
    let chunk = (len + threads - 1) / threads;

    (0..threads)
        .map(|t| t * chunk..((t + 1) * chunk).min(len))
        .filter(|range| !range.is_empty())
        .collect()
}

/// Applies `action` to every record, using up to `threads` worker threads.
///
/// Records are split with [`partition`]. Each worker handles its range in
/// order and writes the outcome of record `i` at index `i` of the report. The
/// collisions of all workers are summed once every worker has finished.
///
/// If the same key appears in the ranges of two workers, the first one to
/// reach a usable slot stores it and the other one finds it.
///
/// # Panics
///
/// Panics if a worker panics, which happens when an insertion finds the table
/// full.
pub fn dispatch<R>(table: &Table, action: Action, records: &[R], threads: usize) -> BatchReport
where
    R: AsRef<[u8]> + Sync,
{
    let ranges = partition(records.len(), threads);
    let mut outcomes = vec![Outcome::default(); records.len()];

    #[cfg(feature = "logging")]
    log::debug!(
        "{} {} records with {} workers",
        action.verb(),
        records.len(),
        ranges.len()
    );

    let stopwatch = Stopwatch::start();

    let result = thread::scope(|s| {
        let mut rest = &mut outcomes[..];
        let workers: Vec<_> = ranges
            .iter()
            .map(|range| {
                let (chunk, tail) = mem::take(&mut rest).split_at_mut(range.len());
                rest = tail;
                let records = &records[range.clone()];
                s.spawn(move |_| work(table, action, records, chunk))
            })
            .collect();

        workers
            .into_iter()
            .map(|worker| worker.join().unwrap_or_else(|e| panic::resume_unwind(e)))
            .sum::<u64>()
    });
    let collisions = result.unwrap_or_else(|e| panic::resume_unwind(e));

    let report = BatchReport {
        action,
        outcomes,
        collisions,
        elapsed: stopwatch.elapsed(),
    };

    #[cfg(feature = "logging")]
    log::info!(
        "{} {} records took {} ms, {} found, {} collisions",
        action.verb(),
        report.len(),
        report.elapsed_millis(),
        report.found_count(),
        report.collisions()
    );

    report
}

/// Processes one range of records and returns its collision subtotal.
fn work<R: AsRef<[u8]>>(
    table: &Table,
    action: Action,
    records: &[R],
    outcomes: &mut [Outcome],
) -> u64 {
    let mut collisions = 0;
    for (record, outcome) in records.iter().zip(outcomes.iter_mut()) {
        let probe = action.apply(table, record.as_ref());
        *outcome = probe.outcome();
        collisions += probe.collisions();
    }
    collisions
}

/// The result of a batch: one [`Outcome`] per record, in record order, plus
/// the batch totals.
#[derive(Clone, PartialEq, Eq)]
pub struct BatchReport {
    action: Action,
    outcomes: Vec<Outcome>,
    collisions: u64,
    elapsed: Duration,
}

impl BatchReport {
    pub fn action(&self) -> Action {
        self.action
    }

    /// Returns the outcome of each record, indexed like the records.
    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    /// Returns the sum of the collisions of every worker.
    pub fn collisions(&self) -> u64 {
        self.collisions
    }

    /// Returns the wall-clock time from the start of the first worker to the
    /// end of the last one.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn elapsed_millis(&self) -> u128 {
        self.elapsed.as_millis()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Returns the number of records whose outcome has `found` set: keys that
    /// already existed for an insertion, keys removed for a deletion.
    pub fn found_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.found()).count()
    }
}

impl fmt::Debug for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchReport")
            .field("action", &self.action)
            .field("len", &self.len())
            .field("found_count", &self.found_count())
            .field("collisions", &self.collisions)
            .field("elapsed", &self.elapsed)
            .finish()
    }
}

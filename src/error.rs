use std::{collections::TryReserveError, io, path::PathBuf};

/// The error type for creating and probing a [`Table`][table-struct].
///
/// [table-struct]: ./struct.Table.html
#[derive(thiserror::Error, Debug)]
pub enum TableError {
    /// A table needs at least one slot.
    #[error("the table capacity must be at least one slot")]
    ZeroCapacity,

    /// The storage for the slots and their locks could not be reserved.
    #[error("unable to allocate a table of {capacity} slots")]
    Allocation {
        capacity: usize,
        #[source]
        source: TryReserveError,
    },

    /// An insertion went around the whole table without finding a never-used
    /// slot or a tombstone.
    ///
    /// The table is sized once and never grows, so this is a sizing mistake
    /// of the caller. It is raised as a panic by [`insert`][insert-fn].
    ///
    /// [insert-fn]: ./fn.insert.html
    #[error("no reachable empty slot in a table of {capacity} slots")]
    CapacityExhausted { capacity: usize },
}

/// The error type for loading inputs, writing results and running a flow of
/// batches.
#[derive(thiserror::Error, Debug)]
pub enum RunError {
    #[error("cannot access `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid size `{0}`, expected a number with an optional K or M suffix")]
    InvalidSize(String),

    #[error("unknown action `{0}`, expected `insert` or `delete`")]
    UnknownAction(String),

    #[error("number of input files ({inputs}) must match number of actions ({actions})")]
    FlowMismatch { actions: usize, inputs: usize },

    #[error(transparent)]
    Table(#[from] TableError),
}

impl RunError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#![warn(clippy::all)]
#![warn(rust_2018_idioms)]

//! A fixed-capacity open addressing hash index, mutated in parallel batches.
//!
//! The index is a [`Table`] of slots with one lock per slot. Keys are
//! arbitrary byte strings. A batch of keys is split into contiguous chunks,
//! one OS thread per chunk, and every key is either inserted into or deleted
//! from the shared table. Each key gets an [`Outcome`] (the slot it was
//! placed in or removed from, and whether it was already there), and the
//! batch reports the total number of probe collisions.
//!
//! # Example
//!
//! ```rust
//! use lockprobe::{dispatch, Action, Table};
//!
//! let table = Table::create(1024).unwrap();
//!
//! let keys = ["apple", "banana", "cherry", "apple"];
//! let report = dispatch(&table, Action::Insert, &keys, 2);
//!
//! assert_eq!(report.len(), 4);
//! assert!(!report.outcomes()[0].found());
//! // The second "apple" finds the first one.
//! assert!(report.outcomes()[3].found());
//! assert_eq!(report.outcomes()[3].slot(), report.outcomes()[0].slot());
//!
//! let report = dispatch(&table, Action::Delete, &["banana", "durian"], 2);
//! assert!(report.outcomes()[0].found());
//! assert!(!report.outcomes()[1].found());
//!
//! table.destroy();
//! ```
//!
//! # Probing
//!
//! The start position of a key is its 64-bit FNV-1a [`fingerprint`] modulo
//! the table capacity, and probing is linear with wraparound.
//!
//! Deleted keys leave a tombstone behind. An insertion remembers the first
//! tombstone on its probe path and reuses it once it has proven the key is
//! not stored further along. Insertions stop counting collisions after the
//! first tombstone, while deletions count tombstones as collisions.
//!
//! # Capacity
//!
//! The table never grows. The caller must size it so that every insertion
//! can reach a never-used slot or a tombstone; a full table makes
//! [`insert`] panic.

pub(crate) mod common;

mod dispatch;
mod error;
mod fingerprint;
mod ops;
mod records;
mod report;
mod run;
mod size;
mod table;

pub use dispatch::{dispatch, partition, Action, BatchReport};
pub use error::{RunError, TableError};
pub use fingerprint::{fingerprint, FnvBuildHasher, FnvHasher};
pub use ops::{delete, insert, Outcome, Probe};
pub use records::Records;
pub use report::{render, ReportWriter};
pub use run::{run, RunConfig, RunConfigBuilder, Step};
pub use size::{format_size, parse_size};
pub use table::{Occupancy, Table};

use crate::{error::TableError, fingerprint::fingerprint};

use parking_lot::{Mutex, MutexGuard};
use std::fmt;

/// The state of one position of the table.
///
/// A slot only moves `Empty -> Occupied`, `Occupied -> Tombstone` and
/// `Tombstone -> Occupied`. It never goes back to `Empty`.
#[derive(Debug, Default)]
pub(crate) enum Slot {
    /// Never used.
    #[default]
    Empty,
    /// Holds a live key, owned by the table.
    Occupied(Box<[u8]>),
    /// Held a key that has been deleted.
    Tombstone,
}

impl Slot {
    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }

    #[inline]
    pub(crate) fn is_tombstone(&self) -> bool {
        matches!(self, Slot::Tombstone)
    }

    /// Returns `true` if the slot holds a key equal to `key`, byte for byte.
    #[inline]
    pub(crate) fn holds(&self, key: &[u8]) -> bool {
        matches!(self, Slot::Occupied(stored) if **stored == *key)
    }

    /// Stores an owned copy of `key`.
    #[inline]
    pub(crate) fn fill(&mut self, key: &[u8]) {
        debug_assert!(!matches!(self, Slot::Occupied(_)));
        *self = Slot::Occupied(key.into());
    }

    /// Drops the stored key and leaves a tombstone.
    #[inline]
    pub(crate) fn bury(&mut self) {
        debug_assert!(matches!(self, Slot::Occupied(_)));
        *self = Slot::Tombstone;
    }
}

/// A fixed-capacity open addressing table with one lock per slot.
///
/// The table owns a copy of every key it holds. It exposes no direct access
/// to its slots: all mutations go through [`insert`][insert-fn] and
/// [`delete`][delete-fn], which lock one slot at a time while probing.
///
/// The capacity is fixed at creation. The table is shared by reference with
/// the workers of a batch, and is released by [`destroy`](#method.destroy)
/// (or by dropping it) once no batch borrows it anymore.
///
/// [insert-fn]: ./fn.insert.html
/// [delete-fn]: ./fn.delete.html
pub struct Table {
    slots: Box<[Mutex<Slot>]>,
}

impl Table {
    /// Creates a table of `capacity` never-used slots, each with its own lock.
    ///
    /// Fails if `capacity` is zero or if the storage cannot be reserved.
    /// Nothing is allocated on failure.
    pub fn create(capacity: usize) -> Result<Self, TableError> {
        if capacity == 0 {
            return Err(TableError::ZeroCapacity);
        }

        let mut slots = Vec::new();
        slots
            .try_reserve_exact(capacity)
            .map_err(|source| TableError::Allocation { capacity, source })?;
        slots.resize_with(capacity, Mutex::default);

        #[cfg(feature = "logging")]
        log::debug!("Created a table of {capacity} slots");

        Ok(Self {
            slots: slots.into_boxed_slice(),
        })
    }

    /// Releases every stored key and every lock.
    ///
    /// Taking `self` by value guarantees no batch is still running.
    pub fn destroy(self) {
        #[cfg(feature = "logging")]
        log::debug!("Destroying a table of {} slots", self.capacity());

        drop(self);
    }

    /// Returns the number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Counts the slots in each state.
    ///
    /// Slots are locked one at a time, so the counts are only exact when no
    /// batch is running.
    pub fn occupancy(&self) -> Occupancy {
        let mut occupancy = Occupancy::default();
        for slot in self.slots.iter() {
            match &*slot.lock() {
                Slot::Empty => occupancy.empty += 1,
                Slot::Occupied(_) => occupancy.occupied += 1,
                Slot::Tombstone => occupancy.tombstones += 1,
            }
        }
        occupancy
    }

    /// Returns the start of the probe sequence of `key`.
    #[inline]
    pub(crate) fn home(&self, key: &[u8]) -> usize {
        (fingerprint(key) % self.slots.len() as u64) as usize
    }

    /// Returns the position following `index`, wrapping around at the end.
    #[inline]
    pub(crate) fn next(&self, index: usize) -> usize {
        let next = index + 1;
        if next == self.slots.len() {
            0
        } else {
            next
        }
    }

    /// Locks the slot at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not below the capacity.
    #[inline]
    pub(crate) fn lock(&self, index: usize) -> MutexGuard<'_, Slot> {
        self.slots[index].lock()
    }
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("capacity", &self.capacity())
            .field("occupancy", &self.occupancy())
            .finish()
    }
}

/// The number of slots in each state, as returned by
/// [`Table::occupancy`](./struct.Table.html#method.occupancy).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Occupancy {
    /// Slots that never held a key.
    pub empty: usize,
    /// Slots holding a live key.
    pub occupied: usize,
    /// Slots whose key was deleted.
    pub tombstones: usize,
}

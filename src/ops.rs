//! Single-key operations on a [`Table`].
//!
//! Both operations probe linearly from the key's home position, locking one
//! slot at a time.

use crate::{error::TableError, table::Table};

/// Where a key ended up, as seen by one insertion or deletion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Outcome {
    slot: Option<usize>,
    found: bool,
}

impl Outcome {
    /// Returns the slot the key was placed in, found in or removed from.
    ///
    /// This is always `Some` for an insertion, and `None` for a deletion of
    /// an absent key.
    pub fn slot(&self) -> Option<usize> {
        self.slot
    }

    /// For an insertion, returns `true` if the key was already stored and
    /// nothing was changed. For a deletion, returns `true` if the key was
    /// found and removed.
    pub fn found(&self) -> bool {
        self.found
    }
}

/// The result of one insertion or deletion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Probe {
    outcome: Outcome,
    collisions: u64,
}

impl Probe {
    fn placed(slot: usize, collisions: u64) -> Self {
        Self {
            outcome: Outcome {
                slot: Some(slot),
                found: false,
            },
            collisions,
        }
    }

    fn existing(slot: usize) -> Self {
        Self {
            outcome: Outcome {
                slot: Some(slot),
                found: true,
            },
            collisions: 0,
        }
    }

    fn removed(slot: usize, collisions: u64) -> Self {
        Self {
            outcome: Outcome {
                slot: Some(slot),
                found: true,
            },
            collisions,
        }
    }

    fn absent() -> Self {
        Self {
            outcome: Outcome::default(),
            collisions: 0,
        }
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Returns the number of collisions charged to the batch for this
    /// operation.
    ///
    /// Operations that leave the table unchanged (inserting a key that is
    /// already there, deleting a key that is not) are charged nothing.
    pub fn collisions(&self) -> u64 {
        self.collisions
    }
}

/// Inserts a copy of `key` unless it is already stored.
///
/// The probe remembers the first tombstone it crosses and, once a never-used
/// slot proves the key is absent, stores the key in that tombstone instead.
/// Slots holding other keys count as collisions until the first tombstone is
/// seen, and not after.
///
/// # Panics
///
/// Panics if the probe goes around the whole table without finding a
/// never-used slot or a tombstone.
pub fn insert(table: &Table, key: &[u8]) -> Probe {
    loop {
        if let Some(probe) = try_insert(table, key) {
            return probe;
        }
        // The tombstone was claimed during the hand-off.
    }
}

fn try_insert(table: &Table, key: &[u8]) -> Option<Probe> {
    let mut pos = table.home(key);
    let mut first_tombstone = None;
    let mut collisions = 0;

    for _ in 0..table.capacity() {
        let mut slot = table.lock(pos);

        if slot.is_empty() {
            if let Some(target) = first_tombstone {
                drop(slot);
                return claim(table, target, key, collisions);
            }
            slot.fill(key);
            return Some(Probe::placed(pos, collisions));
        } else if slot.is_tombstone() {
            first_tombstone.get_or_insert(pos);
        } else if slot.holds(key) {
            return Some(Probe::existing(pos));
        } else if first_tombstone.is_none() {
            collisions += 1;
        }

        drop(slot);
        pos = table.next(pos);
    }

    // Every slot was visited and none holds the key.
    match first_tombstone {
        Some(target) => claim(table, target, key, collisions),
        None => panic!(
            "{}",
            TableError::CapacityExhausted {
                capacity: table.capacity()
            }
        ),
    }
}

/// Stores `key` in the tombstone at `target`, unless another worker took it
/// between the release of the probed slot and the lock of `target`.
fn claim(table: &Table, target: usize, key: &[u8], collisions: u64) -> Option<Probe> {
    let mut slot = table.lock(target);
    if !slot.is_tombstone() {
        return None;
    }
    slot.fill(key);
    Some(Probe::placed(target, collisions))
}

/// Deletes `key`, leaving a tombstone in its slot.
///
/// Every slot crossed before the key is found counts as a collision,
/// tombstones included.
pub fn delete(table: &Table, key: &[u8]) -> Probe {
    let mut pos = table.home(key);
    let mut collisions = 0;

    for _ in 0..table.capacity() {
        let mut slot = table.lock(pos);

        if slot.is_empty() {
            return Probe::absent();
        } else if slot.holds(key) {
            slot.bury();
            return Probe::removed(pos, collisions);
        }
        collisions += 1;

        drop(slot);
        pos = table.next(pos);
    }

    Probe::absent()
}

#[cfg(test)]
mod tests {
    use super::{claim, delete, insert};
    use crate::{common::test_utils::keys_with_home, table::Table};

    use crossbeam_utils::thread;
    use std::sync::Barrier;

    #[test]
    fn insert_then_find() {
        let table = Table::create(4).unwrap();

        for (key, expected) in [(b"a", 0), (b"b", 1), (b"c", 2)] {
            let probe = insert(&table, key);
            assert_eq!(probe.outcome().slot(), Some(expected));
            assert!(!probe.outcome().found());
            assert_eq!(probe.collisions(), 0);
        }

        let probe = insert(&table, b"a");
        assert_eq!(probe.outcome().slot(), Some(0));
        assert!(probe.outcome().found());
        assert_eq!(probe.collisions(), 0);

        assert_eq!(table.occupancy().occupied, 3);
    }

    #[test]
    fn insert_counts_occupied_slots_on_the_path() {
        let table = Table::create(16).unwrap();
        let keys = keys_with_home(16, 5, 4);

        for (n, key) in keys.iter().enumerate() {
            let probe = insert(&table, key.as_bytes());
            assert_eq!(probe.outcome().slot(), Some(5 + n));
            assert_eq!(probe.collisions(), n as u64);
        }

        // A duplicate deep in the chain is charged nothing.
        let probe = insert(&table, keys[3].as_bytes());
        assert!(probe.outcome().found());
        assert_eq!(probe.outcome().slot(), Some(8));
        assert_eq!(probe.collisions(), 0);
    }

    #[test]
    fn probe_wraps_around() {
        let table = Table::create(8).unwrap();
        let keys = keys_with_home(8, 7, 3);

        let slots: Vec<_> = keys
            .iter()
            .map(|k| insert(&table, k.as_bytes()).outcome().slot())
            .collect();
        assert_eq!(slots, vec![Some(7), Some(0), Some(1)]);

        let probe = delete(&table, keys[2].as_bytes());
        assert_eq!(probe.outcome().slot(), Some(1));
        assert_eq!(probe.collisions(), 2);
    }

    #[test]
    fn delete_is_inverse_of_insert() {
        let table = Table::create(8).unwrap();

        let inserted = insert(&table, b"key");
        let probe = delete(&table, b"key");
        assert!(probe.outcome().found());
        assert_eq!(probe.outcome().slot(), inserted.outcome().slot());

        let occupancy = table.occupancy();
        assert_eq!(occupancy.occupied, 0);
        assert_eq!(occupancy.tombstones, 1);

        let probe = delete(&table, b"key");
        assert!(!probe.outcome().found());
        assert_eq!(probe.outcome().slot(), None);
        assert_eq!(probe.collisions(), 0);
    }

    #[test]
    fn tombstone_is_reclaimed() {
        let table = Table::create(8).unwrap();
        let keys = keys_with_home(8, 2, 2);
        let (k1, k2) = (keys[0].as_bytes(), keys[1].as_bytes());

        assert_eq!(insert(&table, k1).outcome().slot(), Some(2));
        assert!(delete(&table, k1).outcome().found());

        let probe = insert(&table, k2);
        assert_eq!(probe.outcome().slot(), Some(2));
        assert!(!probe.outcome().found());
        assert_eq!(table.occupancy().tombstones, 0);
    }

    #[test]
    fn only_the_first_tombstone_is_reused() {
        let table = Table::create(16).unwrap();
        let keys = keys_with_home(16, 0, 5);
        let keys: Vec<_> = keys.iter().map(|k| k.as_bytes()).collect();

        for key in &keys[..4] {
            insert(&table, key);
        }
        // Tombstones at 1 and 3.
        delete(&table, keys[1]);
        delete(&table, keys[3]);

        let probe = insert(&table, keys[4]);
        assert_eq!(probe.outcome().slot(), Some(1));
        assert_eq!(table.occupancy().tombstones, 1);
    }

    #[test]
    fn existing_key_past_a_tombstone_is_found() {
        let table = Table::create(8).unwrap();
        let keys = keys_with_home(8, 4, 3);
        let keys: Vec<_> = keys.iter().map(|k| k.as_bytes()).collect();

        for key in &keys {
            insert(&table, key);
        }
        delete(&table, keys[0]);

        // The tombstone at 4 must not receive a second copy of keys[2].
        let probe = insert(&table, keys[2]);
        assert!(probe.outcome().found());
        assert_eq!(probe.outcome().slot(), Some(6));
        assert_eq!(table.occupancy().occupied, 2);
    }

    #[test]
    fn collision_counting_differs_between_insert_and_delete() {
        let table = Table::create(16).unwrap();
        let keys = keys_with_home(16, 3, 5);
        let keys: Vec<_> = keys.iter().map(|k| k.as_bytes()).collect();

        // Occupied 3, 4, 5, 6 then tombstone at 4.
        for key in &keys[..4] {
            insert(&table, key);
        }
        assert_eq!(delete(&table, keys[1]).collisions(), 1);

        // Delete crosses 3 (other key), 4 (tombstone) and 5 (other key).
        let probe = delete(&table, keys[3]);
        assert_eq!(probe.outcome().slot(), Some(6));
        assert_eq!(probe.collisions(), 3);

        // Insert crosses 3 (counted), 4 (first tombstone), 5 (not counted),
        // 6 (tombstone, not counted) and stops at 7, then reuses 4.
        let probe = insert(&table, keys[4]);
        assert_eq!(probe.outcome().slot(), Some(4));
        assert_eq!(probe.collisions(), 1);
    }

    #[test]
    fn full_table_reuses_tombstone_after_a_lap() {
        let table = Table::create(4).unwrap();
        let keys = keys_with_home(4, 0, 5);
        let keys: Vec<_> = keys.iter().map(|k| k.as_bytes()).collect();

        for key in &keys[..4] {
            insert(&table, key);
        }
        delete(&table, keys[2]);

        let probe = insert(&table, keys[4]);
        assert_eq!(probe.outcome().slot(), Some(2));
        assert!(!probe.outcome().found());

        // A delete of an absent key on a table without empty slots.
        let probe = delete(&table, b"missing");
        assert!(!probe.outcome().found());
    }

    #[test]
    fn claim_of_a_taken_tombstone_restarts() {
        let table = Table::create(8).unwrap();
        let keys = keys_with_home(8, 2, 3);
        let (k0, k1, k2) = (keys[0].as_bytes(), keys[1].as_bytes(), keys[2].as_bytes());

        insert(&table, k0);
        delete(&table, k0);
        assert_eq!(table.occupancy().tombstones, 1);

        // k1 reuses the tombstone at 2 before k2 gets to claim it.
        assert_eq!(insert(&table, k1).outcome().slot(), Some(2));
        assert!(claim(&table, 2, k2, 0).is_none());

        let probe = insert(&table, k2);
        assert_eq!(probe.outcome().slot(), Some(3));
        assert!(!probe.outcome().found());
        assert_eq!(probe.collisions(), 1);

        let occupancy = table.occupancy();
        assert_eq!(occupancy.occupied, 2);
        assert_eq!(occupancy.tombstones, 0);
        assert_eq!(insert(&table, k1).outcome().slot(), Some(2));
        assert_eq!(insert(&table, k2).outcome().slot(), Some(3));
    }

    #[test]
    #[should_panic(expected = "no reachable empty slot")]
    fn full_table_panics() {
        let table = Table::create(2).unwrap();
        insert(&table, b"x");
        insert(&table, b"y");
        insert(&table, b"z");
    }

    #[test]
    fn concurrent_inserts_of_the_same_keys() {
        const NUM_THREADS: usize = 8;
        const NUM_KEYS: usize = 256;

        let table = Table::create(1024).unwrap();
        let barrier = Barrier::new(NUM_THREADS);

        let placed: usize = thread::scope(|s| {
            let handles: Vec<_> = (0..NUM_THREADS)
                .map(|_| {
                    s.spawn(|_| {
                        barrier.wait();
                        (0..NUM_KEYS)
                            .filter(|i| {
                                let key = format!("key-{i}");
                                !insert(&table, key.as_bytes()).outcome().found()
                            })
                            .count()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).sum()
        })
        .unwrap();

        assert_eq!(placed, NUM_KEYS);
        assert_eq!(table.occupancy().occupied, NUM_KEYS);
    }
}

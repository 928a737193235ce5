use crate::fingerprint::fingerprint;

/// Returns the first `count` keys of the form `key-<n>` whose probe sequence
/// starts at `home` in a table of `capacity` slots.
pub(crate) fn keys_with_home(capacity: usize, home: usize, count: usize) -> Vec<String> {
    assert!(home < capacity);

    (0..)
        .map(|n| format!("key-{n}"))
        .filter(|key| (fingerprint(key.as_bytes()) % capacity as u64) as usize == home)
        .take(count)
        .collect()
}

#[test]
fn keys_share_their_home() {
    let keys = keys_with_home(8, 3, 4);
    assert_eq!(keys.len(), 4);
    for key in &keys {
        assert_eq!(fingerprint(key.as_bytes()) % 8, 3);
    }
}

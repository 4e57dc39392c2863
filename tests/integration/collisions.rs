//! Integration tests for colliding keys
//!
//! Keys that land in the same bucket must each stay reachable through
//! inserts, removals and copies.

use polyvar_core::{Dict, hash_key};

/// Finds `count` keys that all hash to the same bucket.
fn colliding_keys(buckets: usize, count: usize) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    let mut target = None;
    for i in 0.. {
        let key = format!("key{i}");
        let bucket = hash_key(&key, buckets);
        if *target.get_or_insert(bucket) == bucket {
            keys.push(key);
        }
        if keys.len() == count {
            break;
        }
    }
    keys
}

/// Inserts three colliding keys, removes the one at `victim`, and checks the rest.
fn remove_trial(victim: usize) {
    let buckets = 16;
    let keys = colliding_keys(buckets, 3);
    let mut dict = Dict::new(buckets).unwrap();
    for (value, key) in (0..).zip(&keys) {
        dict.insert_int(key, value).unwrap();
    }

    dict.remove(&keys[victim]).unwrap();

    assert_eq!(dict.len(), 2);
    for (value, key) in (0..).zip(&keys) {
        if value == i32::try_from(victim).unwrap() {
            assert!(!dict.contains_key(key));
        } else {
            assert_eq!(dict.get_int(key).unwrap(), value);
        }
    }
}

// =============================================================================
// Removal within a chain
// =============================================================================

#[test]
fn remove_first_inserted() {
    remove_trial(0);
}

#[test]
fn remove_middle() {
    remove_trial(1);
}

#[test]
fn remove_last_inserted() {
    remove_trial(2);
}

#[test]
fn remove_every_key_one_by_one() {
    let keys = colliding_keys(8, 6);
    let mut dict = Dict::new(8).unwrap();
    for key in &keys {
        dict.insert_str(key, key).unwrap();
    }
    for (removed, key) in keys.iter().enumerate() {
        assert_eq!(dict.remove(key).unwrap().as_str(), Some(key.as_str()));
        assert_eq!(dict.len(), keys.len() - removed - 1);
        for rest in &keys[removed + 1..] {
            assert_eq!(dict.get_str(rest).unwrap(), *rest);
        }
    }
    assert!(dict.is_empty());
}

// =============================================================================
// Overwrites and copies within a chain
// =============================================================================

#[test]
fn overwrite_inside_chain_keeps_neighbours() {
    let keys = colliding_keys(4, 3);
    let mut dict = Dict::new(4).unwrap();
    for key in &keys {
        dict.insert_long(key, 0).unwrap();
    }
    dict.insert_long(&keys[1], 5).unwrap();

    assert_eq!(dict.len(), 3);
    assert_eq!(dict.get_long(&keys[0]).unwrap(), 0);
    assert_eq!(dict.get_long(&keys[1]).unwrap(), 5);
    assert_eq!(dict.get_long(&keys[2]).unwrap(), 0);
}

#[test]
fn copy_preserves_chain_order() {
    let keys = colliding_keys(4, 5);
    let mut dict = Dict::new(4).unwrap();
    for key in &keys {
        dict.insert_int(key, 1).unwrap();
    }

    let copy = dict.copy().unwrap();
    let original: Vec<&str> = dict.iter().map(|(k, _)| k).collect();
    let copied: Vec<&str> = copy.iter().map(|(k, _)| k).collect();
    assert_eq!(original, copied);

    // New entries go to the head of their chain
    let expected: Vec<&str> = keys.iter().rev().map(String::as_str).collect();
    assert_eq!(original, expected);
}

#[test]
fn single_bucket_holds_everything() {
    let mut dict = Dict::new(1).unwrap();
    for i in 0..50 {
        dict.insert_int(&format!("k{i}"), i).unwrap();
    }
    for i in (0..50).step_by(2) {
        dict.remove(&format!("k{i}")).unwrap();
    }
    assert_eq!(dict.len(), 25);
    for i in (1..50).step_by(2) {
        assert_eq!(dict.get_int(&format!("k{i}")).unwrap(), i);
    }
}

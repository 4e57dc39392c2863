//! Integration tests for Dict
//!
//! Tests both insert policies, update-only set, removal and exports.

use polyvar_core::{ContainerConfig, Dict, ErrorKind, Kind, List, Variant, hash_key};

fn sorted_keys(dict: &Dict) -> Vec<String> {
    let mut keys: Vec<String> = dict.iter().map(|(k, _)| k.to_string()).collect();
    keys.sort();
    keys
}

// =============================================================================
// Creation
// =============================================================================

#[test]
fn new_dict_is_empty() {
    let dict = Dict::new(8).unwrap();
    assert!(dict.is_empty());
    assert_eq!(dict.bucket_count(), 8);
    assert_eq!(dict.max_load_factor(), None);
}

#[test]
fn zero_buckets_is_rejected() {
    let err = Dict::new(0).unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidCapacity { requested: 0 });
}

#[test]
fn from_config_uses_buckets_and_load_factor() {
    let config = ContainerConfig::rehashing().with_dict_buckets(4);
    let dict = Dict::from_config(&config).unwrap();
    assert_eq!(dict.bucket_count(), 4);
    assert_eq!(dict.max_load_factor(), Some(0.75));
}

// =============================================================================
// Insert policies
// =============================================================================

#[test]
fn insert_overwrites_across_kinds() {
    let mut dict = Dict::new(4).unwrap();
    dict.insert_int("k", 1).unwrap();
    dict.insert_str("k", "one").unwrap();
    assert_eq!(dict.len(), 1);
    assert_eq!(dict.kind_of("k").unwrap(), Kind::String);
    assert_eq!(dict.get_str("k").unwrap(), "one");
}

#[test]
fn try_insert_rejects_existing_key() {
    let mut dict = Dict::new(4).unwrap();
    dict.try_insert_long("k", 1).unwrap();
    let err = dict.try_insert_long("k", 2).unwrap_err();
    assert_eq!(err.kind, ErrorKind::KeyExists("k".to_string()));
    assert_eq!(dict.get_long("k").unwrap(), 1);
}

#[test]
fn try_insert_rejects_for_every_kind() {
    let mut dict = Dict::new(4).unwrap();
    dict.insert_int("k", 0).unwrap();

    assert!(dict.try_insert_str("k", "s").is_err());
    assert!(dict.try_insert_int("k", 1).is_err());
    assert!(dict.try_insert_long("k", 1).is_err());
    assert!(dict.try_insert_double("k", 1.0).is_err());
    assert!(dict.try_insert_float("k", 1.0).is_err());
    assert!(dict.try_insert_list("k", &List::default()).is_err());
    assert!(dict.try_insert_dict("k", &Dict::default()).is_err());
    assert!(dict.try_insert_variant("k", &Variant::Int(1)).is_err());
    assert_eq!(dict.get_int("k").unwrap(), 0);
}

#[test]
fn set_requires_existing_key() {
    let mut dict = Dict::new(4).unwrap();
    let err = dict.set_double("missing", 1.0).unwrap_err();
    assert!(err.is_key_not_found());
    assert!(dict.is_empty());

    dict.insert_double("present", 1.0).unwrap();
    dict.set_double("present", 2.5).unwrap();
    assert!((dict.get_double("present").unwrap() - 2.5).abs() < f64::EPSILON);
}

#[test]
fn set_may_change_kind() {
    let mut dict = Dict::new(4).unwrap();
    dict.insert_str("k", "text").unwrap();
    dict.set_float("k", 1.5).unwrap();
    assert_eq!(dict.kind_of("k").unwrap(), Kind::Float);
}

// =============================================================================
// Typed access
// =============================================================================

#[test]
fn get_wrong_kind_is_type_mismatch() {
    let mut dict = Dict::new(4).unwrap();
    dict.insert_int("n", 5).unwrap();
    let err = dict.get_str("n").unwrap_err();
    assert_eq!(
        err.kind,
        ErrorKind::TypeMismatch {
            expected: Kind::String,
            actual: Kind::Int
        }
    );
}

#[test]
fn get_missing_key() {
    let dict = Dict::new(4).unwrap();
    assert!(dict.get_int("nope").unwrap_err().is_key_not_found());
    assert!(dict.kind_of("nope").unwrap_err().is_key_not_found());
    assert!(dict.get("nope").is_none());
    assert!(!dict.contains_key("nope"));
}

#[test]
fn keys_are_case_sensitive() {
    let mut dict = Dict::new(4).unwrap();
    dict.insert_int("Key", 1).unwrap();
    dict.insert_int("key", 2).unwrap();
    assert_eq!(dict.len(), 2);
    assert_eq!(dict.get_int("Key").unwrap(), 1);
}

#[test]
fn empty_string_is_a_valid_key() {
    let mut dict = Dict::new(4).unwrap();
    dict.insert_str("", "blank").unwrap();
    assert_eq!(dict.get_str("").unwrap(), "blank");
}

// =============================================================================
// Removal
// =============================================================================

#[test]
fn remove_returns_value() {
    let mut dict = Dict::new(4).unwrap();
    dict.insert_str("a", "x").unwrap();
    assert_eq!(dict.remove("a").unwrap(), Variant::from("x"));
    assert!(dict.is_empty());
    assert!(dict.remove("a").unwrap_err().is_key_not_found());
}

#[test]
fn remove_from_shared_bucket() {
    let buckets = 16;
    let target = hash_key("alpha", buckets);
    let mut colliding = vec!["alpha".to_string()];
    let mut i = 0;
    while colliding.len() < 4 {
        let candidate = format!("k{i}");
        if hash_key(&candidate, buckets) == target {
            colliding.push(candidate);
        }
        i += 1;
    }

    let mut dict = Dict::new(buckets).unwrap();
    for (n, key) in colliding.iter().enumerate() {
        dict.insert_int(key, i32::try_from(n).unwrap()).unwrap();
    }

    dict.remove(&colliding[2]).unwrap();
    assert_eq!(dict.len(), 3);
    for (n, key) in colliding.iter().enumerate() {
        if n == 2 {
            assert!(!dict.contains_key(key));
        } else {
            assert_eq!(dict.get_int(key).unwrap(), i32::try_from(n).unwrap());
        }
    }
}

#[test]
fn empty_then_reuse() {
    let mut dict = Dict::new(2).unwrap();
    for i in 0..10 {
        dict.insert_int(&format!("k{i}"), i).unwrap();
    }
    dict.empty();
    assert!(dict.is_empty());
    assert_eq!(dict.bucket_count(), 2);

    dict.insert_int("k0", 99).unwrap();
    assert_eq!(dict.get_int("k0").unwrap(), 99);
}

// =============================================================================
// Exports
// =============================================================================

#[test]
fn keys_and_values_line_up() {
    let mut dict = Dict::new(8).unwrap();
    dict.insert_int("one", 1).unwrap();
    dict.insert_int("two", 2).unwrap();
    dict.insert_int("three", 3).unwrap();

    let keys = dict.keys().unwrap();
    let values = dict.values().unwrap();
    assert_eq!(keys.len(), 3);
    assert_eq!(values.len(), 3);
    for i in 0..keys.len() {
        let key = keys.get_str(i).unwrap();
        assert_eq!(dict.get_int(&key).unwrap(), values.get_int(i).unwrap());
    }
}

#[test]
fn exports_of_empty_dict_are_empty() {
    let dict = Dict::new(8).unwrap();
    assert!(dict.keys().unwrap().is_empty());
    assert!(dict.values().unwrap().is_empty());
}

#[test]
fn values_keep_nested_dicts_whole() {
    let mut inner = Dict::new(2).unwrap();
    inner.insert_int("x", 1).unwrap();
    let mut outer = Dict::new(2).unwrap();
    outer.insert_dict("inner", &inner).unwrap();

    let values = outer.values().unwrap();
    assert_eq!(values.len(), 1);
    assert_eq!(values.get_dict(0).unwrap(), inner);
}

// =============================================================================
// Rehashing
// =============================================================================

#[test]
fn fixed_buckets_never_grow() {
    let mut dict = Dict::new(2).unwrap();
    for i in 0..100 {
        dict.insert_int(&format!("k{i}"), i).unwrap();
    }
    assert_eq!(dict.bucket_count(), 2);
    assert_eq!(dict.len(), 100);
}

#[test]
fn rehashing_keeps_every_key() {
    let config = ContainerConfig::rehashing().with_dict_buckets(2);
    let mut dict = Dict::from_config(&config).unwrap();
    for i in 0..100 {
        dict.insert_int(&format!("k{i}"), i).unwrap();
    }
    assert!(dict.bucket_count() > 2);
    assert!(dict.len() as f64 / dict.bucket_count() as f64 <= 0.75);
    for i in 0..100 {
        assert_eq!(dict.get_int(&format!("k{i}")).unwrap(), i);
    }
}

// =============================================================================
// Copies and equality
// =============================================================================

#[test]
fn copy_is_equal_and_independent() {
    let mut dict = Dict::new(4).unwrap();
    dict.insert_str("a", "x").unwrap();
    dict.insert_long("b", 2).unwrap();

    let mut copy = dict.copy().unwrap();
    assert_eq!(copy, dict);
    assert_eq!(copy.bucket_count(), dict.bucket_count());

    copy.set_str("a", "changed").unwrap();
    assert_eq!(dict.get_str("a").unwrap(), "x");
    assert_ne!(copy, dict);
}

#[test]
fn equality_ignores_bucket_count() {
    let mut a = Dict::new(1).unwrap();
    let mut b = Dict::new(32).unwrap();
    for key in ["x", "y", "z"] {
        a.insert_str(key, key).unwrap();
        b.insert_str(key, key).unwrap();
    }
    assert_eq!(a, b);
    assert_eq!(sorted_keys(&a), sorted_keys(&b));
}

//! String-keyed hash table of variants using separate chaining.
//!
//! Keys hash with DJB2 (`hash * 33 + byte`, seeded at 5381) modulo the bucket
//! count. New entries are prepended to their bucket's chain. The bucket count
//! is fixed unless the dictionary was built with a maximum load factor.

use std::fmt;

use tracing::{debug, warn};

use crate::config::{ContainerConfig, DEFAULT_DICT_BUCKETS};
use crate::error::{Error, Operation, Resource, Result};
use crate::kind::Kind;
use crate::list::List;
use crate::variant::{Variant, copy_str};

type Link = Option<Box<Entry>>;

/// A chain node owning one key and its value.
struct Entry {
    key: String,
    value: Variant,
    next: Link,
}

/// Iterator over the nodes of one bucket, head first.
struct Chain<'a> {
    next: Option<&'a Entry>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a Entry;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.next?;
        self.next = entry.next.as_deref();
        Some(entry)
    }
}

/// How a store treats an existing or missing key.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Store {
    /// Overwrite an existing key, or create it.
    Upsert,
    /// Create the key; fail if it exists.
    Create,
    /// Overwrite an existing key; fail if it is missing.
    Update,
}

/// DJB2 hash of `key` reduced to a bucket index.
///
/// Bytes are widened as unsigned, so non-ASCII UTF-8 bytes (`0x80` and up)
/// add their value in `128..=255` rather than a sign-extended negative.
///
/// # Panics
///
/// Panics if `buckets` is zero.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn hash_key(key: &str, buckets: usize) -> usize {
    let hash = key.bytes().fold(5381u64, |hash, byte| {
        hash.wrapping_mul(33).wrapping_add(u64::from(byte))
    });
    // The remainder is below `buckets`, so it fits in usize.
    (hash % buckets as u64) as usize
}

/// Generates the overwrite, reject, update and get methods for one scalar kind.
macro_rules! scalar_family {
    ($kind:ident, $ty:ty, $name:literal, $insert:ident, $try_insert:ident, $set:ident, $get:ident) => {
        #[doc = concat!("Inserts ", $name, " under `key`, overwriting any existing value.")]
        ///
        /// # Errors
        ///
        /// Returns an error if the key cannot be allocated.
        pub fn $insert(&mut self, key: &str, value: $ty) -> Result<()> {
            self.store(key, Operation::DictInsert(Kind::$kind), Store::Upsert, |_| {
                Ok(Variant::$kind(value))
            })
        }

        #[doc = concat!("Inserts ", $name, " under a new `key`.")]
        ///
        /// # Errors
        ///
        /// Returns an error if `key` already exists or cannot be allocated.
        pub fn $try_insert(&mut self, key: &str, value: $ty) -> Result<()> {
            self.store(key, Operation::DictTryInsert(Kind::$kind), Store::Create, |_| {
                Ok(Variant::$kind(value))
            })
        }

        #[doc = concat!("Replaces the value under an existing `key` with ", $name, ".")]
        ///
        /// # Errors
        ///
        /// Returns an error if `key` is missing.
        pub fn $set(&mut self, key: &str, value: $ty) -> Result<()> {
            self.store(key, Operation::DictSet(Kind::$kind), Store::Update, |_| {
                Ok(Variant::$kind(value))
            })
        }

        #[doc = concat!("Returns ", $name, " stored under `key`.")]
        ///
        /// # Errors
        ///
        /// Returns an error if `key` is missing or holds another kind.
        pub fn $get(&self, key: &str) -> Result<$ty> {
            let op = Operation::DictGet(Kind::$kind);
            match self.value(key, op)? {
                Variant::$kind(n) => Ok(*n),
                other => Err(Error::type_mismatch(op, Kind::$kind, other.kind())),
            }
        }
    };
}

/// A hash table mapping unique string keys to variants.
///
/// Values are deep-copied on insert and on typed reads, exactly as for
/// [`List`]. Two insert families are provided: `insert_*` overwrites an
/// existing key in place, `try_insert_*` rejects it with
/// [`ErrorKind::KeyExists`](crate::ErrorKind::KeyExists). `set_*` only
/// overwrites and fails on a missing key.
pub struct Dict {
    buckets: Vec<Link>,
    count: usize,
    max_load_factor: Option<f64>,
}

impl Dict {
    /// Creates a dictionary with a fixed number of buckets.
    ///
    /// # Errors
    ///
    /// Returns an error if `buckets` is zero or the bucket array cannot be allocated.
    pub fn new(buckets: usize) -> Result<Self> {
        Self::with_buckets(buckets, None, Operation::DictCreate)
    }

    /// Creates a dictionary sized by `config.dict_buckets`, rehashing at
    /// `config.max_load_factor` if set.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn from_config(config: &ContainerConfig) -> Result<Self> {
        config.validate()?;
        Self::with_buckets(
            config.dict_buckets,
            config.max_load_factor,
            Operation::DictCreate,
        )
    }

    fn with_buckets(buckets: usize, max_load_factor: Option<f64>, op: Operation) -> Result<Self> {
        if buckets < 1 {
            return Err(Error::invalid_capacity(op, buckets));
        }
        Ok(Self {
            buckets: alloc_buckets(buckets, op)?,
            count: 0,
            max_load_factor,
        })
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns true if the dictionary has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns the number of buckets.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the rehash threshold, if rehashing is enabled.
    #[must_use]
    pub fn max_load_factor(&self) -> Option<f64> {
        self.max_load_factor
    }

    /// Returns true if `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.find(key).is_some()
    }

    /// Borrows the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Variant> {
        self.find(key).map(|entry| &entry.value)
    }

    /// Returns an iterator over entries, bucket by bucket and head first
    /// within each bucket.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Variant)> {
        self.buckets
            .iter()
            .flat_map(|head| Chain {
                next: head.as_deref(),
            })
            .map(|entry| (entry.key.as_str(), &entry.value))
    }

    fn bucket_of(&self, key: &str) -> usize {
        hash_key(key, self.buckets.len())
    }

    fn chain(&self, bucket: usize) -> Chain<'_> {
        Chain {
            next: self.buckets[bucket].as_deref(),
        }
    }

    fn find(&self, key: &str) -> Option<&Entry> {
        self.chain(self.bucket_of(key)).find(|entry| entry.key == key)
    }

    fn find_mut(&mut self, key: &str) -> Option<&mut Entry> {
        let bucket = self.bucket_of(key);
        let mut cursor = self.buckets[bucket].as_deref_mut();
        while let Some(entry) = cursor {
            if entry.key == key {
                return Some(entry);
            }
            cursor = entry.next.as_deref_mut();
        }
        None
    }

    fn value(&self, key: &str, op: Operation) -> Result<&Variant> {
        self.get(key).ok_or_else(|| Error::key_not_found(op, key))
    }

    /// Stores a value built by `make`, after the key policy has been checked.
    fn store<F>(&mut self, key: &str, op: Operation, mode: Store, make: F) -> Result<()>
    where
        F: FnOnce(Operation) -> Result<Variant>,
    {
        let exists = self.contains_key(key);
        match mode {
            Store::Create if exists => return Err(Error::key_exists(op, key)),
            Store::Update if !exists => return Err(Error::key_not_found(op, key)),
            _ => {}
        }

        let value = make(op)?;
        if let Some(entry) = self.find_mut(key) {
            // Assigning drops the previous payload, whatever its kind.
            entry.value = value;
            return Ok(());
        }

        let key = copy_str(key, op, Resource::Key)?;
        let bucket = self.bucket_of(&key);
        let next = self.buckets[bucket].take();
        self.buckets[bucket] = Some(Box::new(Entry { key, value, next }));
        self.count += 1;
        self.maybe_rehash(op);
        Ok(())
    }

    #[allow(clippy::cast_precision_loss)]
    fn maybe_rehash(&mut self, op: Operation) {
        let Some(max) = self.max_load_factor else {
            return;
        };
        if self.count as f64 / self.buckets.len() as f64 <= max {
            return;
        }
        let Some(target) = self.buckets.len().checked_mul(2) else {
            return;
        };
        // A failed rehash leaves the table valid, only more loaded.
        match alloc_buckets(target, op) {
            Ok(buckets) => self.relink(buckets),
            Err(e) => warn!(error = %e, "dict rehash skipped"),
        }
    }

    /// Moves every node into `buckets`, rehashed for the new bucket count.
    fn relink(&mut self, buckets: Vec<Link>) {
        let old = std::mem::replace(&mut self.buckets, buckets);
        debug!(old = old.len(), new = self.buckets.len(), "dict rehashed");
        for mut link in old {
            while let Some(mut entry) = link {
                link = entry.next.take();
                let bucket = self.bucket_of(&entry.key);
                entry.next = self.buckets[bucket].take();
                self.buckets[bucket] = Some(entry);
            }
        }
    }

    // =========================================================================
    // Composite inserts
    // =========================================================================

    /// Inserts a copy of `value` under `key`, overwriting any existing value.
    ///
    /// # Errors
    ///
    /// Returns an error if the key or string cannot be allocated.
    pub fn insert_str(&mut self, key: &str, value: &str) -> Result<()> {
        self.store(key, Operation::DictInsert(Kind::String), Store::Upsert, |op| {
            copy_str(value, op, Resource::String).map(Variant::String)
        })
    }

    /// Inserts a deep copy of `value` under `key`, overwriting any existing value.
    ///
    /// # Errors
    ///
    /// Returns an error if the key or the copy cannot be allocated.
    pub fn insert_list(&mut self, key: &str, value: &List) -> Result<()> {
        self.store(key, Operation::DictInsert(Kind::List), Store::Upsert, |op| {
            copy_list(value, op)
        })
    }

    /// Inserts a deep copy of `value` under `key`, overwriting any existing value.
    ///
    /// # Errors
    ///
    /// Returns an error if the key or the copy cannot be allocated.
    pub fn insert_dict(&mut self, key: &str, value: &Dict) -> Result<()> {
        self.store(key, Operation::DictInsert(Kind::Dict), Store::Upsert, |op| {
            copy_dict(value, op)
        })
    }

    /// Inserts a deep copy of an arbitrary variant, overwriting any existing value.
    ///
    /// # Errors
    ///
    /// Returns an error if the key or the copy cannot be allocated.
    pub fn insert_variant(&mut self, key: &str, value: &Variant) -> Result<()> {
        let op = Operation::DictInsert(value.kind());
        self.store(key, op, Store::Upsert, |op| value.copy_for(op))
    }

    /// Inserts a copy of `value` under a new `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if `key` already exists or an allocation fails.
    pub fn try_insert_str(&mut self, key: &str, value: &str) -> Result<()> {
        self.store(key, Operation::DictTryInsert(Kind::String), Store::Create, |op| {
            copy_str(value, op, Resource::String).map(Variant::String)
        })
    }

    /// Inserts a deep copy of `value` under a new `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if `key` already exists or an allocation fails.
    pub fn try_insert_list(&mut self, key: &str, value: &List) -> Result<()> {
        self.store(key, Operation::DictTryInsert(Kind::List), Store::Create, |op| {
            copy_list(value, op)
        })
    }

    /// Inserts a deep copy of `value` under a new `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if `key` already exists or an allocation fails.
    pub fn try_insert_dict(&mut self, key: &str, value: &Dict) -> Result<()> {
        self.store(key, Operation::DictTryInsert(Kind::Dict), Store::Create, |op| {
            copy_dict(value, op)
        })
    }

    /// Inserts a deep copy of an arbitrary variant under a new `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if `key` already exists or an allocation fails.
    pub fn try_insert_variant(&mut self, key: &str, value: &Variant) -> Result<()> {
        let op = Operation::DictTryInsert(value.kind());
        self.store(key, op, Store::Create, |op| value.copy_for(op))
    }

    // =========================================================================
    // Composite reads and updates
    // =========================================================================

    /// Returns a copy of the string under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if `key` is missing, holds another kind, or the copy
    /// cannot be allocated.
    pub fn get_str(&self, key: &str) -> Result<String> {
        let op = Operation::DictGet(Kind::String);
        match self.value(key, op)? {
            Variant::String(s) => copy_str(s, op, Resource::String),
            other => Err(Error::type_mismatch(op, Kind::String, other.kind())),
        }
    }

    /// Returns a deep copy of the list under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if `key` is missing, holds another kind, or the copy
    /// cannot be allocated.
    pub fn get_list(&self, key: &str) -> Result<List> {
        let op = Operation::DictGet(Kind::List);
        match self.value(key, op)? {
            Variant::List(list) => list.copy().map_err(|e| e.during(op)),
            other => Err(Error::type_mismatch(op, Kind::List, other.kind())),
        }
    }

    /// Returns a deep copy of the dictionary under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if `key` is missing, holds another kind, or the copy
    /// cannot be allocated.
    pub fn get_dict(&self, key: &str) -> Result<Dict> {
        let op = Operation::DictGet(Kind::Dict);
        match self.value(key, op)? {
            Variant::Dict(dict) => dict.copy().map_err(|e| e.during(op)),
            other => Err(Error::type_mismatch(op, Kind::Dict, other.kind())),
        }
    }

    /// Replaces the value under an existing `key` with a copy of `value`.
    ///
    /// # Errors
    ///
    /// Returns an error if `key` is missing or the copy cannot be allocated.
    pub fn set_str(&mut self, key: &str, value: &str) -> Result<()> {
        self.store(key, Operation::DictSet(Kind::String), Store::Update, |op| {
            copy_str(value, op, Resource::String).map(Variant::String)
        })
    }

    /// Replaces the value under an existing `key` with a deep copy of `value`.
    ///
    /// # Errors
    ///
    /// Returns an error if `key` is missing or the copy cannot be allocated.
    pub fn set_list(&mut self, key: &str, value: &List) -> Result<()> {
        self.store(key, Operation::DictSet(Kind::List), Store::Update, |op| {
            copy_list(value, op)
        })
    }

    /// Replaces the value under an existing `key` with a deep copy of `value`.
    ///
    /// # Errors
    ///
    /// Returns an error if `key` is missing or the copy cannot be allocated.
    pub fn set_dict(&mut self, key: &str, value: &Dict) -> Result<()> {
        self.store(key, Operation::DictSet(Kind::Dict), Store::Update, |op| {
            copy_dict(value, op)
        })
    }

    // =========================================================================
    // Scalars
    // =========================================================================

    scalar_family!(Int, i32, "an int", insert_int, try_insert_int, set_int, get_int);
    scalar_family!(Long, i64, "a long", insert_long, try_insert_long, set_long, get_long);
    scalar_family!(
        Double,
        f64,
        "a double",
        insert_double,
        try_insert_double,
        set_double,
        get_double
    );
    scalar_family!(
        Float,
        f32,
        "a float",
        insert_float,
        try_insert_float,
        set_float,
        get_float
    );

    // =========================================================================
    // Removal, queries and export
    // =========================================================================

    /// Returns the kind stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if `key` is missing.
    pub fn kind_of(&self, key: &str) -> Result<Kind> {
        self.value(key, Operation::DictKindOf).map(Variant::kind)
    }

    /// Unlinks and returns the value stored under `key`.
    ///
    /// Head, middle and tail nodes are unlinked the same way: the walk keeps a
    /// handle on the link that points at the current node and splices it.
    ///
    /// # Errors
    ///
    /// Returns an error if `key` is missing.
    pub fn remove(&mut self, key: &str) -> Result<Variant> {
        let bucket = self.bucket_of(key);
        let mut link = &mut self.buckets[bucket];
        while link.as_ref().is_some_and(|entry| entry.key != key) {
            if let Some(entry) = link {
                link = &mut entry.next;
            }
        }
        let Some(mut entry) = link.take() else {
            return Err(Error::key_not_found(Operation::DictRemove, key));
        };
        *link = entry.next.take();
        self.count -= 1;
        let Entry { value, .. } = *entry;
        Ok(value)
    }

    /// Exports a copy of every key into a new list, in iteration order.
    ///
    /// # Errors
    ///
    /// Returns an error if an allocation fails.
    pub fn keys(&self) -> Result<List> {
        let op = Operation::DictKeys;
        let mut keys = List::new(self.count.max(1)).map_err(|e| e.during(op))?;
        for (key, _) in self.iter() {
            keys.push_str(key).map_err(|e| e.during(op))?;
        }
        Ok(keys)
    }

    /// Exports a deep copy of every value into a new list, in iteration order.
    ///
    /// Nested dictionaries are copied whole, not flattened.
    ///
    /// # Errors
    ///
    /// Returns an error if an allocation fails.
    pub fn values(&self) -> Result<List> {
        let op = Operation::DictValues;
        let mut values = List::new(self.count.max(1)).map_err(|e| e.during(op))?;
        for (_, value) in self.iter() {
            values.push_variant(value).map_err(|e| e.during(op))?;
        }
        Ok(values)
    }

    /// Drops every entry, keeping the bucket array.
    pub fn empty(&mut self) {
        for head in &mut self.buckets {
            // Unlink iteratively so long chains do not recurse on drop.
            let mut link = head.take();
            while let Some(mut entry) = link {
                link = entry.next.take();
            }
        }
        self.count = 0;
    }

    /// Produces an independent dictionary with the same bucket count, rebuilding
    /// each chain in its original order from deep-copied keys and values.
    ///
    /// # Errors
    ///
    /// Returns an error if any allocation fails; no partial copy escapes.
    pub fn copy(&self) -> Result<Dict> {
        self.copy_chains()
            .inspect_err(|e| warn!(error = %e, "dict copy failed"))
    }

    fn copy_chains(&self) -> Result<Dict> {
        let op = Operation::DictCopy;
        let mut copy = Self::with_buckets(self.buckets.len(), self.max_load_factor, op)?;
        for (bucket, head) in copy.buckets.iter_mut().enumerate() {
            let mut tail = head;
            for entry in self.chain(bucket) {
                let node = Box::new(Entry {
                    key: copy_str(&entry.key, op, Resource::Key)?,
                    value: entry.value.copy_for(op)?,
                    next: None,
                });
                tail = &mut tail.insert(node).next;
            }
        }
        copy.count = self.count;
        Ok(copy)
    }
}

fn alloc_buckets(count: usize, op: Operation) -> Result<Vec<Link>> {
    let mut buckets = Vec::new();
    buckets
        .try_reserve_exact(count)
        .map_err(|_| Error::allocation_failed(op, Resource::Buckets))?;
    buckets.resize_with(count, || None);
    Ok(buckets)
}

fn copy_list(value: &List, op: Operation) -> Result<Variant> {
    value.copy().map(Variant::List).map_err(|e| e.during(op))
}

fn copy_dict(value: &Dict, op: Operation) -> Result<Variant> {
    value.copy().map(Variant::Dict).map_err(|e| e.during(op))
}

impl Drop for Dict {
    fn drop(&mut self) {
        self.empty();
    }
}

impl Clone for Dict {
    fn clone(&self) -> Self {
        let mut buckets: Vec<Link> = std::iter::repeat_with(|| None)
            .take(self.buckets.len())
            .collect();
        for (bucket, head) in buckets.iter_mut().enumerate() {
            let mut tail = head;
            for entry in self.chain(bucket) {
                let node = Box::new(Entry {
                    key: entry.key.clone(),
                    value: entry.value.clone(),
                    next: None,
                });
                tail = &mut tail.insert(node).next;
            }
        }
        Self {
            buckets,
            count: self.count,
            max_load_factor: self.max_load_factor,
        }
    }
}

impl Default for Dict {
    fn default() -> Self {
        Self {
            buckets: std::iter::repeat_with(|| None)
                .take(DEFAULT_DICT_BUCKETS)
                .collect(),
            count: 0,
            max_load_factor: None,
        }
    }
}

/// Structural equality: same key set with equal values per key.
/// Bucket count and chain order are not compared.
impl PartialEq for Dict {
    fn eq(&self, other: &Self) -> bool {
        self.count == other.count
            && self
                .iter()
                .all(|(key, value)| other.get(key).is_some_and(|v| v == value))
    }
}

impl fmt::Debug for Dict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

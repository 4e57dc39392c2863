//! Error types for container operations.
//!
//! Every fallible operation returns [`Result`]. An [`Error`] names the
//! [`Operation`] that failed and the [`ErrorKind`] describing why, which
//! together identify the failure as precisely as a flat status code would.

use std::fmt;

use thiserror::Error;

use crate::kind::Kind;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for container operations.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{op}: {kind}")]
pub struct Error {
    /// The operation that failed.
    pub op: Operation,
    /// What went wrong.
    pub kind: ErrorKind,
}

impl Error {
    /// Creates a new error for the given operation.
    #[must_use]
    pub fn new(op: Operation, kind: ErrorKind) -> Self {
        Self { op, kind }
    }

    /// Creates an invalid capacity error.
    #[must_use]
    pub fn invalid_capacity(op: Operation, requested: usize) -> Self {
        Self::new(op, ErrorKind::InvalidCapacity { requested })
    }

    /// Creates an index out of bounds error.
    #[must_use]
    pub fn index_out_of_bounds(op: Operation, index: usize, length: usize) -> Self {
        Self::new(op, ErrorKind::IndexOutOfBounds { index, length })
    }

    /// Creates a type mismatch error.
    #[must_use]
    pub fn type_mismatch(op: Operation, expected: Kind, actual: Kind) -> Self {
        Self::new(op, ErrorKind::TypeMismatch { expected, actual })
    }

    /// Creates an allocation failure error.
    #[must_use]
    pub fn allocation_failed(op: Operation, resource: Resource) -> Self {
        Self::new(op, ErrorKind::AllocationFailed(resource))
    }

    /// Creates a key not found error.
    #[must_use]
    pub fn key_not_found(op: Operation, key: &str) -> Self {
        Self::new(op, ErrorKind::KeyNotFound(key.to_owned()))
    }

    /// Creates a key already exists error.
    #[must_use]
    pub fn key_exists(op: Operation, key: &str) -> Self {
        Self::new(op, ErrorKind::KeyExists(key.to_owned()))
    }

    /// Re-attributes this error to an enclosing operation, keeping its kind.
    ///
    /// Used when a nested deep copy fails inside a push, insert or set.
    #[must_use]
    pub fn during(mut self, op: Operation) -> Self {
        self.op = op;
        self
    }

    /// Returns true if this is an index out of bounds error.
    #[must_use]
    pub const fn is_out_of_bounds(&self) -> bool {
        matches!(self.kind, ErrorKind::IndexOutOfBounds { .. })
    }

    /// Returns true if this is a type mismatch error.
    #[must_use]
    pub const fn is_type_mismatch(&self) -> bool {
        matches!(self.kind, ErrorKind::TypeMismatch { .. })
    }

    /// Returns true if this is a key not found error.
    #[must_use]
    pub const fn is_key_not_found(&self) -> bool {
        matches!(self.kind, ErrorKind::KeyNotFound(_))
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ErrorKind {
    /// A container was created with fewer than one slot or bucket.
    #[error("capacity must be at least 1, got {requested}")]
    InvalidCapacity {
        /// The rejected capacity.
        requested: usize,
    },

    /// Index at or beyond the live element count.
    #[error("index out of bounds: {index} (length {length})")]
    IndexOutOfBounds {
        /// The index that was accessed.
        index: usize,
        /// The number of live elements.
        length: usize,
    },

    /// The stored kind differs from the requested kind.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// The kind the caller asked for.
        expected: Kind,
        /// The kind actually stored.
        actual: Kind,
    },

    /// Memory for a slot array, bucket array, key or string could not be reserved.
    #[error("allocation failed: {0}")]
    AllocationFailed(Resource),

    /// The key is not present.
    #[error("key not found: {0:?}")]
    KeyNotFound(String),

    /// The key is already present and the operation does not overwrite.
    #[error("key already exists: {0:?}")]
    KeyExists(String),

    /// Rehash threshold must be positive and finite.
    #[error("invalid load factor: {0}")]
    InvalidLoadFactor(f64),
}

/// What was being allocated when an allocation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// The slot array backing a list.
    ListSlots,
    /// The bucket array backing a dictionary.
    Buckets,
    /// A dictionary key.
    Key,
    /// A string payload.
    String,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ListSlots => write!(f, "list slots"),
            Self::Buckets => write!(f, "dictionary buckets"),
            Self::Key => write!(f, "dictionary key"),
            Self::String => write!(f, "string payload"),
        }
    }
}

/// The container operation an error originated from.
///
/// Typed operations carry the [`Kind`] they were called for, so a failed
/// `get_str` is distinguishable from a failed `get_int` on the same index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// `List::new` / `List::from_config`.
    ListCreate,
    /// `List::copy`.
    ListCopy,
    /// `List::push_*`.
    ListPush(Kind),
    /// `List::get_*`.
    ListGet(Kind),
    /// `List::set_*`.
    ListSet(Kind),
    /// `List::remove`.
    ListRemove,
    /// `List::kind_at`.
    ListKindAt,
    /// `Dict::new` / `Dict::from_config`.
    DictCreate,
    /// `Dict::copy`.
    DictCopy,
    /// `Dict::insert_*` (overwrites an existing key).
    DictInsert(Kind),
    /// `Dict::try_insert_*` (rejects an existing key).
    DictTryInsert(Kind),
    /// `Dict::get_*`.
    DictGet(Kind),
    /// `Dict::set_*`.
    DictSet(Kind),
    /// `Dict::remove`.
    DictRemove,
    /// `Dict::kind_of`.
    DictKindOf,
    /// `Dict::keys`.
    DictKeys,
    /// `Dict::values`.
    DictValues,
    /// `ContainerConfig::validate`.
    Config,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ListCreate => write!(f, "list create"),
            Self::ListCopy => write!(f, "list copy"),
            Self::ListPush(kind) => write!(f, "list push {kind}"),
            Self::ListGet(kind) => write!(f, "list get {kind}"),
            Self::ListSet(kind) => write!(f, "list set {kind}"),
            Self::ListRemove => write!(f, "list remove"),
            Self::ListKindAt => write!(f, "list kind_at"),
            Self::DictCreate => write!(f, "dict create"),
            Self::DictCopy => write!(f, "dict copy"),
            Self::DictInsert(kind) => write!(f, "dict insert {kind}"),
            Self::DictTryInsert(kind) => write!(f, "dict try_insert {kind}"),
            Self::DictGet(kind) => write!(f, "dict get {kind}"),
            Self::DictSet(kind) => write!(f, "dict set {kind}"),
            Self::DictRemove => write!(f, "dict remove"),
            Self::DictKindOf => write!(f, "dict kind_of"),
            Self::DictKeys => write!(f, "dict keys"),
            Self::DictValues => write!(f, "dict values"),
            Self::Config => write!(f, "config"),
        }
    }
}

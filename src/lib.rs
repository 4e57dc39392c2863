//! Polyvar - dynamically typed values and the containers that hold them
//!
//! This crate re-exports the core layer for convenient access.
//! For detailed documentation, see [`polyvar_core`].
//!
//! # Architecture
//!
//! ```text
//! Dict     - string-keyed chained hash table of Variants
//! List     - growable index-addressed sequence of Variants
//! Variant  - tagged value: none, string, int, long, double, float, list, dict
//! Error    - failing operation plus failure kind
//! ```

pub use polyvar_core as containers;

pub use polyvar_core::{
    ContainerConfig, Dict, Error, ErrorKind, Kind, List, Operation, Result, Variant,
};

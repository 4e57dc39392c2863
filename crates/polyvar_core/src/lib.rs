//! Dynamically typed value containers.
//!
//! This crate provides:
//! - [`Variant`] - A tagged value: none, string, int, long, double, float, list or dict
//! - [`List`] - A growable, index-addressed sequence of variants
//! - [`Dict`] - A string-keyed hash table of variants with separate chaining
//! - [`Error`] - Errors naming the failed [`Operation`] and its [`ErrorKind`]
//! - [`ContainerConfig`] - Default sizing and optional dictionary rehashing
//!
//! Lists and dictionaries nest through [`Variant`]. Every store deep-copies its
//! argument, so each container owns an independent, acyclic value tree.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod dict;
pub mod error;
pub mod kind;
pub mod list;
pub mod variant;

pub use config::ContainerConfig;
pub use dict::{Dict, hash_key};
pub use error::{Error, ErrorKind, Operation, Resource, Result};
pub use kind::Kind;
pub use list::List;
pub use variant::{Variant, doubles_equal, floats_equal};

//! Configuration for container construction.

use crate::error::{Error, ErrorKind, Operation, Result};

/// Default slot count for lists built from a default configuration.
pub const DEFAULT_LIST_CAPACITY: usize = 8;

/// Default bucket count for dictionaries built from a default configuration.
pub const DEFAULT_DICT_BUCKETS: usize = 16;

/// Sizing and growth settings for lists and dictionaries.
///
/// The default keeps the dictionary's bucket count fixed for its lifetime.
/// Setting a maximum load factor opts into rehashing: once an insertion pushes
/// `len / bucket_count` above the threshold, the bucket array doubles.
#[derive(Clone, Debug, PartialEq)]
pub struct ContainerConfig {
    /// Initial slot count for new lists.
    pub list_capacity: usize,

    /// Bucket count for new dictionaries.
    pub dict_buckets: usize,

    /// Load factor above which a dictionary doubles its buckets (`None` = never).
    pub max_load_factor: Option<f64>,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            list_capacity: DEFAULT_LIST_CAPACITY,
            dict_buckets: DEFAULT_DICT_BUCKETS,
            max_load_factor: None,
        }
    }
}

impl ContainerConfig {
    /// Creates a configuration with rehashing enabled at a load factor of 0.75.
    #[must_use]
    pub fn rehashing() -> Self {
        Self {
            max_load_factor: Some(0.75),
            ..Self::default()
        }
    }

    /// Builder method to set the initial list capacity.
    #[must_use]
    pub fn with_list_capacity(mut self, capacity: usize) -> Self {
        self.list_capacity = capacity;
        self
    }

    /// Builder method to set the dictionary bucket count.
    #[must_use]
    pub fn with_dict_buckets(mut self, buckets: usize) -> Self {
        self.dict_buckets = buckets;
        self
    }

    /// Builder method to set or clear the rehash threshold.
    #[must_use]
    pub fn with_max_load_factor(mut self, factor: Option<f64>) -> Self {
        self.max_load_factor = factor;
        self
    }

    /// Checks that every setting is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if a capacity is zero or the load factor is not a
    /// positive finite number.
    pub fn validate(&self) -> Result<()> {
        if self.list_capacity < 1 {
            return Err(Error::invalid_capacity(
                Operation::Config,
                self.list_capacity,
            ));
        }
        if self.dict_buckets < 1 {
            return Err(Error::invalid_capacity(Operation::Config, self.dict_buckets));
        }
        if let Some(factor) = self
            .max_load_factor
            .filter(|f| !(f.is_finite() && *f > 0.0))
        {
            return Err(Error::new(
                Operation::Config,
                ErrorKind::InvalidLoadFactor(factor),
            ));
        }
        Ok(())
    }
}

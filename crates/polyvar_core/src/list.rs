//! Growable, index-addressed list of variants.
//!
//! Every slot in the backing array is a live [`Variant`]: slots `[0, len)` hold
//! the elements, slots `[len, capacity)` are always [`Variant::None`]. The array
//! doubles when full and never shrinks on removal.

use std::fmt;
use std::iter::FromIterator;

use tracing::{debug, warn};

use crate::config::{ContainerConfig, DEFAULT_LIST_CAPACITY};
use crate::dict::Dict;
use crate::error::{Error, Operation, Resource, Result};
use crate::kind::Kind;
use crate::variant::{Variant, copy_str};

/// An insertion-ordered sequence of variants.
///
/// Composite arguments (`&str`, `&List`, `&Dict`, `&Variant`) are deep-copied
/// on the way in, and composite results are deep-copied on the way out, so no
/// two containers ever share a payload.
#[derive(Clone)]
pub struct List {
    slots: Vec<Variant>,
    count: usize,
}

impl List {
    /// Creates a list with `capacity` empty slots.
    ///
    /// # Errors
    ///
    /// Returns an error if `capacity` is zero or the slots cannot be allocated.
    pub fn new(capacity: usize) -> Result<Self> {
        Self::with_slots(capacity, Operation::ListCreate)
    }

    /// Creates a list sized by `config.list_capacity`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn from_config(config: &ContainerConfig) -> Result<Self> {
        config.validate()?;
        Self::new(config.list_capacity)
    }

    fn with_slots(capacity: usize, op: Operation) -> Result<Self> {
        if capacity < 1 {
            return Err(Error::invalid_capacity(op, capacity));
        }
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(capacity)
            .map_err(|_| Error::allocation_failed(op, Resource::ListSlots))?;
        slots.resize_with(capacity, Variant::default);
        Ok(Self { slots, count: 0 })
    }

    /// Returns the number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns true if the list holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns the number of allocated slots.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Borrows the element at `index`, if live.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Variant> {
        self.live().get(index)
    }

    /// Returns an iterator over the live elements.
    pub fn iter(&self) -> std::slice::Iter<'_, Variant> {
        self.live().iter()
    }

    fn live(&self) -> &[Variant] {
        &self.slots[..self.count]
    }

    fn slot(&self, index: usize, op: Operation) -> Result<&Variant> {
        self.live()
            .get(index)
            .ok_or_else(|| Error::index_out_of_bounds(op, index, self.count))
    }

    fn check_index(&self, index: usize, op: Operation) -> Result<()> {
        self.slot(index, op).map(|_| ())
    }

    /// Doubles the slot array when every slot is in use.
    fn ensure_capacity(&mut self, op: Operation) -> Result<()> {
        let old_capacity = self.slots.len();
        if self.count < old_capacity {
            return Ok(());
        }
        let new_capacity = old_capacity
            .checked_mul(2)
            .ok_or_else(|| Error::allocation_failed(op, Resource::ListSlots))?;
        self.slots
            .try_reserve_exact(new_capacity - old_capacity)
            .map_err(|_| Error::allocation_failed(op, Resource::ListSlots))?;
        self.slots.resize_with(new_capacity, Variant::default);
        debug!(old = old_capacity, new = new_capacity, "list grew");
        Ok(())
    }

    fn push_owned(&mut self, value: Variant, op: Operation) -> Result<()> {
        self.ensure_capacity(op)?;
        self.slots[self.count] = value;
        self.count += 1;
        Ok(())
    }

    fn replace(&mut self, index: usize, value: Variant) {
        // Assigning drops the previous payload, whatever its kind.
        self.slots[index] = value;
    }

    // =========================================================================
    // Append
    // =========================================================================

    /// Appends a copy of `value`.
    ///
    /// # Errors
    ///
    /// Returns an error if the string or a larger slot array cannot be allocated.
    pub fn push_str(&mut self, value: &str) -> Result<()> {
        let op = Operation::ListPush(Kind::String);
        let value = copy_str(value, op, Resource::String)?;
        self.push_owned(Variant::String(value), op)
    }

    /// Appends an int.
    ///
    /// # Errors
    ///
    /// Returns an error if a larger slot array cannot be allocated.
    pub fn push_int(&mut self, value: i32) -> Result<()> {
        self.push_owned(Variant::Int(value), Operation::ListPush(Kind::Int))
    }

    /// Appends a long.
    ///
    /// # Errors
    ///
    /// Returns an error if a larger slot array cannot be allocated.
    pub fn push_long(&mut self, value: i64) -> Result<()> {
        self.push_owned(Variant::Long(value), Operation::ListPush(Kind::Long))
    }

    /// Appends a double.
    ///
    /// # Errors
    ///
    /// Returns an error if a larger slot array cannot be allocated.
    pub fn push_double(&mut self, value: f64) -> Result<()> {
        self.push_owned(Variant::Double(value), Operation::ListPush(Kind::Double))
    }

    /// Appends a float.
    ///
    /// # Errors
    ///
    /// Returns an error if a larger slot array cannot be allocated.
    pub fn push_float(&mut self, value: f32) -> Result<()> {
        self.push_owned(Variant::Float(value), Operation::ListPush(Kind::Float))
    }

    /// Appends a deep copy of `value`.
    ///
    /// # Errors
    ///
    /// Returns an error if the copy or a larger slot array cannot be allocated.
    pub fn push_list(&mut self, value: &List) -> Result<()> {
        let op = Operation::ListPush(Kind::List);
        let value = value.copy().map_err(|e| e.during(op))?;
        self.push_owned(Variant::List(value), op)
    }

    /// Appends a deep copy of `value`.
    ///
    /// # Errors
    ///
    /// Returns an error if the copy or a larger slot array cannot be allocated.
    pub fn push_dict(&mut self, value: &Dict) -> Result<()> {
        let op = Operation::ListPush(Kind::Dict);
        let value = value.copy().map_err(|e| e.during(op))?;
        self.push_owned(Variant::Dict(value), op)
    }

    /// Appends a deep copy of an arbitrary variant.
    ///
    /// # Errors
    ///
    /// Returns an error if the copy or a larger slot array cannot be allocated.
    pub fn push_variant(&mut self, value: &Variant) -> Result<()> {
        let op = Operation::ListPush(value.kind());
        let value = value.copy_for(op)?;
        self.push_owned(value, op)
    }

    // =========================================================================
    // Typed access
    // =========================================================================

    /// Returns the kind stored at `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of bounds.
    pub fn kind_at(&self, index: usize) -> Result<Kind> {
        self.slot(index, Operation::ListKindAt).map(Variant::kind)
    }

    /// Returns a copy of the string at `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of bounds, the element is not a
    /// string, or the copy cannot be allocated.
    pub fn get_str(&self, index: usize) -> Result<String> {
        let op = Operation::ListGet(Kind::String);
        match self.slot(index, op)? {
            Variant::String(s) => copy_str(s, op, Resource::String),
            other => Err(Error::type_mismatch(op, Kind::String, other.kind())),
        }
    }

    /// Returns the int at `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of bounds or the element is not an int.
    pub fn get_int(&self, index: usize) -> Result<i32> {
        let op = Operation::ListGet(Kind::Int);
        match self.slot(index, op)? {
            Variant::Int(n) => Ok(*n),
            other => Err(Error::type_mismatch(op, Kind::Int, other.kind())),
        }
    }

    /// Returns the long at `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of bounds or the element is not a long.
    pub fn get_long(&self, index: usize) -> Result<i64> {
        let op = Operation::ListGet(Kind::Long);
        match self.slot(index, op)? {
            Variant::Long(n) => Ok(*n),
            other => Err(Error::type_mismatch(op, Kind::Long, other.kind())),
        }
    }

    /// Returns the double at `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of bounds or the element is not a double.
    pub fn get_double(&self, index: usize) -> Result<f64> {
        let op = Operation::ListGet(Kind::Double);
        match self.slot(index, op)? {
            Variant::Double(n) => Ok(*n),
            other => Err(Error::type_mismatch(op, Kind::Double, other.kind())),
        }
    }

    /// Returns the float at `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of bounds or the element is not a float.
    pub fn get_float(&self, index: usize) -> Result<f32> {
        let op = Operation::ListGet(Kind::Float);
        match self.slot(index, op)? {
            Variant::Float(n) => Ok(*n),
            other => Err(Error::type_mismatch(op, Kind::Float, other.kind())),
        }
    }

    /// Returns a deep copy of the list at `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of bounds, the element is not a
    /// list, or the copy cannot be allocated.
    pub fn get_list(&self, index: usize) -> Result<List> {
        let op = Operation::ListGet(Kind::List);
        match self.slot(index, op)? {
            Variant::List(list) => list.copy().map_err(|e| e.during(op)),
            other => Err(Error::type_mismatch(op, Kind::List, other.kind())),
        }
    }

    /// Returns a deep copy of the dictionary at `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of bounds, the element is not a
    /// dictionary, or the copy cannot be allocated.
    pub fn get_dict(&self, index: usize) -> Result<Dict> {
        let op = Operation::ListGet(Kind::Dict);
        match self.slot(index, op)? {
            Variant::Dict(dict) => dict.copy().map_err(|e| e.during(op)),
            other => Err(Error::type_mismatch(op, Kind::Dict, other.kind())),
        }
    }

    // =========================================================================
    // Replace
    // =========================================================================

    /// Replaces the element at `index` with a copy of `value`.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of bounds or the copy cannot be allocated.
    pub fn set_str(&mut self, index: usize, value: &str) -> Result<()> {
        let op = Operation::ListSet(Kind::String);
        self.check_index(index, op)?;
        let value = copy_str(value, op, Resource::String)?;
        self.replace(index, Variant::String(value));
        Ok(())
    }

    /// Replaces the element at `index` with an int.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of bounds.
    pub fn set_int(&mut self, index: usize, value: i32) -> Result<()> {
        self.check_index(index, Operation::ListSet(Kind::Int))?;
        self.replace(index, Variant::Int(value));
        Ok(())
    }

    /// Replaces the element at `index` with a long.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of bounds.
    pub fn set_long(&mut self, index: usize, value: i64) -> Result<()> {
        self.check_index(index, Operation::ListSet(Kind::Long))?;
        self.replace(index, Variant::Long(value));
        Ok(())
    }

    /// Replaces the element at `index` with a double.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of bounds.
    pub fn set_double(&mut self, index: usize, value: f64) -> Result<()> {
        self.check_index(index, Operation::ListSet(Kind::Double))?;
        self.replace(index, Variant::Double(value));
        Ok(())
    }

    /// Replaces the element at `index` with a float.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of bounds.
    pub fn set_float(&mut self, index: usize, value: f32) -> Result<()> {
        self.check_index(index, Operation::ListSet(Kind::Float))?;
        self.replace(index, Variant::Float(value));
        Ok(())
    }

    /// Replaces the element at `index` with a deep copy of `value`.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of bounds or the copy cannot be allocated.
    pub fn set_list(&mut self, index: usize, value: &List) -> Result<()> {
        let op = Operation::ListSet(Kind::List);
        self.check_index(index, op)?;
        let value = value.copy().map_err(|e| e.during(op))?;
        self.replace(index, Variant::List(value));
        Ok(())
    }

    /// Replaces the element at `index` with a deep copy of `value`.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of bounds or the copy cannot be allocated.
    pub fn set_dict(&mut self, index: usize, value: &Dict) -> Result<()> {
        let op = Operation::ListSet(Kind::Dict);
        self.check_index(index, op)?;
        let value = value.copy().map_err(|e| e.during(op))?;
        self.replace(index, Variant::Dict(value));
        Ok(())
    }

    // =========================================================================
    // Removal and queries
    // =========================================================================

    /// Removes the element at `index`, shifting later elements down by one.
    ///
    /// The vacated tail slot is left as [`Variant::None`]; capacity is unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of bounds; the list is left untouched.
    pub fn remove(&mut self, index: usize) -> Result<Variant> {
        self.check_index(index, Operation::ListRemove)?;
        let removed = self.slots[index].take();
        self.slots[index..self.count].rotate_left(1);
        self.count -= 1;
        Ok(removed)
    }

    /// Returns true if any element equals `probe`.
    #[must_use]
    pub fn contains(&self, probe: &Variant) -> bool {
        self.iter().any(|element| element == probe)
    }

    /// Drops every element, keeping the slot array and its capacity.
    pub fn empty(&mut self) {
        for slot in &mut self.slots[..self.count] {
            slot.clear();
        }
        self.count = 0;
    }

    /// Produces an independent list with the same capacity and deep-copied elements.
    ///
    /// # Errors
    ///
    /// Returns an error if any allocation fails; no partial copy escapes.
    pub fn copy(&self) -> Result<List> {
        self.copy_elements().inspect_err(|e| warn!(error = %e, "list copy failed"))
    }

    fn copy_elements(&self) -> Result<List> {
        let op = Operation::ListCopy;
        let mut copy = Self::with_slots(self.capacity(), op)?;
        for (target, source) in copy.slots.iter_mut().zip(self.live()) {
            *target = source.copy_for(op)?;
        }
        copy.count = self.count;
        Ok(copy)
    }
}

impl Default for List {
    fn default() -> Self {
        Self {
            slots: std::iter::repeat_with(Variant::default)
                .take(DEFAULT_LIST_CAPACITY)
                .collect(),
            count: 0,
        }
    }
}

/// Structural equality: same length and pairwise equal elements in order.
/// Capacity is not compared.
impl PartialEq for List {
    fn eq(&self, other: &Self) -> bool {
        self.live() == other.live()
    }
}

impl fmt::Debug for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl FromIterator<Variant> for List {
    fn from_iter<I: IntoIterator<Item = Variant>>(iter: I) -> Self {
        let mut slots: Vec<Variant> = iter.into_iter().collect();
        let count = slots.len();
        if slots.is_empty() {
            slots.push(Variant::None);
        }
        Self { slots, count }
    }
}

impl<'a> IntoIterator for &'a List {
    type Item = &'a Variant;
    type IntoIter = std::slice::Iter<'a, Variant>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

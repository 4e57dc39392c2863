//! The tagged value stored in every list slot and dictionary entry.

use std::fmt;

use crate::dict::Dict;
use crate::error::{Error, Operation, Resource, Result};
use crate::kind::Kind;
use crate::list::List;

/// A single dynamically typed value.
///
/// A variant exclusively owns its string, list or dictionary payload; storing
/// a variant into a container always stores an independent deep copy.
/// [`Variant::default`] is [`Variant::None`], the ownership-free empty slot.
#[derive(Clone, Default)]
pub enum Variant {
    /// Empty slot.
    #[default]
    None,
    /// Owned string.
    String(String),
    /// 32-bit signed integer.
    Int(i32),
    /// 64-bit signed integer.
    Long(i64),
    /// 64-bit floating point.
    Double(f64),
    /// 32-bit floating point.
    Float(f32),
    /// Nested list.
    List(List),
    /// Nested dictionary.
    Dict(Dict),
}

impl Variant {
    /// Returns the kind of this variant.
    #[must_use]
    pub const fn kind(&self) -> Kind {
        match self {
            Self::None => Kind::None,
            Self::String(_) => Kind::String,
            Self::Int(_) => Kind::Int,
            Self::Long(_) => Kind::Long,
            Self::Double(_) => Kind::Double,
            Self::Float(_) => Kind::Float,
            Self::List(_) => Kind::List,
            Self::Dict(_) => Kind::Dict,
        }
    }

    /// Returns true if this slot is empty.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Releases any owned payload and resets the variant to [`Variant::None`].
    ///
    /// Clearing an empty variant does nothing, so clearing twice is harmless.
    pub fn clear(&mut self) {
        if !self.is_none() {
            *self = Self::None;
        }
    }

    /// Takes the value out, leaving [`Variant::None`] in its place.
    #[must_use]
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }

    /// Deep copy using fallible allocation, attributing failures to `op`.
    pub(crate) fn copy_for(&self, op: Operation) -> Result<Self> {
        Ok(match self {
            Self::None => Self::None,
            Self::String(s) => Self::String(copy_str(s, op, Resource::String)?),
            Self::Int(n) => Self::Int(*n),
            Self::Long(n) => Self::Long(*n),
            Self::Double(n) => Self::Double(*n),
            Self::Float(n) => Self::Float(*n),
            Self::List(list) => Self::List(list.copy().map_err(|e| e.during(op))?),
            Self::Dict(dict) => Self::Dict(dict.copy().map_err(|e| e.during(op))?),
        })
    }

    /// Attempts to extract a string reference.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to extract an int value.
    #[must_use]
    pub const fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to extract a long value.
    #[must_use]
    pub const fn as_long(&self) -> Option<i64> {
        match self {
            Self::Long(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to extract a double value.
    #[must_use]
    pub const fn as_double(&self) -> Option<f64> {
        match self {
            Self::Double(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to extract a float value.
    #[must_use]
    pub const fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to extract a list reference.
    #[must_use]
    pub const fn as_list(&self) -> Option<&List> {
        match self {
            Self::List(list) => Some(list),
            _ => None,
        }
    }

    /// Attempts to extract a dictionary reference.
    #[must_use]
    pub const fn as_dict(&self) -> Option<&Dict> {
        match self {
            Self::Dict(dict) => Some(dict),
            _ => None,
        }
    }
}

/// Duplicates a string, reporting allocation failure instead of aborting.
pub(crate) fn copy_str(s: &str, op: Operation, resource: Resource) -> Result<String> {
    let mut out = String::new();
    out.try_reserve_exact(s.len())
        .map_err(|_| Error::allocation_failed(op, resource))?;
    out.push_str(s);
    Ok(out)
}

/// Doubles compare within `f64::EPSILON`, scaled by magnitude above 1.0.
#[must_use]
pub fn doubles_equal(a: f64, b: f64) -> bool {
    a == b || (a - b).abs() <= f64::EPSILON * a.abs().max(b.abs()).max(1.0)
}

/// Floats compare within `f32::EPSILON`, scaled by magnitude above 1.0.
#[must_use]
pub fn floats_equal(a: f32, b: f32) -> bool {
    a == b || (a - b).abs() <= f32::EPSILON * a.abs().max(b.abs()).max(1.0)
}

// Float kinds use tolerance rather than bit equality, so this is not `Eq`.
impl PartialEq for Variant {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::None, Self::None) => true,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Long(a), Self::Long(b)) => a == b,
            (Self::Double(a), Self::Double(b)) => doubles_equal(*a, *b),
            (Self::Float(a), Self::Float(b)) => floats_equal(*a, *b),
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Dict(a), Self::Dict(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Long(n) => write!(f, "{n}L"),
            Self::Double(n) => write!(f, "{n:?}"),
            Self::Float(n) => write!(f, "{n:?}f"),
            Self::List(list) => write!(f, "{list:?}"),
            Self::Dict(dict) => write!(f, "{dict:?}"),
        }
    }
}

// Convenience From implementations

impl From<i32> for Variant {
    fn from(n: i32) -> Self {
        Self::Int(n)
    }
}

impl From<i64> for Variant {
    fn from(n: i64) -> Self {
        Self::Long(n)
    }
}

impl From<f64> for Variant {
    fn from(n: f64) -> Self {
        Self::Double(n)
    }
}

impl From<f32> for Variant {
    fn from(n: f32) -> Self {
        Self::Float(n)
    }
}

impl From<&str> for Variant {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for Variant {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<List> for Variant {
    fn from(list: List) -> Self {
        Self::List(list)
    }
}

impl From<Dict> for Variant {
    fn from(dict: Dict) -> Self {
        Self::Dict(dict)
    }
}

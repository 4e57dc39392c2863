//! Kind descriptors for stored variants.

use std::fmt;

/// The kind of payload a [`Variant`](crate::Variant) currently holds.
///
/// Typed accessors on [`List`](crate::List) and [`Dict`](crate::Dict) name the
/// kind they expect; a mismatch is reported with both kinds.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Kind {
    /// Empty slot.
    #[default]
    None,
    /// Owned UTF-8 string.
    String,
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    Long,
    /// 64-bit floating point.
    Double,
    /// 32-bit floating point.
    Float,
    /// Nested list.
    List,
    /// Nested dictionary.
    Dict,
}

impl Kind {
    /// All kinds, in declaration order.
    pub const ALL: [Kind; 8] = [
        Self::None,
        Self::String,
        Self::Int,
        Self::Long,
        Self::Double,
        Self::Float,
        Self::List,
        Self::Dict,
    ];

    /// Lowercase name used in error messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::String => "string",
            Self::Int => "int",
            Self::Long => "long",
            Self::Double => "double",
            Self::Float => "float",
            Self::List => "list",
            Self::Dict => "dict",
        }
    }
}

impl fmt::Debug for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

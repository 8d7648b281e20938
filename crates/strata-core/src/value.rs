//! Slot values and their storage extents.
//!
//! A [`Value`] is the dynamically-typed content of one slot. Each scalar
//! kind has a fixed size and alignment ([`ValueKind::size`],
//! [`ValueKind::align`]) that the layout engine consumes; string slots
//! occupy a fixed four-byte cell in the record block (an index into the
//! record's string pool) so that variable-length payloads never disturb
//! the computed layout.

use std::fmt;

/// Classification of a scalar slot's storage type.
///
/// `Str` counts as a scalar for layout purposes: its in-block cell is a
/// `u32` string-pool index. Nested record slots are not a `ValueKind`;
/// their extent comes from the nested schema's own layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// One-byte boolean.
    Bool,
    /// Signed 8-bit integer.
    I8,
    /// Signed 16-bit integer.
    I16,
    /// Signed 32-bit integer.
    I32,
    /// Signed 64-bit integer.
    I64,
    /// Unsigned 8-bit integer.
    U8,
    /// Unsigned 16-bit integer.
    U16,
    /// Unsigned 32-bit integer.
    U32,
    /// Unsigned 64-bit integer.
    U64,
    /// 32-bit float.
    F32,
    /// 64-bit float.
    F64,
    /// Immutable string; the in-block cell is a `u32` pool index.
    Str,
}

impl ValueKind {
    /// Size in bytes of this kind's cell in the record block.
    pub fn size(self) -> usize {
        match self {
            Self::Bool | Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::I32 | Self::U32 | Self::F32 | Self::Str => 4,
            Self::I64 | Self::U64 | Self::F64 => 8,
        }
    }

    /// Alignment of this kind's cell. Always a power of two.
    pub fn align(self) -> usize {
        self.size()
    }

    /// Human-readable kind name for diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Str => "str",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The dynamically-typed content of one slot.
///
/// Scalar variants correspond one-to-one with [`ValueKind`]; `Record`
/// carries positional values for a nested record slot (used for
/// initialization and whole-subtree assignment).
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Boolean value.
    Bool(bool),
    /// Signed 8-bit integer value.
    I8(i8),
    /// Signed 16-bit integer value.
    I16(i16),
    /// Signed 32-bit integer value.
    I32(i32),
    /// Signed 64-bit integer value.
    I64(i64),
    /// Unsigned 8-bit integer value.
    U8(u8),
    /// Unsigned 16-bit integer value.
    U16(u16),
    /// Unsigned 32-bit integer value.
    U32(u32),
    /// Unsigned 64-bit integer value.
    U64(u64),
    /// 32-bit float value.
    F32(f32),
    /// 64-bit float value.
    F64(f64),
    /// String value.
    Str(String),
    /// Positional values of a nested record, in declaration order.
    Record(Vec<Value>),
}

impl Value {
    /// The scalar kind of this value, or `None` for `Record`.
    pub fn kind(&self) -> Option<ValueKind> {
        match self {
            Self::Bool(_) => Some(ValueKind::Bool),
            Self::I8(_) => Some(ValueKind::I8),
            Self::I16(_) => Some(ValueKind::I16),
            Self::I32(_) => Some(ValueKind::I32),
            Self::I64(_) => Some(ValueKind::I64),
            Self::U8(_) => Some(ValueKind::U8),
            Self::U16(_) => Some(ValueKind::U16),
            Self::U32(_) => Some(ValueKind::U32),
            Self::U64(_) => Some(ValueKind::U64),
            Self::F32(_) => Some(ValueKind::F32),
            Self::F64(_) => Some(ValueKind::F64),
            Self::Str(_) => Some(ValueKind::Str),
            Self::Record(_) => None,
        }
    }

    /// Kind name for diagnostics (`"record"` for nested values).
    pub fn kind_name(&self) -> &'static str {
        match self.kind() {
            Some(kind) => kind.name(),
            None => "record",
        }
    }

    /// The default value for a scalar kind: zero, `false`, or empty string.
    pub fn default_for(kind: ValueKind) -> Value {
        match kind {
            ValueKind::Bool => Value::Bool(false),
            ValueKind::I8 => Value::I8(0),
            ValueKind::I16 => Value::I16(0),
            ValueKind::I32 => Value::I32(0),
            ValueKind::I64 => Value::I64(0),
            ValueKind::U8 => Value::U8(0),
            ValueKind::U16 => Value::U16(0),
            ValueKind::U32 => Value::U32(0),
            ValueKind::U64 => Value::U64(0),
            ValueKind::F32 => Value::F32(0.0),
            ValueKind::F64 => Value::F64(0.0),
            ValueKind::Str => Value::Str(String::new()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::I8(v) => write!(f, "{v}"),
            Self::I16(v) => write!(f, "{v}"),
            Self::I32(v) => write!(f, "{v}"),
            Self::I64(v) => write!(f, "{v}"),
            Self::U8(v) => write!(f, "{v}"),
            Self::U16(v) => write!(f, "{v}"),
            Self::U32(v) => write!(f, "{v}"),
            Self::U64(v) => write!(f, "{v}"),
            Self::F32(v) => write!(f, "{v}"),
            Self::F64(v) => write!(f, "{v}"),
            Self::Str(v) => write!(f, "\"{v}\""),
            Self::Record(vs) => {
                f.write_str("(")?;
                for (i, v) in vs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{v}")?;
                }
                f.write_str(")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_KINDS: [ValueKind; 12] = [
        ValueKind::Bool,
        ValueKind::I8,
        ValueKind::I16,
        ValueKind::I32,
        ValueKind::I64,
        ValueKind::U8,
        ValueKind::U16,
        ValueKind::U32,
        ValueKind::U64,
        ValueKind::F32,
        ValueKind::F64,
        ValueKind::Str,
    ];

    #[test]
    fn align_is_power_of_two_and_equals_size() {
        for kind in ALL_KINDS {
            assert!(kind.align().is_power_of_two(), "{kind}");
            assert_eq!(kind.align(), kind.size(), "{kind}");
        }
    }

    #[test]
    fn default_matches_kind() {
        for kind in ALL_KINDS {
            assert_eq!(Value::default_for(kind).kind(), Some(kind));
        }
    }

    #[test]
    fn str_cell_is_a_pool_index() {
        assert_eq!(ValueKind::Str.size(), 4);
        assert_eq!(ValueKind::Str.align(), 4);
    }

    #[test]
    fn record_value_has_no_scalar_kind() {
        let v = Value::Record(vec![Value::I32(1), Value::Bool(true)]);
        assert_eq!(v.kind(), None);
        assert_eq!(v.kind_name(), "record");
        assert_eq!(v.to_string(), "(1, true)");
    }

    #[test]
    fn equality_is_by_value() {
        assert_eq!(Value::I32(42), Value::I32(42));
        assert_ne!(Value::I32(42), Value::I32(137));
        assert_ne!(Value::Str("foo".into()), Value::Str("bar".into()));
    }
}

//! Read-only state inspection.
//!
//! Devices expose their internal latches through dotted query paths so
//! tests and debuggers can look inside without reaching into private
//! fields. Queries never affect emulation state.

use std::fmt;

/// A dynamically-typed value returned by a state query.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    /// Signed counters (mouse remainders, attenuation deltas).
    I32(i32),
    /// Derived analogue quantities (motor RPM, output gain).
    F32(f32),
    String(String),
    List(Vec<Value>),
}

impl Value {
    /// Interpret the value as an unsigned integer, if it is one.
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Value::Bool(v) => Some(u64::from(v)),
            Value::U8(v) => Some(u64::from(v)),
            Value::U16(v) => Some(u64::from(v)),
            Value::U32(v) => Some(u64::from(v)),
            Value::U64(v) => Some(v),
            Value::I32(v) => u64::try_from(v).ok(),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::U8(v) => write!(f, "${v:02X}"),
            Value::U16(v) => write!(f, "${v:04X}"),
            Value::U32(v) => write!(f, "${v:08X}"),
            Value::U64(v) => write!(f, "{v}"),
            Value::I32(v) => write!(f, "{v}"),
            Value::F32(v) => write!(f, "{v:.3}"),
            Value::String(v) => f.write_str(v),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, v) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{v}")?;
                }
                f.write_str("]")
            }
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

value_from! {
    bool => Bool,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    i32 => I32,
    f32 => F32,
    String => String,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

/// A component whose state can be inspected.
pub trait Observable {
    /// Query a property by path.
    ///
    /// Paths are dot-separated, e.g. `irq.level` or `slot.7.env_step`.
    /// Returns `None` if the path is not recognised.
    fn query(&self, path: &str) -> Option<Value>;

    /// Fixed paths accepted by [`Observable::query`].
    ///
    /// Indexed families (one entry per voice, per axis) are listed with
    /// `<n>` standing in for the index.
    fn query_paths(&self) -> &'static [&'static str];
}

#[cfg(test)]
mod tests {
    use super::Value;

    #[test]
    fn display_uses_hex_for_register_widths() {
        assert_eq!(Value::U8(0x1B).to_string(), "$1B");
        assert_eq!(Value::U16(0x0400).to_string(), "$0400");
        assert_eq!(Value::I32(-3).to_string(), "-3");
    }

    #[test]
    fn display_lists() {
        let v = Value::List(vec![Value::Bool(true), Value::U8(2)]);
        assert_eq!(v.to_string(), "[true, $02]");
    }

    #[test]
    fn as_u64_rejects_negative_and_float() {
        assert_eq!(Value::I32(-1).as_u64(), None);
        assert_eq!(Value::F32(1.0).as_u64(), None);
        assert_eq!(Value::Bool(true).as_u64(), Some(1));
    }
}

//! Value types for the key-value store

use bytes::Bytes;

/// Represents the different types of values that can be stored
///
/// Each variant carries exactly one concrete Rust type. Typed reads match on
/// the variant and never convert between them.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// UTF-8 string
    String(String),

    /// Binary-safe payload
    Bytes(Bytes),

    Bool(bool),

    /// Platform-width signed integer
    Isize(isize),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),

    /// Platform-width unsigned integer
    Usize(usize),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),

    F32(f32),
    F64(f64),
}

impl Value {
    /// Create a string value
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    /// Create a binary value
    pub fn bytes(b: impl Into<Bytes>) -> Self {
        Value::Bytes(b.into())
    }

    /// Get the type name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Bool(_) => "bool",
            Value::Isize(_) => "isize",
            Value::I8(_) => "i8",
            Value::I16(_) => "i16",
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::Usize(_) => "usize",
            Value::U8(_) => "u8",
            Value::U16(_) => "u16",
            Value::U32(_) => "u32",
            Value::U64(_) => "u64",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
        }
    }

    /// Try to get as a string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as raw bytes
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Try to extract a `T` from this value, if the variant holds exactly `T`
    pub fn extract<T: FromValue>(&self) -> Option<T> {
        T::from_value(self)
    }
}

/// Types that can be read back out of a [`Value`]
///
/// `from_value` returns `Some` only when the variant stores this exact type.
/// The `Default` bound supplies the zero value typed getters fall back to.
pub trait FromValue: Default + Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_owned)
    }
}

impl FromValue for Bytes {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_bytes().cloned()
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Bytes> for Value {
    fn from(b: Bytes) -> Self {
        Value::Bytes(b)
    }
}

// Copy payloads share one shape: a `From` into the variant and a matching
// `FromValue` out of it.
macro_rules! scalar_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }

            impl FromValue for $ty {
                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::$variant(v) => Some(*v),
                        _ => None,
                    }
                }
            }
        )*
    };
}

scalar_value! {
    bool => Bool,
    isize => Isize,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    usize => Usize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_picks_exact_variant() {
        assert_eq!(Value::from(7i32), Value::I32(7));
        assert_eq!(Value::from(7u8), Value::U8(7));
        assert_eq!(Value::from("hi"), Value::String("hi".to_string()));
        assert_eq!(Value::from(1.5f32), Value::F32(1.5));
    }

    #[test]
    fn test_extract_matches_only_same_type() {
        let v = Value::from(100i64);
        assert_eq!(v.extract::<i64>(), Some(100));
        assert_eq!(v.extract::<i32>(), None);
        assert_eq!(v.extract::<u64>(), None);
        assert_eq!(v.extract::<f64>(), None);
        assert_eq!(v.extract::<String>(), None);
    }

    #[test]
    fn test_string_and_bytes_are_distinct() {
        let s = Value::string("abc");
        let b = Value::bytes(Bytes::from_static(b"abc"));

        assert_eq!(s.extract::<String>(), Some("abc".to_string()));
        assert_eq!(s.extract::<Bytes>(), None);
        assert_eq!(b.extract::<Bytes>(), Some(Bytes::from_static(b"abc")));
        assert_eq!(b.extract::<String>(), None);
    }

    #[test]
    fn test_type_name() {
        assert_eq!(Value::from(true).type_name(), "bool");
        assert_eq!(Value::from(1usize).type_name(), "usize");
        assert_eq!(Value::from(1.0f64).type_name(), "f64");
    }
}

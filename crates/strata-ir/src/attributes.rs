//! Attribute payloads.

use smallvec::SmallVec;

use crate::refs::{AffineMapRef, AttrRef, FuncRef, TypeRef};

/// Data for a single interned attribute.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AttributeData {
    Bool(bool),
    Integer(i64),
    /// Float constant stored as raw bits.
    FloatBits(u64),
    String(String),
    Type(TypeRef),
    Array(SmallVec<[AttrRef; 4]>),
    AffineMap(AffineMapRef),
    Function(FuncRef),
}

impl AttributeData {
    pub fn float(value: f64) -> Self {
        AttributeData::FloatBits(value.to_bits())
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            AttributeData::FloatBits(bits) => Some(f64::from_bits(*bits)),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            AttributeData::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeData::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeData::String(value) => Some(value),
            _ => None,
        }
    }
}

impl From<bool> for AttributeData {
    fn from(value: bool) -> Self {
        AttributeData::Bool(value)
    }
}

impl From<i64> for AttributeData {
    fn from(value: i64) -> Self {
        AttributeData::Integer(value)
    }
}

impl From<f64> for AttributeData {
    fn from(value: f64) -> Self {
        AttributeData::float(value)
    }
}

impl From<&str> for AttributeData {
    fn from(value: &str) -> Self {
        AttributeData::String(value.to_owned())
    }
}

impl From<String> for AttributeData {
    fn from(value: String) -> Self {
        AttributeData::String(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_bits_round_trip() {
        let attr = AttributeData::from(1.5);
        assert_eq!(attr.as_float(), Some(1.5));
        assert_eq!(attr.as_integer(), None);
    }

    #[test]
    fn signed_zeroes_are_distinct_keys() {
        assert_ne!(AttributeData::float(0.0), AttributeData::float(-0.0));
    }

    #[test]
    fn accessors_match_variant() {
        assert_eq!(AttributeData::from(true).as_bool(), Some(true));
        assert_eq!(AttributeData::from(-3i64).as_integer(), Some(-3));
        assert_eq!(AttributeData::from("tile").as_str(), Some("tile"));
        assert_eq!(AttributeData::from(7i64).as_str(), None);
    }
}

//! Parameter values.

use crate::{ErrorKind, Result};
use chrono::{DateTime, Utc};
use dertree::{Class, Element};
use num_bigint::BigInt;
use num_traits::ToPrimitive;

/// A parameter slot value.
///
/// Build mode reads these; match mode writes them. The variants cover
/// everything a `%N` slot can carry: nothing, primitives, raw bytes,
/// text, a whole element, a calendar instant, or a list for the
/// repetition markers to iterate or accumulate.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// No value; in build mode this makes the referencing node absent.
    Null,

    /// A boolean.
    Bool(bool),

    /// A machine-sized integer.
    Int(i64),

    /// An arbitrary-precision integer.
    Big(BigInt),

    /// Raw bytes.
    Bytes(Vec<u8>),

    /// A character string.
    Str(String),

    /// A whole ASN.1 element.
    Elem(Element),

    /// A calendar instant. [`Value::UNSET_TIME`] acts as "absent".
    Time(DateTime<Utc>),

    /// A list, iterated by `*`/`+` in build mode and accumulated into
    /// in match mode.
    List(Vec<Value>),
}

impl Value {
    /// The sentinel instant that time-typed slots treat as absent.
    pub const UNSET_TIME: DateTime<Utc> = DateTime::<Utc>::MIN_UTC;

    /// Is this the null value?
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Coerce to a boolean: a [`Value::Bool`], or a string spelling one
    /// of `true|on|yes|1|false|off|no|0`.
    pub fn as_bool(&self, index: usize) -> Result<bool> {
        match self {
            Value::Bool(b) => Ok(*b),
            Value::Str(s) => parse_bool_word(s).ok_or_else(|| {
                ErrorKind::ParamType {
                    index,
                    expected: "a boolean",
                }
                .into()
            }),
            _ => Err(ErrorKind::ParamType {
                index,
                expected: "a boolean",
            }
            .into()),
        }
    }

    /// Coerce to an integer: any integer variant, or a decimal string.
    pub fn as_big(&self, index: usize) -> Result<BigInt> {
        match self {
            Value::Int(n) => Ok(BigInt::from(*n)),
            Value::Big(n) => Ok(n.clone()),
            Value::Str(s) => s.trim().parse().map_err(|_| {
                ErrorKind::ParamType {
                    index,
                    expected: "an integer",
                }
                .into()
            }),
            _ => Err(ErrorKind::ParamType {
                index,
                expected: "an integer",
            }
            .into()),
        }
    }

    /// Coerce to a string.
    pub fn as_str(&self, index: usize) -> Result<&str> {
        match self {
            Value::Str(s) => Ok(s),
            _ => Err(ErrorKind::ParamType {
                index,
                expected: "a string",
            }
            .into()),
        }
    }

    /// Coerce to a BIT STRING ignored-bit count.
    pub fn as_bit_count(&self, index: usize) -> Result<u8> {
        let err = || ErrorKind::ParamType {
            index,
            expected: "an ignored-bit count",
        };

        match self {
            Value::Int(n) if (0..=7).contains(n) => Ok(*n as u8),
            Value::Big(n) => n.to_u8().filter(|n| *n <= 7).ok_or_else(|| err().into()),
            Value::Str(s) => s
                .trim()
                .parse::<u8>()
                .ok()
                .filter(|n| *n <= 7)
                .ok_or_else(|| err().into()),
            _ => Err(err().into()),
        }
    }

    /// Coerce to a tag number.
    pub fn as_tag_number(&self, index: usize) -> Result<u32> {
        let err = || ErrorKind::ParamType {
            index,
            expected: "a tag number",
        };

        match self {
            Value::Int(n) => u32::try_from(*n)
                .ok()
                .filter(|n| *n <= dertree::Tag::MAX_NUMBER)
                .ok_or_else(|| err().into()),
            Value::Big(n) => n
                .to_u32()
                .filter(|n| *n <= dertree::Tag::MAX_NUMBER)
                .ok_or_else(|| err().into()),
            Value::Str(s) => s
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n <= dertree::Tag::MAX_NUMBER)
                .ok_or_else(|| err().into()),
            _ => Err(err().into()),
        }
    }

    /// Coerce to a tag class, spelled as one of the class keywords.
    pub fn as_tag_class(&self, index: usize) -> Result<Class> {
        match self {
            Value::Str(s) => parse_class_word(s).ok_or_else(|| {
                ErrorKind::ParamType {
                    index,
                    expected: "a tag class",
                }
                .into()
            }),
            _ => Err(ErrorKind::ParamType {
                index,
                expected: "a tag class",
            }
            .into()),
        }
    }
}

/// Parse the boolean word set accepted for literals and parameters.
pub(crate) fn parse_bool_word(word: &str) -> Option<bool> {
    match word.to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Some(true),
        "false" | "off" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// Parse a tag class keyword.
pub(crate) fn parse_class_word(word: &str) -> Option<Class> {
    match word.to_ascii_lowercase().as_str() {
        "univ" | "universal" => Some(Class::Universal),
        "app" | "application" => Some(Class::Application),
        "context" => Some(Class::ContextSpecific),
        "priv" | "private" => Some(Class::Private),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::Value;
    use num_bigint::BigInt;

    #[test]
    fn bool_coercions() {
        assert_eq!(Value::Bool(true).as_bool(0).unwrap(), true);
        assert_eq!(Value::Str("off".into()).as_bool(0).unwrap(), false);
        assert_eq!(Value::Str("Yes".into()).as_bool(0).unwrap(), true);
        assert!(Value::Int(1).as_bool(0).is_err());
    }

    #[test]
    fn integer_coercions() {
        assert_eq!(Value::Int(-5).as_big(0).unwrap(), BigInt::from(-5));
        assert_eq!(
            Value::Str("18446744073709551615".into()).as_big(0).unwrap(),
            "18446744073709551615".parse::<BigInt>().unwrap()
        );
        assert!(Value::Str("5x".into()).as_big(0).is_err());
    }

    #[test]
    fn bit_count_range() {
        assert_eq!(Value::Int(7).as_bit_count(0).unwrap(), 7);
        assert!(Value::Int(8).as_bit_count(0).is_err());
        assert!(Value::Int(-1).as_bit_count(0).is_err());
    }
}

//! Field values and validator chains
//!
//! A field is a typed slot of a fact node. Its [`FieldSpec`] lists validators that are
//! evaluated in order; the first one that rejects a value decides the reported error.
//! Specialised fields are composed by listing more validators, e.g. a non-empty
//! single-line string is `[IS_STR, NON_EMPTY, SINGLE_LINE]`.

use crate::error::{Error, Result, ValidationKind};
use serde::Serialize;
use std::fmt;

/// Underline/overline characters accepted for RST section titles
pub const RST_SYMBOLS: &str = "=-`:'\"~^_*+#<>";

/// A scalar fact value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Str(String),
    Int(i64),
    Bool(bool),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Int(i) => write!(f, "{}", i),
            Value::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Str(s.clone())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<usize> for Value {
    fn from(i: usize) -> Self {
        Value::Int(i64::try_from(i).unwrap_or(i64::MAX))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// Default of a field, readable without allocating
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
    None,
    Str(&'static str),
    Int(i64),
    Bool(bool),
}

impl DefaultValue {
    pub fn to_value(self) -> Option<Value> {
        match self {
            DefaultValue::None => None,
            DefaultValue::Str(s) => Some(Value::Str(s.to_string())),
            DefaultValue::Int(i) => Some(Value::Int(i)),
            DefaultValue::Bool(b) => Some(Value::Bool(b)),
        }
    }
}

/// One predicate of a validator chain
#[derive(Debug, Clone, Copy)]
pub struct Validator {
    /// Human readable constraint, used in error messages
    pub expected: &'static str,
    pub check: fn(&Value) -> bool,
    pub kind: ValidationKind,
}

impl Validator {
    pub fn validate(&self, path: &str, value: &Value) -> Result<()> {
        if (self.check)(value) {
            Ok(())
        } else {
            Err(Error::Validation {
                field: path.to_string(),
                expected: self.expected.to_string(),
                actual: value.to_string(),
                kind: self.kind,
            })
        }
    }
}

/// Declaration of a scalar field: its validator chain and default
#[derive(Debug)]
pub struct FieldSpec {
    pub validators: &'static [Validator],
    pub default: DefaultValue,
    /// Source positions (`lineno`, `column`, offsets) are owned by the parser and never
    /// taken over from a replacement tree.
    pub positional: bool,
}

impl FieldSpec {
    /// Run the validator chain; the first violated predicate wins.
    pub fn validate(&self, path: &str, value: &Value) -> Result<()> {
        self.validators
            .iter()
            .try_for_each(|validator| validator.validate(path, value))
    }
}

pub const IS_STR: Validator = Validator {
    expected: "a string",
    check: |v| matches!(v, Value::Str(_)),
    kind: ValidationKind::Type,
};

pub const IS_INT: Validator = Validator {
    expected: "an integer",
    check: |v| matches!(v, Value::Int(_)),
    kind: ValidationKind::Type,
};

pub const IS_BOOL: Validator = Validator {
    expected: "a boolean",
    check: |v| matches!(v, Value::Bool(_)),
    kind: ValidationKind::Type,
};

pub const NON_NEGATIVE: Validator = Validator {
    expected: "a non negative integer",
    check: |v| v.as_int().is_some_and(|i| i >= 0),
    kind: ValidationKind::Constraint,
};

pub const NON_EMPTY: Validator = Validator {
    expected: "a non null string",
    check: |v| v.as_str().is_some_and(|s| !s.is_empty()),
    kind: ValidationKind::Constraint,
};

pub const SINGLE_LINE: Validator = Validator {
    expected: "a one line string",
    check: |v| v.as_str().is_some_and(|s| !s.contains('\n')),
    kind: ValidationKind::Constraint,
};

pub const RST_SYMBOL: Validator = Validator {
    expected: "one of =-`:'\"~^_*+#<>",
    check: |v| {
        v.as_str().is_some_and(|s| {
            let mut chars = s.chars();
            matches!((chars.next(), chars.next()), (Some(c), None) if RST_SYMBOLS.contains(c))
        })
    },
    kind: ValidationKind::Constraint,
};

pub static STR: FieldSpec = FieldSpec {
    validators: &[IS_STR],
    default: DefaultValue::None,
    positional: false,
};

pub static SINGLE_LINE_STR: FieldSpec = FieldSpec {
    validators: &[IS_STR, SINGLE_LINE],
    default: DefaultValue::None,
    positional: false,
};

pub static NON_NULL_SINGLE_LINE_STR: FieldSpec = FieldSpec {
    validators: &[IS_STR, NON_EMPTY, SINGLE_LINE],
    default: DefaultValue::None,
    positional: false,
};

pub static RST_SYMBOL_STR: FieldSpec = FieldSpec {
    validators: &[IS_STR, NON_EMPTY, RST_SYMBOL],
    default: DefaultValue::Str("="),
    positional: false,
};

pub static LINENO: FieldSpec = FieldSpec {
    validators: &[IS_INT, NON_NEGATIVE],
    default: DefaultValue::None,
    positional: true,
};

pub static OFFSET: FieldSpec = FieldSpec {
    validators: &[IS_INT, NON_NEGATIVE],
    default: DefaultValue::Int(0),
    positional: true,
};

pub static FLAG: FieldSpec = FieldSpec {
    validators: &[IS_BOOL],
    default: DefaultValue::Bool(false),
    positional: false,
};

#[cfg(test)]
mod tests {
    use super::*;

    fn kind_of(spec: &FieldSpec, value: Value) -> Option<(String, ValidationKind)> {
        match spec.validate("T.f", &value) {
            Ok(()) => None,
            Err(Error::Validation { expected, kind, .. }) => Some((expected, kind)),
            Err(other) => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_str_field() {
        assert!(STR.validate("T.text", &Value::from("test")).is_ok());
        assert!(STR.validate("T.text", &Value::from("")).is_ok());
        assert!(STR.validate("T.text", &Value::from(4)).is_err());
    }

    #[test]
    fn test_lineno_field() {
        assert!(LINENO.validate("T.lineno", &Value::from(234)).is_ok());
        assert!(LINENO.validate("T.lineno", &Value::from("4")).is_err());
        assert!(LINENO.validate("T.lineno", &Value::from(-1)).is_err());
    }

    #[test]
    fn test_first_violated_predicate_wins() {
        // an integer fails the type check before any string constraint is evaluated
        assert_eq!(
            kind_of(&NON_NULL_SINGLE_LINE_STR, Value::from(5)),
            Some(("a string".to_string(), ValidationKind::Type))
        );
        assert_eq!(
            kind_of(&NON_NULL_SINGLE_LINE_STR, Value::from("")),
            Some(("a non null string".to_string(), ValidationKind::Constraint))
        );
        assert_eq!(
            kind_of(&NON_NULL_SINGLE_LINE_STR, Value::from("multi\nline")),
            Some(("a one line string".to_string(), ValidationKind::Constraint))
        );
        assert_eq!(kind_of(&NON_NULL_SINGLE_LINE_STR, Value::from("title")), None);
    }

    #[test]
    fn test_rst_symbol_field() {
        assert!(RST_SYMBOL_STR.validate("T.symbol", &Value::from("_")).is_ok());
        assert!(RST_SYMBOL_STR.validate("T.symbol", &Value::from("=")).is_ok());
        assert!(RST_SYMBOL_STR.validate("T.symbol", &Value::from("")).is_err());
        assert!(RST_SYMBOL_STR.validate("T.symbol", &Value::from("4")).is_err());
        assert!(RST_SYMBOL_STR.validate("T.symbol", &Value::from("==")).is_err());
    }

    #[test]
    fn test_error_path_is_reported() {
        let err = FLAG.validate("RstTitleInfo.has_overline", &Value::from("yes"));
        match err {
            Err(Error::Validation { field, actual, .. }) => {
                assert_eq!(field, "RstTitleInfo.has_overline");
                assert_eq!(actual, "\"yes\"");
            }
            other => panic!("expected a validation error, got {other:?}"),
        }
    }
}

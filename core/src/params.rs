//! Request parameters and their string encoding.
//!
//! # Design
//! Parameter values form a closed set: signed integers, unsigned integers and
//! strings. Every Rust integer width converts into `ParamValue` via `From`, so
//! passing an unsupported kind is a compile error at the call site. Values
//! that arrive dynamically typed (JSON) go through `Params::from_json`, which
//! rejects everything outside the closed set with a `ParamError`.
//!
//! `Params` is backed by a `BTreeMap`, so encoded output is sorted by key.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use crate::error::ParamError;

/// A single scalar parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Int(i64),
    Uint(u64),
    Str(String),
}

impl ParamValue {
    /// Base-10 text for integers, the string itself otherwise.
    pub fn encode(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{v}"),
            ParamValue::Uint(v) => write!(f, "{v}"),
            ParamValue::Str(v) => f.write_str(v),
        }
    }
}

macro_rules! impl_from_int {
    ($variant:ident as $wide:ty: $($t:ty),*) => {
        $(
            impl From<$t> for ParamValue {
                fn from(v: $t) -> Self {
                    ParamValue::$variant(v as $wide)
                }
            }
        )*
    };
}

impl_from_int!(Int as i64: i8, i16, i32, i64, isize);
impl_from_int!(Uint as u64: u8, u16, u32, u64, usize);

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Str(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Str(v.to_string())
    }
}

impl From<&String> for ParamValue {
    fn from(v: &String) -> Self {
        ParamValue::Str(v.clone())
    }
}

/// An ordered mapping from parameter name to value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    inner: BTreeMap<String, ParamValue>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a value, returning the previous one for the key if any.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ParamValue>,
    ) -> Option<ParamValue> {
        self.inner.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.inner.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Encode every value to its string form. Keys are preserved exactly.
    pub fn encode(&self) -> BTreeMap<String, String> {
        self.inner
            .iter()
            .map(|(k, v)| (k.clone(), v.encode()))
            .collect()
    }

    /// Build parameters from a JSON object.
    ///
    /// Integers (signed or unsigned) and strings are accepted; any other value
    /// kind fails with `ParamError::Unsupported` naming the offending key.
    pub fn from_json(value: &Value) -> Result<Self, ParamError> {
        let object = match value {
            Value::Object(object) => object,
            other => return Err(ParamError::NotAnObject(json_kind(other))),
        };

        let mut params = Params::new();
        for (key, value) in object {
            let converted = match value {
                Value::String(s) => ParamValue::Str(s.clone()),
                Value::Number(n) => {
                    if let Some(v) = n.as_i64() {
                        ParamValue::Int(v)
                    } else if let Some(v) = n.as_u64() {
                        ParamValue::Uint(v)
                    } else {
                        return Err(ParamError::Unsupported {
                            key: key.clone(),
                            kind: "float",
                        });
                    }
                }
                other => {
                    return Err(ParamError::Unsupported {
                        key: key.clone(),
                        kind: json_kind(other),
                    })
                }
            };
            params.inner.insert(key.clone(), converted);
        }
        Ok(params)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            inner: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime value model.

use crate::codec::temporal::Temporal;
use crate::descriptor::TypeIdentity;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use std::collections::BTreeMap;

/// A dynamic value that can hold an instance of any registered type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    // Special
    Null,

    // Scalars
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Char(char),
    String(String),
    Temporal(Temporal),

    // Composites
    List(Vec<Value>),
    Object(Object),

    /// Untyped JSON, held by generic placeholder fields.
    Any(serde_json::Value),
}

impl Value {
    /// Check if value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Try to get as bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as i64 (unsigned values that fit are accepted).
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::UInt(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Try to get as u64 (non-negative signed values are accepted).
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::UInt(v) => Some(*v),
            Self::Int(v) => u64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Try to get as f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as char.
    pub fn as_char(&self) -> Option<char> {
        match self {
            Self::Char(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get as temporal.
    pub fn as_temporal(&self) -> Option<&Temporal> {
        match self {
            Self::Temporal(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get as list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get as object.
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get as mutable object.
    pub fn as_object_mut(&mut self) -> Option<&mut Object> {
        match self {
            Self::Object(v) => Some(v),
            _ => None,
        }
    }

    /// Short name of the variant, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::UInt(_) => "uint",
            Self::Float(_) => "float",
            Self::Char(_) => "char",
            Self::String(_) => "string",
            Self::Temporal(_) => "temporal",
            Self::List(_) => "list",
            Self::Object(_) => "object",
            Self::Any(_) => "any",
        }
    }
}

/// An instance of a registered type.
///
/// A field missing from the map is *absent*; a field mapped to
/// [`Value::Null`] is present with an explicit null. The codec keeps the two
/// apart on both encode and decode.
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    type_id: TypeIdentity,
    fields: BTreeMap<String, Value>,
}

impl Object {
    /// Create an empty instance of `type_id`.
    pub fn new(type_id: impl Into<TypeIdentity>) -> Self {
        Self {
            type_id: type_id.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style [`Object::set`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Concrete type of this instance.
    pub fn type_id(&self) -> &TypeIdentity {
        &self.type_id
    }

    /// Get field value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Set field value, returning the previous one.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(name.into(), value.into())
    }

    /// Make a field absent, returning its value.
    pub fn unset(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    /// Check if a field is present (possibly null).
    pub fn is_set(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Present fields, ordered by name.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of present fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if no field is present.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// From implementations for convenience

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

macro_rules! value_from_int {
    ($variant:ident, $wide:ty: $($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Self::$variant(<$wide>::from(v))
                }
            }
        )*
    };
}

value_from_int!(Int, i64: i8, i16, i32, i64);
value_from_int!(UInt, u64: u8, u16, u32, u64);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Self::Char(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<Temporal> for Value {
    fn from(v: Temporal) -> Self {
        Self::Temporal(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Temporal(Temporal::Instant(v))
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Self::Temporal(Temporal::Date(v))
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Self::Temporal(Temporal::DateTime(v))
    }
}

impl From<NaiveTime> for Value {
    fn from(v: NaiveTime) -> Self {
        Self::Temporal(Temporal::Time(v))
    }
}

impl From<TimeDelta> for Value {
    fn from(v: TimeDelta) -> Self {
        Self::Temporal(Temporal::Duration(v))
    }
}

impl From<Object> for Value {
    fn from(v: Object) -> Self {
        Self::Object(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Self::Any(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

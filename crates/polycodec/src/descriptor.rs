// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Normalized type descriptors.
//!
//! A [`TypeDescriptor`] is the serializer-relevant shape of one candidate
//! type: its identity, ordered fields, declared supertype and generic
//! placeholders. Descriptors are produced by [`crate::extract`] and consumed
//! by the graph builder.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Fully-qualified type name, stable across runs.
///
/// Both `::` and `.` are accepted as namespace separators so identities
/// coming from manifests written for other ecosystems keep their shape.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeIdentity(String);

impl TypeIdentity {
    /// Create an identity from a fully-qualified name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The full identity string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path segment (`shapes::Circle` -> `Circle`).
    pub fn simple_name(&self) -> &str {
        match self.split_point() {
            Some((_, start)) => &self.0[start..],
            None => &self.0,
        }
    }

    /// Everything before the last path segment, if any.
    pub fn namespace(&self) -> Option<&str> {
        self.split_point().map(|(end, _)| &self.0[..end])
    }

    /// Byte range of the last separator: (namespace end, simple name start).
    fn split_point(&self) -> Option<(usize, usize)> {
        let colons = self.0.rfind("::").map(|i| (i, i + 2));
        let dot = self.0.rfind('.').map(|i| (i, i + 1));
        match (colons, dot) {
            (Some(c), Some(d)) => Some(if c.0 > d.0 { c } else { d }),
            (c, d) => c.or(d),
        }
    }
}

impl fmt::Display for TypeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for TypeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeIdentity({:?})", self.0)
    }
}

impl Borrow<str> for TypeIdentity {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TypeIdentity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TypeIdentity {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TypeIdentity {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl PartialEq<str> for TypeIdentity {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for TypeIdentity {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Primitive value kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Char,
    String,
}

impl PrimitiveKind {
    /// Inclusive range for signed integer kinds.
    pub fn signed_range(self) -> Option<(i64, i64)> {
        match self {
            Self::I8 => Some((i64::from(i8::MIN), i64::from(i8::MAX))),
            Self::I16 => Some((i64::from(i16::MIN), i64::from(i16::MAX))),
            Self::I32 => Some((i64::from(i32::MIN), i64::from(i32::MAX))),
            Self::I64 => Some((i64::MIN, i64::MAX)),
            _ => None,
        }
    }

    /// Inclusive upper bound for unsigned integer kinds.
    pub fn unsigned_max(self) -> Option<u64> {
        match self {
            Self::U8 => Some(u64::from(u8::MAX)),
            Self::U16 => Some(u64::from(u16::MAX)),
            Self::U32 => Some(u64::from(u32::MAX)),
            Self::U64 => Some(u64::MAX),
            _ => None,
        }
    }

    /// Lowercase name used in diagnostics.
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
            Self::Char => "char",
            Self::String => "string",
        }
    }
}

/// Temporal value kinds (instant, calendar date, local date-time, time, duration).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemporalKind {
    /// Point on the UTC timeline.
    Instant,
    /// Calendar date without zone.
    Date,
    /// Date and time without zone.
    DateTime,
    /// Time of day without zone.
    Time,
    /// Signed elapsed time.
    Duration,
}

impl TemporalKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Instant => "instant",
            Self::Date => "date",
            Self::DateTime => "date-time",
            Self::Time => "time",
            Self::Duration => "duration",
        }
    }
}

/// Declared value kind of a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Primitive scalar.
    Primitive(PrimitiveKind),
    /// Reference to another type of the universe.
    Reference(TypeIdentity),
    /// Temporal scalar with a canonical text form.
    Temporal(TemporalKind),
    /// Optional wrapper: distinguishes present-null from absent.
    Optional(Box<ValueKind>),
    /// Ordered collection of T.
    Collection(Box<ValueKind>),
    /// Generic placeholder declared by the owning type.
    Generic(String),
}

impl ValueKind {
    /// Check if this is an optional wrapper.
    pub fn is_optional(&self) -> bool {
        matches!(self, Self::Optional(_))
    }

    /// Type referenced through any number of wrappers.
    pub fn referenced_type(&self) -> Option<&TypeIdentity> {
        match self {
            Self::Reference(id) => Some(id),
            Self::Optional(inner) | Self::Collection(inner) => inner.referenced_type(),
            _ => None,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(p) => f.write_str(p.name()),
            Self::Reference(id) => write!(f, "{}", id),
            Self::Temporal(t) => f.write_str(t.name()),
            Self::Optional(inner) => write!(f, "optional<{}>", inner),
            Self::Collection(inner) => write!(f, "list<{}>", inner),
            Self::Generic(p) => write!(f, "<{}>", p),
        }
    }
}

/// Discriminator value embedded in serialized data.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Discriminator {
    /// Textual discriminator (the default policies produce these).
    Name(String),
    /// Small integer discriminator.
    Code(i64),
}

impl Discriminator {
    /// JSON representation written into encoded objects.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Name(name) => serde_json::Value::String(name.clone()),
            Self::Code(code) => serde_json::Value::from(*code),
        }
    }

    /// Read a discriminator from a JSON value (string or integer).
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(s) => Some(Self::Name(s.clone())),
            serde_json::Value::Number(n) => n.as_i64().map(Self::Code),
            _ => None,
        }
    }
}

impl fmt::Display for Discriminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Code(code) => write!(f, "{}", code),
        }
    }
}

impl From<&str> for Discriminator {
    fn from(value: &str) -> Self {
        Self::Name(value.to_string())
    }
}

impl From<i64> for Discriminator {
    fn from(value: i64) -> Self {
        Self::Code(value)
    }
}

/// Field descriptor for object members.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Field name (unique within the owning descriptor).
    pub name: String,
    /// Declared value kind.
    pub kind: ValueKind,
    /// Accepts `null`.
    pub nullable: bool,
    /// Omitted from output when unset.
    pub absent_by_default: bool,
    /// Value used when the field is missing from input.
    pub default: Option<serde_json::Value>,
}

impl FieldDescriptor {
    /// Create a required, non-nullable field.
    pub fn new(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            kind,
            nullable: false,
            absent_by_default: false,
            default: None,
        }
    }

    /// Mark as nullable.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Mark as absent-by-default.
    pub fn absent_by_default(mut self) -> Self {
        self.absent_by_default = true;
        self
    }

    /// Set default value.
    pub fn with_default(mut self, default: serde_json::Value) -> Self {
        self.default = Some(default);
        self
    }
}

/// A complete type descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    /// Type identity.
    pub identity: TypeIdentity,
    /// Fields in declared order.
    pub fields: Vec<FieldDescriptor>,
    /// Declared supertype.
    pub supertype: Option<TypeIdentity>,
    /// Generic parameter placeholders, in declaration order.
    pub generics: Vec<String>,
    /// Not instantiable (never a decode target).
    pub is_abstract: bool,
    /// Explicitly declared discriminator.
    pub discriminator: Option<Discriminator>,
    /// Former discriminators still accepted on decode.
    pub aliases: Vec<Discriminator>,
    /// Discriminator field override (honoured on hierarchy roots).
    pub discriminator_field: Option<String>,
}

impl TypeDescriptor {
    /// Create a concrete descriptor without fields.
    pub fn new(identity: impl Into<TypeIdentity>) -> Self {
        Self {
            identity: identity.into(),
            fields: Vec::new(),
            supertype: None,
            generics: Vec::new(),
            is_abstract: false,
            discriminator: None,
            aliases: Vec::new(),
            discriminator_field: None,
        }
    }

    /// Simple declared name.
    pub fn simple_name(&self) -> &str {
        self.identity.simple_name()
    }

    /// Check if this type can be a decode target.
    pub fn is_concrete(&self) -> bool {
        !self.is_abstract
    }

    /// Get field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Get field index by name.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-type encode/decode strategies.
//!
//! Strategies are plain data; the walkers in `json.rs` interpret them.

use super::temporal::TemporalAdapter;
use crate::descriptor::{
    Discriminator, FieldDescriptor, PrimitiveKind, TypeIdentity, ValueKind,
};
use crate::resolver::DiscriminatorTable;
use std::fmt;
use std::sync::Arc;

/// How one field value is written and read.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldCodec {
    Primitive(PrimitiveKind),
    Temporal(TemporalAdapter),
    /// Nested object declared as this type (subtypes accepted).
    Object(TypeIdentity),
    Optional(Box<FieldCodec>),
    List(Box<FieldCodec>),
    /// Generic placeholder: untyped JSON.
    Any,
}

impl FieldCodec {
    /// Codec for a declared value kind.
    pub fn for_kind(kind: &ValueKind) -> Self {
        match kind {
            ValueKind::Primitive(p) => Self::Primitive(*p),
            ValueKind::Temporal(t) => Self::Temporal(TemporalAdapter::new(*t)),
            ValueKind::Reference(id) => Self::Object(id.clone()),
            ValueKind::Optional(inner) => Self::Optional(Box::new(Self::for_kind(inner))),
            ValueKind::Collection(inner) => Self::List(Box::new(Self::for_kind(inner))),
            ValueKind::Generic(_) => Self::Any,
        }
    }

    /// Check if `null` is a valid value for this codec.
    pub fn accepts_null(&self) -> bool {
        matches!(self, Self::Optional(_) | Self::Any)
    }
}

impl fmt::Display for FieldCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(p) => f.write_str(p.name()),
            Self::Temporal(a) => f.write_str(a.kind().name()),
            Self::Object(id) => write!(f, "{}", id),
            Self::Optional(inner) => write!(f, "optional<{}>", inner),
            Self::List(inner) => write!(f, "list<{}>", inner),
            Self::Any => f.write_str("any"),
        }
    }
}

/// One field of an [`ObjectPlan`].
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPlan {
    pub name: String,
    pub codec: FieldCodec,
    pub nullable: bool,
    pub absent_by_default: bool,
    pub default: Option<serde_json::Value>,
}

impl From<&FieldDescriptor> for FieldPlan {
    fn from(field: &FieldDescriptor) -> Self {
        Self {
            name: field.name.clone(),
            codec: FieldCodec::for_kind(&field.kind),
            nullable: field.nullable,
            absent_by_default: field.absent_by_default,
            default: field.default.clone(),
        }
    }
}

/// Discriminator written by (and expected from) a hierarchy member.
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    /// JSON field carrying the discriminator.
    pub field: String,
    /// Primary value, written on encode.
    pub value: Discriminator,
    /// Former values, accepted on decode.
    pub aliases: Vec<Discriminator>,
    /// Top-most type of the hierarchy.
    pub root: TypeIdentity,
}

impl Tag {
    /// Check if `value` designates this member.
    pub fn matches(&self, value: &Discriminator) -> bool {
        self.value == *value || self.aliases.contains(value)
    }
}

/// Layout of one concrete type.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectPlan {
    pub identity: TypeIdentity,
    pub tag: Option<Tag>,
    /// Effective fields, inherited first.
    pub fields: Vec<FieldPlan>,
    /// Supertypes, nearest first.
    pub ancestors: Vec<TypeIdentity>,
}

impl ObjectPlan {
    /// Get field plan by name.
    pub fn field(&self, name: &str) -> Option<&FieldPlan> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Check if a value of this type may stand where `expected` is declared.
    pub fn is_assignable_to(&self, expected: &TypeIdentity) -> bool {
        self.identity == *expected || self.ancestors.contains(expected)
    }
}

/// Encode strategy of one type.
#[derive(Debug, Clone, PartialEq)]
pub enum EncodeStrategy {
    Object(Arc<ObjectPlan>),
    NotInstantiable { identity: TypeIdentity },
}

/// Decode strategy of one type.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeStrategy {
    /// Fields are read directly.
    Concrete(Arc<ObjectPlan>),
    /// The discriminator field selects the concrete type.
    Polymorphic { table: Arc<DiscriminatorTable> },
    NotInstantiable { identity: TypeIdentity },
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Candidate type universe.
//!
//! The universe is any finite iterator of [`TypeHandle`]s. Handles come from
//! three places:
//!
//! - `#[derive(Describe)]` on Rust structs ([`Describe::type_shape`])
//! - [`crate::TypeShapeBuilder`] for hand-built shapes
//! - a [`Manifest`] loaded from JSON or TOML
//!
//! A [`ScanFilter`] restricts which handles are admitted by namespace.

use crate::config::ConfigError;
use crate::descriptor::Discriminator;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Raw field shape as reported by a type handle, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
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
    Instant,
    Date,
    DateTime,
    Time,
    Duration,
    /// `Option<T>`.
    Option(Box<Shape>),
    /// `Vec<T>` and other sequences.
    Seq(Box<Shape>),
    /// Another type of the universe, by identity.
    Named(String),
    /// Generic placeholder of the owning type.
    Generic(String),
    /// Function-valued member; never serializable.
    Function(String),
    /// Anything else the handle could not describe.
    Opaque(String),
}

impl Shape {
    /// `Option<inner>`.
    pub fn option(inner: Shape) -> Self {
        Self::Option(Box::new(inner))
    }

    /// `Vec<inner>`.
    pub fn seq(inner: Shape) -> Self {
        Self::Seq(Box::new(inner))
    }

    /// Reference to `identity`.
    pub fn named(identity: impl Into<String>) -> Self {
        Self::Named(identity.into())
    }
}

/// Raw field of a type handle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldShape {
    pub name: String,
    pub shape: Shape,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub absent_by_default: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
}

impl FieldShape {
    pub fn new(name: impl Into<String>, shape: Shape) -> Self {
        Self {
            name: name.into(),
            shape,
            nullable: false,
            absent_by_default: false,
            default: None,
        }
    }
}

/// Owned type handle: everything a descriptor is extracted from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeShape {
    pub identity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supertype: Option<String>,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generics: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<Discriminator>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<Discriminator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminator_field: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldShape>,
}

impl TypeShape {
    /// Concrete shape without supertype or fields.
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            supertype: None,
            is_abstract: false,
            generics: Vec::new(),
            discriminator: None,
            aliases: Vec::new(),
            discriminator_field: None,
            fields: Vec::new(),
        }
    }
}

/// Read access to one candidate type.
pub trait TypeHandle {
    /// Fully-qualified identity.
    fn identity(&self) -> &str;

    /// Declared supertype identity.
    fn supertype(&self) -> Option<&str>;

    /// Fields in declared order.
    fn fields(&self) -> &[FieldShape];

    fn generics(&self) -> &[String] {
        &[]
    }

    fn is_abstract(&self) -> bool {
        false
    }

    fn discriminator(&self) -> Option<&Discriminator> {
        None
    }

    fn aliases(&self) -> &[Discriminator] {
        &[]
    }

    fn discriminator_field(&self) -> Option<&str> {
        None
    }
}

impl TypeHandle for TypeShape {
    fn identity(&self) -> &str {
        &self.identity
    }

    fn supertype(&self) -> Option<&str> {
        self.supertype.as_deref()
    }

    fn fields(&self) -> &[FieldShape] {
        &self.fields
    }

    fn generics(&self) -> &[String] {
        &self.generics
    }

    fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    fn discriminator(&self) -> Option<&Discriminator> {
        self.discriminator.as_ref()
    }

    fn aliases(&self) -> &[Discriminator] {
        &self.aliases
    }

    fn discriminator_field(&self) -> Option<&str> {
        self.discriminator_field.as_deref()
    }
}

macro_rules! forward_type_handle {
    ($($wrapper:ty),*) => {
        $(
            impl<T: TypeHandle + ?Sized> TypeHandle for $wrapper {
                fn identity(&self) -> &str {
                    (**self).identity()
                }

                fn supertype(&self) -> Option<&str> {
                    (**self).supertype()
                }

                fn fields(&self) -> &[FieldShape] {
                    (**self).fields()
                }

                fn generics(&self) -> &[String] {
                    (**self).generics()
                }

                fn is_abstract(&self) -> bool {
                    (**self).is_abstract()
                }

                fn discriminator(&self) -> Option<&Discriminator> {
                    (**self).discriminator()
                }

                fn aliases(&self) -> &[Discriminator] {
                    (**self).aliases()
                }

                fn discriminator_field(&self) -> Option<&str> {
                    (**self).discriminator_field()
                }
            }
        )*
    };
}

forward_type_handle!(&T, Box<T>);

/// Types that can describe their own shape.
///
/// Normally implemented with `#[derive(Describe)]`.
pub trait Describe {
    /// Fully-qualified identity of the type.
    fn type_identity() -> String;

    /// Shape handed to the extractor.
    fn type_shape() -> TypeShape;
}

/// Namespace filter applied to the candidate universe.
///
/// An identity is admitted when it falls under some `include` prefix (or
/// `include` is empty) and under no `exclude` prefix. Prefixes match whole
/// namespace segments: `shop::model` covers `shop::model::Order` but not
/// `shop::models::Order`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanFilter {
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl ScanFilter {
    /// Admit everything under `prefix`.
    pub fn include(mut self, prefix: impl Into<String>) -> Self {
        self.include.push(prefix.into());
        self
    }

    /// Reject everything under `prefix`.
    pub fn exclude(mut self, prefix: impl Into<String>) -> Self {
        self.exclude.push(prefix.into());
        self
    }

    /// Check if `identity` is admitted.
    pub fn accepts(&self, identity: &str) -> bool {
        let included =
            self.include.is_empty() || self.include.iter().any(|p| under_prefix(identity, p));
        included && !self.exclude.iter().any(|p| under_prefix(identity, p))
    }
}

fn under_prefix(identity: &str, prefix: &str) -> bool {
    match identity.strip_prefix(prefix) {
        Some("") => true,
        Some(rest) => rest.starts_with("::") || rest.starts_with('.'),
        None => false,
    }
}

/// A universe written down as data.
///
/// ```toml
/// [[types]]
/// identity = "geo::Shape"
/// abstract = true
///
/// [[types]]
/// identity = "geo::Circle"
/// supertype = "geo::Shape"
/// fields = [{ name = "radius", shape = "f64" }]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub types: Vec<TypeShape>,
}

impl Manifest {
    /// Parse a JSON manifest.
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Parse a TOML manifest.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load a manifest file; `.json` files are parsed as JSON, anything else as TOML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_toml_str(&content),
        }
    }

    /// Number of type shapes.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if the manifest lists no type.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl IntoIterator for Manifest {
    type Item = TypeShape;
    type IntoIter = std::vec::IntoIter<TypeShape>;

    fn into_iter(self) -> Self::IntoIter {
        self.types.into_iter()
    }
}

impl<'a> IntoIterator for &'a Manifest {
    type Item = &'a TypeShape;
    type IntoIter = std::slice::Iter<'a, TypeShape>;

    fn into_iter(self) -> Self::IntoIter {
        self.types.iter()
    }
}

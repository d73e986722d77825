// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Configured JSON codec.
//!
//! # Architecture
//!
//! ```text
//! ResolvedGraph --> Configurator --> CodecEngine hooks --> seal() --> ConfiguredCodec
//!                                   (register_encode,
//!                                    register_decode,
//!                                    register_discriminator_field)
//! ```
//!
//! A [`ConfiguredCodec`] is immutable once sealed. Cloning it is an `Arc`
//! increment; it can be shared across threads without locking.
//!
//! # Example
//!
//! ```
//! use polycodec::{CodecConfig, ConfiguredCodec, Object, Shape, TypeShapeBuilder, Value};
//!
//! let universe = vec![
//!     TypeShapeBuilder::new("geo::Shape").abstract_type().build(),
//!     TypeShapeBuilder::new("geo::Circle")
//!         .extends("geo::Shape")
//!         .field("radius", Shape::F64)
//!         .build(),
//! ];
//! let codec = ConfiguredCodec::build(universe, &CodecConfig::default()).unwrap();
//!
//! let circle = Object::new("geo::Circle").with("radius", 2.0);
//! let bytes = codec.encode(&Value::Object(circle.clone())).unwrap();
//! assert_eq!(bytes, br#"{"type":"Circle","radius":2.0}"#);
//!
//! let decoded = codec.decode(&bytes, "geo::Shape").unwrap();
//! assert_eq!(decoded, Value::Object(circle));
//! ```

pub mod configure;
pub mod engine;
mod json;
pub mod strategy;
pub mod temporal;

use crate::config::{CodecConfig, UnknownFields};
use crate::descriptor::TypeIdentity;
use crate::error::{BuildError, CodecError};
use crate::pipeline::Pipeline;
use crate::resolver::DiscriminatorTable;
use crate::universe::TypeHandle;
use crate::value::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use strategy::{DecodeStrategy, EncodeStrategy, ObjectPlan};

#[derive(Debug, PartialEq)]
pub(crate) struct CodecInner {
    pub(crate) encoders: BTreeMap<TypeIdentity, EncodeStrategy>,
    pub(crate) decoders: BTreeMap<TypeIdentity, DecodeStrategy>,
    pub(crate) discriminator_fields: BTreeMap<TypeIdentity, String>,
    pub(crate) unknown_fields: UnknownFields,
}

impl CodecInner {
    /// Layout of a concrete type.
    pub(crate) fn plan(&self, identity: &str) -> Option<&Arc<ObjectPlan>> {
        match self.encoders.get(identity) {
            Some(EncodeStrategy::Object(plan)) => Some(plan),
            _ => None,
        }
    }
}

/// Immutable, shareable JSON codec for one type universe.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfiguredCodec {
    inner: Arc<CodecInner>,
}

impl ConfiguredCodec {
    pub(crate) fn from_inner(inner: Arc<CodecInner>) -> Self {
        Self { inner }
    }

    /// Run the whole pipeline over `universe`.
    pub fn build<I>(universe: I, config: &CodecConfig) -> Result<Self, BuildError>
    where
        I: IntoIterator,
        I::Item: TypeHandle,
    {
        Pipeline::new(config.clone()).build(universe)
    }

    /// Encode an object to JSON bytes.
    pub fn encode(&self, value: &Value) -> Result<Vec<u8>, CodecError> {
        let json = self.encode_value(value)?;
        Ok(serde_json::to_vec(&json)?)
    }

    /// Encode an object to a JSON tree.
    pub fn encode_value(&self, value: &Value) -> Result<serde_json::Value, CodecError> {
        self.inner.encode_root(value)
    }

    /// Decode JSON bytes as an instance of `expected_root` or one of its subtypes.
    pub fn decode(&self, bytes: &[u8], expected_root: &str) -> Result<Value, CodecError> {
        let json: serde_json::Value = serde_json::from_slice(bytes)?;
        self.decode_value(&json, expected_root)
    }

    /// Decode a JSON tree as an instance of `expected_root` or one of its subtypes.
    pub fn decode_value(
        &self,
        json: &serde_json::Value,
        expected_root: &str,
    ) -> Result<Value, CodecError> {
        self.inner.decode_root(json, expected_root)
    }

    /// Check if `identity` is registered.
    pub fn contains(&self, identity: &str) -> bool {
        self.inner.encoders.contains_key(identity)
    }

    /// Registered identities, in order.
    pub fn identities(&self) -> impl Iterator<Item = &TypeIdentity> + '_ {
        self.inner.encoders.keys()
    }

    /// Number of registered types.
    pub fn type_count(&self) -> usize {
        self.inner.encoders.len()
    }

    /// Discriminator table of a polymorphic root.
    pub fn discriminator_table(&self, root: &str) -> Option<&DiscriminatorTable> {
        match self.inner.decoders.get(root) {
            Some(DecodeStrategy::Polymorphic { table }) => Some(table),
            _ => None,
        }
    }

    /// All discriminator tables, ordered by root.
    pub fn discriminator_tables(&self) -> impl Iterator<Item = &DiscriminatorTable> + '_ {
        self.inner.decoders.values().filter_map(|s| match s {
            DecodeStrategy::Polymorphic { table } => Some(table.as_ref()),
            _ => None,
        })
    }

    /// Discriminator field registered for a polymorphic root.
    pub fn discriminator_field(&self, root: &str) -> Option<&str> {
        self.inner.discriminator_fields.get(root).map(String::as_str)
    }

    /// Output field order of a concrete type (discriminator excluded).
    pub fn field_order(&self, identity: &str) -> Option<Vec<&str>> {
        self.inner
            .plan(identity)
            .map(|plan| plan.fields.iter().map(|f| f.name.as_str()).collect())
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # polycodec - polymorphic JSON codec registry
//!
//! Discovers the relationships between the types of a candidate universe
//! (subtype hierarchies, optional and absent fields, temporal values) and
//! configures a JSON codec that encodes and decodes them without per-type glue.
//!
//! ## Quick Start
//!
//! ```rust
//! use polycodec::{CodecConfig, ConfiguredCodec, Describe, Value};
//!
//! #[derive(Describe)]
//! #[polycodec(namespace = "geo", abstract)]
//! struct Shape;
//!
//! #[derive(Describe)]
//! #[polycodec(namespace = "geo", extends = "Shape")]
//! struct Circle {
//!     radius: f64,
//! }
//!
//! let universe = vec![Shape::type_shape(), Circle::type_shape()];
//! let codec = ConfiguredCodec::build(universe, &CodecConfig::default()).unwrap();
//!
//! let value = codec
//!     .decode(br#"{"type":"Circle","radius":2.0}"#, "geo::Shape")
//!     .unwrap();
//! let circle = value.as_object().unwrap();
//! assert_eq!(circle.type_id(), "geo::Circle");
//! assert_eq!(circle.get("radius"), Some(&Value::Float(2.0)));
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |  Candidate universe: #[derive(Describe)] | TypeShapeBuilder | Manifest |
//! +---------------------------------------------------------------------+
//! |  Extractor        TypeHandle -> TypeDescriptor                      |
//! |  Graph Builder    descriptors -> TypeGraph (acyclic, ordered)       |
//! |  Resolver         TypeGraph -> DiscriminatorTables (injective)      |
//! |  Configurator     strategies -> CodecEngine -> ConfiguredCodec      |
//! +---------------------------------------------------------------------+
//! |  CodecHandle      atomic publish/swap of the current codec          |
//! +---------------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Pipeline`] | Runs the four build stages, tracks a [`BuildAttempt`] |
//! | [`ConfiguredCodec`] | Immutable codec: `encode` / `decode` |
//! | [`CodecHandle`] | Lock-free publication of the current codec |
//! | [`CodecConfig`] | Discriminator field, policy, unknown fields, scan filter |
//! | [`Value`] / [`Object`] | Runtime values; absent and null kept apart |

// Allow `::polycodec::` paths generated by the derive inside this crate.
extern crate self as polycodec;

pub mod builder;
pub mod codec;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod extract;
pub mod graph;
pub mod pipeline;
pub mod publish;
pub mod resolver;
pub mod universe;
pub mod value;

pub use builder::TypeShapeBuilder;
pub use codec::configure::Configurator;
pub use codec::engine::{CodecEngine, JsonEngine};
pub use codec::strategy::{DecodeStrategy, EncodeStrategy, FieldCodec, FieldPlan, ObjectPlan, Tag};
pub use codec::temporal::{Temporal, TemporalAdapter};
pub use codec::ConfiguredCodec;
pub use config::{CodecConfig, ConfigError, UnknownFields};
pub use descriptor::{
    Discriminator, FieldDescriptor, PrimitiveKind, TemporalKind, TypeDescriptor, TypeIdentity,
    ValueKind,
};
pub use error::{BuildError, BuildErrorKind, CodecError};
pub use extract::extract;
pub use graph::{GraphBuilder, TypeGraph};
pub use pipeline::{BuildAttempt, BuildState, Pipeline};
pub use publish::CodecHandle;
pub use resolver::{DiscriminatorPolicy, DiscriminatorTable, PolicyKind, ResolvedGraph, Resolver};
pub use universe::{Describe, FieldShape, Manifest, ScanFilter, Shape, TypeHandle, TypeShape};
pub use value::{Object, Value};

pub use polycodec_derive::Describe; // Derive macro (for #[derive(polycodec::Describe)])

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec configuration: binds a resolved graph to a [`CodecEngine`].

use super::engine::CodecEngine;
use super::strategy::{DecodeStrategy, EncodeStrategy, FieldPlan, ObjectPlan, Tag};
use crate::descriptor::TypeDescriptor;
use crate::error::BuildError;
use crate::resolver::ResolvedGraph;
use std::sync::Arc;

/// Registers one encode and one decode strategy per type of a resolved graph.
#[derive(Debug)]
pub struct Configurator {
    resolved: ResolvedGraph,
}

impl Configurator {
    pub fn new(resolved: ResolvedGraph) -> Self {
        Self { resolved }
    }

    /// Register every strategy with `engine` and seal it.
    ///
    /// Any failing registration fails the whole configuration; the engine is
    /// dropped and nothing is published.
    pub fn configure<E: CodecEngine>(self, mut engine: E) -> Result<E::Codec, BuildError> {
        self.check_references()?;

        for table in self.resolved.tables() {
            engine.register_discriminator_field(table.root().clone(), table.field().to_string())?;
        }

        let graph = self.resolved.graph();
        let mut polymorphic = 0usize;
        for desc in graph.descriptors() {
            let identity = &desc.identity;
            let plan = Arc::new(self.plan_for(desc)?);

            let encode = if desc.is_concrete() {
                EncodeStrategy::Object(Arc::clone(&plan))
            } else {
                EncodeStrategy::NotInstantiable {
                    identity: identity.clone(),
                }
            };

            let decode = match self.resolved.table(identity.as_str()) {
                Some(table) => {
                    polymorphic += 1;
                    DecodeStrategy::Polymorphic {
                        table: Arc::clone(table),
                    }
                }
                None if desc.is_concrete() => DecodeStrategy::Concrete(plan),
                None => DecodeStrategy::NotInstantiable {
                    identity: identity.clone(),
                },
            };

            engine.register_encode(identity.clone(), encode)?;
            engine.register_decode(identity.clone(), decode)?;
        }

        tracing::debug!(
            types = graph.len(),
            polymorphic,
            "encode/decode strategies registered"
        );
        engine.seal()
    }

    fn check_references(&self) -> Result<(), BuildError> {
        let graph = self.resolved.graph();
        for desc in graph.descriptors() {
            for field in &desc.fields {
                if let Some(target) = field.kind.referenced_type() {
                    if !graph.contains(target.as_str()) {
                        return Err(BuildError::UnresolvedReference {
                            identity: desc.identity.clone(),
                            field: field.name.clone(),
                            target: target.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn plan_for(&self, desc: &TypeDescriptor) -> Result<ObjectPlan, BuildError> {
        let graph = self.resolved.graph();
        let identity = desc.identity.as_str();

        let fields = graph
            .effective_fields(identity)?
            .iter()
            .map(FieldPlan::from)
            .collect();

        let tag = match (
            self.resolved.discriminator_of(identity),
            self.resolved.discriminator_field(identity),
            graph.hierarchy_root(identity),
        ) {
            (Some(value), Some(field), Some(root)) if desc.is_concrete() => Some(Tag {
                field: field.to_string(),
                value: value.clone(),
                aliases: desc.aliases.clone(),
                root: root.clone(),
            }),
            _ => None,
        };

        Ok(ObjectPlan {
            identity: desc.identity.clone(),
            tag,
            fields,
            ancestors: graph.ancestors(identity).into_iter().cloned().collect(),
        })
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Polymorphic resolution.
//!
//! Every type with at least one subtype gets a [`DiscriminatorTable`] mapping
//! the discriminator values of its concrete members (itself and all transitive
//! subtypes) to their identities. Tables are injective: two concrete types
//! claiming the same value under one root is a
//! [`BuildError::DiscriminatorCollision`], never a silent rename.

use crate::descriptor::{Discriminator, TypeDescriptor, TypeIdentity};
use crate::error::BuildError;
use crate::graph::TypeGraph;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Derives the primary discriminator of a concrete type.
pub trait DiscriminatorPolicy: fmt::Debug + Send + Sync {
    fn discriminator(&self, desc: &TypeDescriptor) -> Discriminator;
}

/// Built-in discriminator policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// Simple declared name (`geo::Circle` -> `"Circle"`).
    #[default]
    SimpleName,
    /// Full identity (`"geo::Circle"`).
    QualifiedName,
    /// Declared discriminator, falling back to the simple name.
    Explicit,
}

impl DiscriminatorPolicy for PolicyKind {
    fn discriminator(&self, desc: &TypeDescriptor) -> Discriminator {
        match self {
            Self::SimpleName => Discriminator::Name(desc.simple_name().to_string()),
            Self::QualifiedName => Discriminator::Name(desc.identity.as_str().to_string()),
            Self::Explicit => desc
                .discriminator
                .clone()
                .unwrap_or_else(|| Discriminator::Name(desc.simple_name().to_string())),
        }
    }
}

/// Discriminator lookup for one polymorphic root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscriminatorTable {
    root: TypeIdentity,
    field: String,
    entries: BTreeMap<Discriminator, TypeIdentity>,
    aliases: BTreeMap<Discriminator, TypeIdentity>,
    by_type: BTreeMap<TypeIdentity, Discriminator>,
}

impl DiscriminatorTable {
    fn new(root: TypeIdentity, field: String) -> Self {
        Self {
            root,
            field,
            entries: BTreeMap::new(),
            aliases: BTreeMap::new(),
            by_type: BTreeMap::new(),
        }
    }

    /// Root this table resolves for.
    pub fn root(&self) -> &TypeIdentity {
        &self.root
    }

    /// JSON field carrying the discriminator.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Resolve a discriminator (primary or alias) to a concrete type.
    pub fn get(&self, value: &Discriminator) -> Option<&TypeIdentity> {
        self.entries.get(value).or_else(|| self.aliases.get(value))
    }

    /// Primary discriminator of a member.
    pub fn discriminator_of(&self, identity: &str) -> Option<&Discriminator> {
        self.by_type.get(identity)
    }

    /// Primary entries, ordered by discriminator.
    pub fn entries(&self) -> impl Iterator<Item = (&Discriminator, &TypeIdentity)> + '_ {
        self.entries.iter()
    }

    /// Alias entries, ordered by discriminator.
    pub fn aliases(&self) -> impl Iterator<Item = (&Discriminator, &TypeIdentity)> + '_ {
        self.aliases.iter()
    }

    /// Number of primary entries (concrete members).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the root has no concrete member.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn claim(&self, value: &Discriminator, identity: &TypeIdentity) -> Result<(), BuildError> {
        match self.get(value) {
            Some(owner) if owner != identity => Err(BuildError::DiscriminatorCollision {
                root: self.root.clone(),
                discriminator: value.clone(),
                first: owner.clone(),
                second: identity.clone(),
            }),
            _ => Ok(()),
        }
    }

    fn insert(&mut self, value: Discriminator, identity: TypeIdentity) -> Result<(), BuildError> {
        self.claim(&value, &identity)?;
        self.by_type.insert(identity.clone(), value.clone());
        self.entries.insert(value, identity);
        Ok(())
    }

    fn insert_alias(
        &mut self,
        value: Discriminator,
        identity: TypeIdentity,
    ) -> Result<(), BuildError> {
        self.claim(&value, &identity)?;
        if !self.entries.contains_key(&value) {
            self.aliases.insert(value, identity);
        }
        Ok(())
    }
}

/// Graph plus the polymorphic metadata derived from it.
#[derive(Debug, Clone)]
pub struct ResolvedGraph {
    graph: TypeGraph,
    tables: BTreeMap<TypeIdentity, Arc<DiscriminatorTable>>,
    discriminators: BTreeMap<TypeIdentity, Discriminator>,
    fields: BTreeMap<TypeIdentity, String>,
}

impl ResolvedGraph {
    /// Underlying type graph.
    pub fn graph(&self) -> &TypeGraph {
        &self.graph
    }

    /// Table of a polymorphic root.
    pub fn table(&self, root: &str) -> Option<&Arc<DiscriminatorTable>> {
        self.tables.get(root)
    }

    /// All tables, ordered by root.
    pub fn tables(&self) -> impl Iterator<Item = &Arc<DiscriminatorTable>> + '_ {
        self.tables.values()
    }

    /// Primary discriminator of a concrete hierarchy member.
    pub fn discriminator_of(&self, identity: &str) -> Option<&Discriminator> {
        self.discriminators.get(identity)
    }

    /// Discriminator field of the hierarchy `identity` belongs to.
    pub fn discriminator_field(&self, identity: &str) -> Option<&str> {
        let top = self.graph.hierarchy_root(identity)?;
        self.fields.get(top).map(String::as_str)
    }

    /// Hierarchy tops and their discriminator fields.
    pub fn hierarchy_fields(&self) -> impl Iterator<Item = (&TypeIdentity, &str)> + '_ {
        self.fields.iter().map(|(k, v)| (k, v.as_str()))
    }
}

/// Assigns discriminators and builds the per-root tables.
#[derive(Debug, Clone)]
pub struct Resolver {
    policy: Arc<dyn DiscriminatorPolicy>,
    default_field: String,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(PolicyKind::default())
    }
}

impl Resolver {
    /// Resolver using `policy` and the `"type"` discriminator field.
    pub fn new(policy: impl DiscriminatorPolicy + 'static) -> Self {
        Self::with_shared_policy(Arc::new(policy))
    }

    /// Resolver using an already shared policy.
    pub fn with_shared_policy(policy: Arc<dyn DiscriminatorPolicy>) -> Self {
        Self {
            policy,
            default_field: "type".to_string(),
        }
    }

    /// Discriminator field for hierarchies whose root does not override it.
    pub fn with_discriminator_field(mut self, field: impl Into<String>) -> Self {
        self.default_field = field.into();
        self
    }

    /// Resolve every hierarchy of `graph`.
    pub fn resolve(&self, graph: TypeGraph) -> Result<ResolvedGraph, BuildError> {
        let mut tables = BTreeMap::new();
        let mut discriminators = BTreeMap::new();
        let mut fields = BTreeMap::new();

        let tops: Vec<&TypeIdentity> = graph
            .identities()
            .filter(|id| {
                graph.parent(id.as_str()).is_none() && graph.is_polymorphic_root(id.as_str())
            })
            .collect();

        for top in tops {
            let Some(top_desc) = graph.get(top.as_str()) else {
                continue;
            };
            let field = top_desc
                .discriminator_field
                .clone()
                .unwrap_or_else(|| self.default_field.clone());

            let mut members = vec![top];
            members.extend(graph.descendants(top.as_str()));

            for member in &members {
                let Some(desc) = graph.get(member.as_str()) else {
                    continue;
                };
                if desc.field(&field).is_some() {
                    return Err(BuildError::DiscriminatorFieldClash {
                        root: top.clone(),
                        identity: desc.identity.clone(),
                        field,
                    });
                }
                if desc.discriminator_field.is_some() && *member != top {
                    tracing::debug!(
                        identity = %desc.identity,
                        "discriminator field override ignored below the hierarchy root"
                    );
                }
                if desc.is_concrete() {
                    discriminators.insert(desc.identity.clone(), self.policy.discriminator(desc));
                }
            }

            for root in members.iter().filter(|m| graph.is_polymorphic_root(m.as_str())) {
                let table = self.table_for(&graph, root, &field, &discriminators)?;
                tracing::trace!(
                    root = %root,
                    entries = table.len(),
                    aliases = table.aliases.len(),
                    "discriminator table built"
                );
                tables.insert((*root).clone(), Arc::new(table));
            }
            fields.insert(top.clone(), field);
        }

        tracing::debug!(
            hierarchies = fields.len(),
            tables = tables.len(),
            "polymorphic roots resolved"
        );

        Ok(ResolvedGraph {
            graph,
            tables,
            discriminators,
            fields,
        })
    }

    fn table_for(
        &self,
        graph: &TypeGraph,
        root: &TypeIdentity,
        field: &str,
        discriminators: &BTreeMap<TypeIdentity, Discriminator>,
    ) -> Result<DiscriminatorTable, BuildError> {
        let mut table = DiscriminatorTable::new(root.clone(), field.to_string());
        let mut members = vec![root];
        members.extend(graph.descendants(root.as_str()));

        let concrete: Vec<&TypeDescriptor> = members
            .into_iter()
            .filter_map(|id| graph.get(id.as_str()))
            .filter(|desc| desc.is_concrete())
            .collect();

        for desc in &concrete {
            if let Some(value) = discriminators.get(&desc.identity) {
                table.insert(value.clone(), desc.identity.clone())?;
            }
        }
        for desc in &concrete {
            for alias in &desc.aliases {
                table.insert_alias(alias.clone(), desc.identity.clone())?;
            }
        }
        Ok(table)
    }
}

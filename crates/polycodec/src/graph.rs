// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type graph.
//!
//! [`GraphBuilder`] aggregates the descriptors of a whole universe into a
//! [`TypeGraph`] keyed by identity, then links subtype edges. Linking runs in
//! identity order, so the resulting graph (and the first error reported, if
//! any) does not depend on the order the universe was enumerated in.

use crate::descriptor::{FieldDescriptor, TypeDescriptor, TypeIdentity};
use crate::error::BuildError;
use crate::extract::extract;
use crate::universe::{ScanFilter, TypeHandle};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

/// Acyclic graph of descriptors and their direct subtypes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeGraph {
    types: BTreeMap<TypeIdentity, TypeDescriptor>,
    children: BTreeMap<TypeIdentity, BTreeSet<TypeIdentity>>,
}

impl TypeGraph {
    /// Get descriptor by identity.
    pub fn get(&self, identity: &str) -> Option<&TypeDescriptor> {
        self.types.get(identity)
    }

    /// Check if `identity` is part of the graph.
    pub fn contains(&self, identity: &str) -> bool {
        self.types.contains_key(identity)
    }

    /// Number of types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if the graph holds no types.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// All identities, in order.
    pub fn identities(&self) -> impl Iterator<Item = &TypeIdentity> + '_ {
        self.types.keys()
    }

    /// All descriptors, in identity order.
    pub fn descriptors(&self) -> impl Iterator<Item = &TypeDescriptor> + '_ {
        self.types.values()
    }

    /// Direct subtypes of `identity`, in order.
    pub fn children(&self, identity: &str) -> impl DoubleEndedIterator<Item = &TypeIdentity> + '_ {
        self.children.get(identity).into_iter().flatten()
    }

    /// Declared supertype of `identity`.
    pub fn parent(&self, identity: &str) -> Option<&TypeIdentity> {
        self.get(identity)?.supertype.as_ref()
    }

    /// Supertypes of `identity`, nearest first.
    pub fn ancestors(&self, identity: &str) -> Vec<&TypeIdentity> {
        let mut out = Vec::new();
        let mut current = self.parent(identity);
        while let Some(id) = current {
            // Bounded by the graph size; edges were checked for cycles at build.
            if out.len() >= self.types.len() {
                break;
            }
            out.push(id);
            current = self.parent(id.as_str());
        }
        out
    }

    /// Transitive subtypes of `identity`, depth-first, siblings in order.
    pub fn descendants(&self, identity: &str) -> Vec<&TypeIdentity> {
        let mut out = Vec::new();
        let mut stack: Vec<&TypeIdentity> = self.children(identity).rev().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id.as_str()).rev());
        }
        out
    }

    /// Check if `identity` has at least one subtype.
    pub fn is_polymorphic_root(&self, identity: &str) -> bool {
        self.children.get(identity).is_some_and(|c| !c.is_empty())
    }

    /// Check if `identity` has a supertype or a subtype.
    pub fn in_hierarchy(&self, identity: &str) -> bool {
        self.parent(identity).is_some() || self.is_polymorphic_root(identity)
    }

    /// Top-most type of the hierarchy `identity` belongs to.
    ///
    /// Returns `None` for plain types (no supertype, no subtype).
    pub fn hierarchy_root(&self, identity: &str) -> Option<&TypeIdentity> {
        if !self.in_hierarchy(identity) {
            return None;
        }
        match self.ancestors(identity).last() {
            Some(top) => Some(*top),
            None => self.types.get_key_value(identity).map(|(k, _)| k),
        }
    }

    /// Check if a value of type `found` may stand where `expected` is declared.
    pub fn is_assignable(&self, found: &str, expected: &str) -> bool {
        found == expected || self.ancestors(found).iter().any(|a| a.as_str() == expected)
    }

    /// Fields of `identity` including inherited ones.
    ///
    /// Root-most ancestor first, then each subtype's own fields in declared
    /// order. A subtype redeclaring an inherited field with the same kind
    /// replaces it in place; a different kind is a [`BuildError::FieldConflict`].
    pub fn effective_fields(&self, identity: &str) -> Result<Vec<FieldDescriptor>, BuildError> {
        let Some(desc) = self.get(identity) else {
            return Ok(Vec::new());
        };

        let mut chain: Vec<&TypeDescriptor> = self
            .ancestors(identity)
            .into_iter()
            .rev()
            .filter_map(|id| self.get(id.as_str()))
            .collect();
        chain.push(desc);

        let mut fields: Vec<(&TypeIdentity, FieldDescriptor)> = Vec::new();
        for owner in chain {
            for field in &owner.fields {
                match fields.iter_mut().find(|(_, f)| f.name == field.name) {
                    Some((declared_by, existing)) => {
                        if existing.kind != field.kind {
                            return Err(BuildError::FieldConflict {
                                identity: owner.identity.clone(),
                                ancestor: (*declared_by).clone(),
                                field: field.name.clone(),
                            });
                        }
                        *declared_by = &owner.identity;
                        *existing = field.clone();
                    }
                    None => fields.push((&owner.identity, field.clone())),
                }
            }
        }
        Ok(fields.into_iter().map(|(_, f)| f).collect())
    }
}

/// Builds a [`TypeGraph`] from a candidate universe.
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    filter: ScanFilter,
}

impl GraphBuilder {
    /// Builder admitting every handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Only admit handles accepted by `filter`.
    pub fn with_filter(mut self, filter: ScanFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Extract every admitted handle and link the subtype edges.
    ///
    /// The universe is consumed exactly once.
    pub fn build<I>(&self, universe: I) -> Result<TypeGraph, BuildError>
    where
        I: IntoIterator,
        I::Item: TypeHandle,
    {
        let mut types: BTreeMap<TypeIdentity, TypeDescriptor> = BTreeMap::new();
        let mut skipped = 0usize;

        for handle in universe {
            if !self.filter.accepts(handle.identity()) {
                skipped += 1;
                continue;
            }
            let desc = extract(&handle)?;
            match types.entry(desc.identity.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(desc);
                }
                Entry::Occupied(slot) => {
                    if *slot.get() != desc {
                        return Err(BuildError::DuplicateTypeIdentity {
                            identity: desc.identity,
                        });
                    }
                    tracing::trace!(identity = %desc.identity, "identical type reported twice");
                }
            }
        }

        let children = link(&types)?;
        let edges: usize = children.values().map(BTreeSet::len).sum();
        tracing::debug!(types = types.len(), edges, skipped, "type graph built");

        Ok(TypeGraph { types, children })
    }
}

/// Add supertype -> subtype edges, refusing any edge that closes a cycle.
fn link(
    types: &BTreeMap<TypeIdentity, TypeDescriptor>,
) -> Result<BTreeMap<TypeIdentity, BTreeSet<TypeIdentity>>, BuildError> {
    let mut parents: BTreeMap<&TypeIdentity, &TypeIdentity> = BTreeMap::new();
    let mut children: BTreeMap<TypeIdentity, BTreeSet<TypeIdentity>> = BTreeMap::new();

    for (identity, desc) in types {
        let Some(supertype) = desc.supertype.as_ref() else {
            continue;
        };
        if !types.contains_key(supertype) {
            return Err(BuildError::UnknownSupertype {
                identity: identity.clone(),
                supertype: supertype.clone(),
            });
        }

        let mut path = vec![identity.clone()];
        let mut visited = BTreeSet::new();
        let mut current = Some(supertype);
        while let Some(id) = current {
            path.push(id.clone());
            if id == identity {
                return Err(BuildError::CyclicHierarchy {
                    identity: identity.clone(),
                    cycle: path,
                });
            }
            if !visited.insert(id) {
                break;
            }
            current = parents.get(id).copied();
        }

        parents.insert(identity, supertype);
        children
            .entry(supertype.clone())
            .or_default()
            .insert(identity.clone());
    }
    Ok(children)
}

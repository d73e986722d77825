// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type descriptor extraction.
//!
//! Turns one [`TypeHandle`] into a normalized [`TypeDescriptor`]. Extraction
//! is pure: the same handle always yields an equal descriptor.

use crate::descriptor::{
    Discriminator, FieldDescriptor, PrimitiveKind, TemporalKind, TypeDescriptor, TypeIdentity,
    ValueKind,
};
use crate::error::BuildError;
use crate::universe::{Shape, TypeHandle};
use std::collections::BTreeSet;

/// Extract the descriptor of one candidate type.
pub fn extract<H: TypeHandle + ?Sized>(handle: &H) -> Result<TypeDescriptor, BuildError> {
    let identity = TypeIdentity::new(handle.identity());
    if identity.as_str().trim().is_empty() {
        return Err(BuildError::unsupported(&identity, None, "empty type identity"));
    }

    let supertype = handle.supertype().map(TypeIdentity::new);
    if supertype.as_ref() == Some(&identity) {
        return Err(BuildError::unsupported(
            &identity,
            None,
            "type declares itself as its supertype",
        ));
    }

    let mut generics = Vec::with_capacity(handle.generics().len());
    for placeholder in handle.generics() {
        if generics.contains(placeholder) {
            return Err(BuildError::unsupported(
                &identity,
                None,
                format!("generic placeholder '{}' declared twice", placeholder),
            ));
        }
        generics.push(placeholder.clone());
    }

    if let Some(field) = handle.discriminator_field() {
        if field.trim().is_empty() {
            return Err(BuildError::unsupported(
                &identity,
                None,
                "empty discriminator field",
            ));
        }
    }
    let discriminator = handle.discriminator().cloned();
    for value in discriminator.iter().chain(handle.aliases()) {
        if matches!(value, Discriminator::Name(name) if name.is_empty()) {
            return Err(BuildError::unsupported(&identity, None, "empty discriminator"));
        }
    }

    let mut seen = BTreeSet::new();
    let mut fields = Vec::with_capacity(handle.fields().len());
    for raw in handle.fields() {
        if raw.name.is_empty() {
            return Err(BuildError::unsupported(&identity, None, "unnamed field"));
        }
        if !seen.insert(raw.name.as_str()) {
            return Err(BuildError::DuplicateField {
                identity: identity.clone(),
                field: raw.name.clone(),
            });
        }

        let kind = value_kind(&raw.shape, &generics, &identity, &raw.name)?;
        fields.push(FieldDescriptor {
            name: raw.name.clone(),
            nullable: raw.nullable || kind.is_optional(),
            kind,
            absent_by_default: raw.absent_by_default,
            default: raw.default.clone(),
        });
    }

    tracing::trace!(
        identity = %identity,
        fields = fields.len(),
        supertype = ?supertype,
        "extracted descriptor"
    );

    Ok(TypeDescriptor {
        identity,
        fields,
        supertype,
        generics,
        is_abstract: handle.is_abstract(),
        discriminator,
        aliases: handle.aliases().to_vec(),
        discriminator_field: handle.discriminator_field().map(str::to_string),
    })
}

fn value_kind(
    shape: &Shape,
    generics: &[String],
    identity: &TypeIdentity,
    field: &str,
) -> Result<ValueKind, BuildError> {
    let kind = match shape {
        Shape::Bool => ValueKind::Primitive(PrimitiveKind::Bool),
        Shape::I8 => ValueKind::Primitive(PrimitiveKind::I8),
        Shape::I16 => ValueKind::Primitive(PrimitiveKind::I16),
        Shape::I32 => ValueKind::Primitive(PrimitiveKind::I32),
        Shape::I64 => ValueKind::Primitive(PrimitiveKind::I64),
        Shape::U8 => ValueKind::Primitive(PrimitiveKind::U8),
        Shape::U16 => ValueKind::Primitive(PrimitiveKind::U16),
        Shape::U32 => ValueKind::Primitive(PrimitiveKind::U32),
        Shape::U64 => ValueKind::Primitive(PrimitiveKind::U64),
        Shape::F32 => ValueKind::Primitive(PrimitiveKind::F32),
        Shape::F64 => ValueKind::Primitive(PrimitiveKind::F64),
        Shape::Char => ValueKind::Primitive(PrimitiveKind::Char),
        Shape::String => ValueKind::Primitive(PrimitiveKind::String),
        Shape::Instant => ValueKind::Temporal(TemporalKind::Instant),
        Shape::Date => ValueKind::Temporal(TemporalKind::Date),
        Shape::DateTime => ValueKind::Temporal(TemporalKind::DateTime),
        Shape::Time => ValueKind::Temporal(TemporalKind::Time),
        Shape::Duration => ValueKind::Temporal(TemporalKind::Duration),
        Shape::Option(inner) => {
            // Option<Option<T>> carries no more information than Option<T>.
            let mut innermost = inner.as_ref();
            while let Shape::Option(next) = innermost {
                innermost = next;
            }
            ValueKind::Optional(Box::new(value_kind(innermost, generics, identity, field)?))
        }
        Shape::Seq(inner) => {
            ValueKind::Collection(Box::new(value_kind(inner, generics, identity, field)?))
        }
        Shape::Named(target) => {
            if target.trim().is_empty() {
                return Err(BuildError::unsupported(
                    identity,
                    Some(field),
                    "reference without a type identity",
                ));
            }
            ValueKind::Reference(TypeIdentity::new(target.as_str()))
        }
        Shape::Generic(placeholder) => {
            if !generics.contains(placeholder) {
                return Err(BuildError::unsupported(
                    identity,
                    Some(field),
                    format!("undeclared generic placeholder '{}'", placeholder),
                ));
            }
            ValueKind::Generic(placeholder.clone())
        }
        Shape::Function(signature) => {
            return Err(BuildError::unsupported(
                identity,
                Some(field),
                format!("function-valued member `{}`", signature),
            ));
        }
        Shape::Opaque(description) => {
            return Err(BuildError::unsupported(
                identity,
                Some(field),
                format!("opaque shape `{}`", description),
            ));
        }
    };
    Ok(kind)
}

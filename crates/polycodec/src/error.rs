// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error taxonomy.
//!
//! [`BuildError`] is fatal to a configuration attempt. [`CodecError`] is a
//! per-value failure returned by encode/decode; it never touches the shared
//! codec.

use crate::config::ConfigError;
use crate::descriptor::{Discriminator, PrimitiveKind, TemporalKind, TypeIdentity};
use thiserror::Error;

/// Coarse classification of a [`BuildError`], recorded by the build state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildErrorKind {
    UnsupportedTypeShape,
    DuplicateTypeIdentity,
    CyclicHierarchy,
    DiscriminatorCollision,
    DuplicateField,
    UnknownSupertype,
    FieldConflict,
    UnresolvedReference,
    DiscriminatorFieldClash,
    DuplicateRegistration,
    InvalidDefault,
    StaleAttempt,
    Config,
}

/// Build-time failures.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("unsupported type shape in {identity}{}: {reason}", field_suffix(.field))]
    UnsupportedTypeShape {
        identity: TypeIdentity,
        field: Option<String>,
        reason: String,
    },

    #[error("type identity {identity} reported twice with different shapes")]
    DuplicateTypeIdentity { identity: TypeIdentity },

    #[error("cyclic hierarchy: {}", join_path(.cycle))]
    CyclicHierarchy {
        identity: TypeIdentity,
        cycle: Vec<TypeIdentity>,
    },

    #[error("discriminator '{discriminator}' under root {root} is claimed by both {first} and {second}")]
    DiscriminatorCollision {
        root: TypeIdentity,
        discriminator: Discriminator,
        first: TypeIdentity,
        second: TypeIdentity,
    },

    #[error("field '{field}' declared twice in {identity}")]
    DuplicateField { identity: TypeIdentity, field: String },

    #[error("{identity} extends {supertype}, which is not part of the type universe")]
    UnknownSupertype {
        identity: TypeIdentity,
        supertype: TypeIdentity,
    },

    #[error("{identity} redeclares field '{field}' inherited from {ancestor} with a different kind")]
    FieldConflict {
        identity: TypeIdentity,
        ancestor: TypeIdentity,
        field: String,
    },

    #[error("field '{field}' of {identity} references unknown type {target}")]
    UnresolvedReference {
        identity: TypeIdentity,
        field: String,
        target: TypeIdentity,
    },

    #[error("{identity} declares field '{field}', which is the discriminator field of hierarchy {root}")]
    DiscriminatorFieldClash {
        root: TypeIdentity,
        identity: TypeIdentity,
        field: String,
    },

    #[error("{hook} registered twice for {identity}")]
    DuplicateRegistration {
        identity: TypeIdentity,
        hook: &'static str,
    },

    #[error("default of field '{field}' in {identity} does not fit the field: {reason}")]
    InvalidDefault {
        identity: TypeIdentity,
        field: String,
        reason: String,
    },

    #[error("build attempt already used (state: {state})")]
    StaleAttempt { state: String },

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl BuildError {
    /// Classification of this error.
    pub fn kind(&self) -> BuildErrorKind {
        match self {
            Self::UnsupportedTypeShape { .. } => BuildErrorKind::UnsupportedTypeShape,
            Self::DuplicateTypeIdentity { .. } => BuildErrorKind::DuplicateTypeIdentity,
            Self::CyclicHierarchy { .. } => BuildErrorKind::CyclicHierarchy,
            Self::DiscriminatorCollision { .. } => BuildErrorKind::DiscriminatorCollision,
            Self::DuplicateField { .. } => BuildErrorKind::DuplicateField,
            Self::UnknownSupertype { .. } => BuildErrorKind::UnknownSupertype,
            Self::FieldConflict { .. } => BuildErrorKind::FieldConflict,
            Self::UnresolvedReference { .. } => BuildErrorKind::UnresolvedReference,
            Self::DiscriminatorFieldClash { .. } => BuildErrorKind::DiscriminatorFieldClash,
            Self::DuplicateRegistration { .. } => BuildErrorKind::DuplicateRegistration,
            Self::InvalidDefault { .. } => BuildErrorKind::InvalidDefault,
            Self::StaleAttempt { .. } => BuildErrorKind::StaleAttempt,
            Self::Config(_) => BuildErrorKind::Config,
        }
    }

    pub(crate) fn unsupported(
        identity: &TypeIdentity,
        field: Option<&str>,
        reason: impl Into<String>,
    ) -> Self {
        Self::UnsupportedTypeShape {
            identity: identity.clone(),
            field: field.map(str::to_string),
            reason: reason.into(),
        }
    }
}

fn field_suffix(field: &Option<String>) -> String {
    field.as_ref().map(|f| format!(".{}", f)).unwrap_or_default()
}

fn join_path(path: &[TypeIdentity]) -> String {
    path.iter()
        .map(TypeIdentity::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Encode/decode failures for a single value.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("unknown discriminator {discriminator} for root {root}")]
    UnknownDiscriminator {
        discriminator: String,
        root: TypeIdentity,
    },

    #[error("malformed {} value {value:?} at {path}", .kind.name())]
    MalformedTemporalValue {
        kind: TemporalKind,
        value: String,
        path: String,
    },

    #[error("missing discriminator field '{field}' for root {root}")]
    MissingDiscriminator { root: TypeIdentity, field: String },

    #[error("type {identity} is not registered with this codec")]
    UnknownType { identity: TypeIdentity },

    #[error("type {identity} is abstract and cannot be encoded or decoded")]
    NotInstantiable { identity: TypeIdentity },

    #[error("value of type {found} is not assignable to {expected} at {path}")]
    NotAssignable {
        expected: TypeIdentity,
        found: TypeIdentity,
        path: String,
    },

    #[error("missing field '{field}' of {identity}")]
    MissingField { identity: TypeIdentity, field: String },

    #[error("unknown field '{field}' for {identity}")]
    UnknownField { identity: TypeIdentity, field: String },

    #[error("type mismatch at {path}: expected {expected}, found {found}")]
    TypeMismatch {
        path: String,
        expected: String,
        found: String,
    },

    #[error("value {value} out of range for {} at {path}", .kind.name())]
    OutOfRange {
        path: String,
        kind: PrimitiveKind,
        value: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_error_messages_name_identities() {
        let err = BuildError::DiscriminatorCollision {
            root: "geo::Shape".into(),
            discriminator: Discriminator::from("Circle"),
            first: "geo::Circle".into(),
            second: "legacy::Circle".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("geo::Circle"));
        assert!(msg.contains("legacy::Circle"));
        assert_eq!(err.kind(), BuildErrorKind::DiscriminatorCollision);
    }

    #[test]
    fn test_cycle_message() {
        let err = BuildError::CyclicHierarchy {
            identity: "a::A".into(),
            cycle: vec!["a::A".into(), "a::B".into(), "a::A".into()],
        };
        assert_eq!(err.to_string(), "cyclic hierarchy: a::A -> a::B -> a::A");
    }

    #[test]
    fn test_unsupported_shape_message() {
        let id = TypeIdentity::new("app::Handler");
        let err = BuildError::unsupported(&id, Some("callback"), "function-valued field");
        assert_eq!(
            err.to_string(),
            "unsupported type shape in app::Handler.callback: function-valued field"
        );
    }

    #[test]
    fn test_codec_error_messages() {
        let err = CodecError::UnknownDiscriminator {
            discriminator: "\"Triangle\"".into(),
            root: "geo::Shape".into(),
        };
        assert_eq!(
            err.to_string(),
            "unknown discriminator \"Triangle\" for root geo::Shape"
        );

        let err = CodecError::MalformedTemporalValue {
            kind: TemporalKind::Date,
            value: "2024-13-01".into(),
            path: "/born".into(),
        };
        assert_eq!(err.to_string(), "malformed date value \"2024-13-01\" at /born");
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec engine capability.

use super::strategy::{DecodeStrategy, EncodeStrategy};
use super::{CodecInner, ConfiguredCodec};
use crate::config::UnknownFields;
use crate::descriptor::TypeIdentity;
use crate::error::BuildError;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Registration hooks a codec backend exposes to the configurator.
pub trait CodecEngine {
    /// Product of [`CodecEngine::seal`].
    type Codec;

    fn register_encode(
        &mut self,
        identity: TypeIdentity,
        strategy: EncodeStrategy,
    ) -> Result<(), BuildError>;

    fn register_decode(
        &mut self,
        identity: TypeIdentity,
        strategy: DecodeStrategy,
    ) -> Result<(), BuildError>;

    fn register_discriminator_field(
        &mut self,
        root: TypeIdentity,
        field: String,
    ) -> Result<(), BuildError>;

    /// Finish registration. The engine is consumed.
    fn seal(self) -> Result<Self::Codec, BuildError>;
}

/// `serde_json` backend producing a [`ConfiguredCodec`].
#[derive(Debug, Default)]
pub struct JsonEngine {
    unknown_fields: UnknownFields,
    encoders: BTreeMap<TypeIdentity, EncodeStrategy>,
    decoders: BTreeMap<TypeIdentity, DecodeStrategy>,
    discriminator_fields: BTreeMap<TypeIdentity, String>,
}

impl JsonEngine {
    pub fn new(unknown_fields: UnknownFields) -> Self {
        Self {
            unknown_fields,
            ..Default::default()
        }
    }
}

fn register_once<V>(
    map: &mut BTreeMap<TypeIdentity, V>,
    identity: TypeIdentity,
    value: V,
    hook: &'static str,
) -> Result<(), BuildError> {
    match map.entry(identity) {
        Entry::Vacant(slot) => {
            slot.insert(value);
            Ok(())
        }
        Entry::Occupied(slot) => Err(BuildError::DuplicateRegistration {
            identity: slot.key().clone(),
            hook,
        }),
    }
}

impl CodecEngine for JsonEngine {
    type Codec = ConfiguredCodec;

    fn register_encode(
        &mut self,
        identity: TypeIdentity,
        strategy: EncodeStrategy,
    ) -> Result<(), BuildError> {
        register_once(&mut self.encoders, identity, strategy, "encode strategy")
    }

    fn register_decode(
        &mut self,
        identity: TypeIdentity,
        strategy: DecodeStrategy,
    ) -> Result<(), BuildError> {
        register_once(&mut self.decoders, identity, strategy, "decode strategy")
    }

    fn register_discriminator_field(
        &mut self,
        root: TypeIdentity,
        field: String,
    ) -> Result<(), BuildError> {
        register_once(
            &mut self.discriminator_fields,
            root,
            field,
            "discriminator field",
        )
    }

    fn seal(self) -> Result<ConfiguredCodec, BuildError> {
        // Every table target must be decodable through a registered plan.
        for strategy in self.decoders.values() {
            let DecodeStrategy::Polymorphic { table } = strategy else {
                continue;
            };
            for (_, target) in table.entries().chain(table.aliases()) {
                if !matches!(self.encoders.get(target), Some(EncodeStrategy::Object(_))) {
                    return Err(BuildError::UnresolvedReference {
                        identity: table.root().clone(),
                        field: table.field().to_string(),
                        target: target.clone(),
                    });
                }
            }
        }

        tracing::trace!(
            encoders = self.encoders.len(),
            decoders = self.decoders.len(),
            "json engine sealed"
        );

        let inner = CodecInner {
            encoders: self.encoders,
            decoders: self.decoders,
            discriminator_fields: self.discriminator_fields,
            unknown_fields: self.unknown_fields,
        };
        inner.check_defaults()?;
        Ok(ConfiguredCodec::from_inner(Arc::new(inner)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::strategy::ObjectPlan;
    use crate::error::BuildErrorKind;

    fn plan(identity: &str) -> Arc<ObjectPlan> {
        Arc::new(ObjectPlan {
            identity: identity.into(),
            tag: None,
            fields: Vec::new(),
            ancestors: Vec::new(),
        })
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut engine = JsonEngine::new(UnknownFields::Ignore);
        engine
            .register_encode("a::A".into(), EncodeStrategy::Object(plan("a::A")))
            .expect("first");
        let err = engine
            .register_encode("a::A".into(), EncodeStrategy::Object(plan("a::A")))
            .expect_err("second");
        assert_eq!(err.kind(), BuildErrorKind::DuplicateRegistration);
    }

    #[test]
    fn test_seal_plain_types() {
        let mut engine = JsonEngine::new(UnknownFields::Reject);
        engine
            .register_encode("a::A".into(), EncodeStrategy::Object(plan("a::A")))
            .expect("encode");
        engine
            .register_decode("a::A".into(), DecodeStrategy::Concrete(plan("a::A")))
            .expect("decode");
        let codec = engine.seal().expect("seal");
        assert!(codec.contains("a::A"));
        assert_eq!(codec.field_order("a::A"), Some(Vec::new()));
    }
}

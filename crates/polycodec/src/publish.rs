// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec publication.
//!
//! [`CodecHandle`] holds the current [`ConfiguredCodec`] behind an `ArcSwap`.
//! Readers load it without locking; reconfiguration builds a whole new codec
//! and swaps it in atomically. A failed rebuild leaves the published codec
//! untouched, so readers never see a partially configured state.
//!
//! ```ignore
//! let handle = CodecHandle::new(pipeline.build(universe)?);
//!
//! // Passed to every reader (clone = Arc counter increment)
//! let reader = handle.clone();
//! let bytes = reader.load().encode(&value)?;
//!
//! // Later: types were added
//! handle.rebuild(&pipeline, new_universe)?;
//! ```

use crate::codec::ConfiguredCodec;
use crate::error::BuildError;
use crate::pipeline::Pipeline;
use crate::universe::TypeHandle;
use arc_swap::ArcSwap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Shared, atomically swappable reference to the current codec.
#[derive(Clone)]
pub struct CodecHandle {
    current: Arc<ArcSwap<ConfiguredCodec>>,
    generation: Arc<AtomicU64>,
}

impl CodecHandle {
    /// Publish `codec` as generation 0.
    pub fn new(codec: ConfiguredCodec) -> Self {
        Self {
            current: Arc::new(ArcSwap::from_pointee(codec)),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Current codec.
    #[inline]
    pub fn load(&self) -> Arc<ConfiguredCodec> {
        self.current.load_full()
    }

    /// Number of swaps since creation.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Publish `codec`, returning the previous one.
    pub fn swap(&self, codec: ConfiguredCodec) -> Arc<ConfiguredCodec> {
        self.publish(Arc::new(codec))
    }

    fn publish(&self, codec: Arc<ConfiguredCodec>) -> Arc<ConfiguredCodec> {
        let previous = self.current.swap(codec);
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        tracing::debug!(generation, "codec published");
        previous
    }

    /// Build a codec from `universe` and publish it on success.
    ///
    /// On failure the current codec stays published and the error is returned.
    pub fn rebuild<I>(
        &self,
        pipeline: &Pipeline,
        universe: I,
    ) -> Result<Arc<ConfiguredCodec>, BuildError>
    where
        I: IntoIterator,
        I::Item: TypeHandle,
    {
        let codec = Arc::new(pipeline.build(universe)?);
        self.publish(Arc::clone(&codec));
        Ok(codec)
    }
}

impl std::fmt::Debug for CodecHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecHandle")
            .field("generation", &self.generation())
            .field("types", &self.load().type_count())
            .finish()
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Build pipeline and its state machine.
//!
//! ```text
//! Unconfigured -> Extracting -> GraphBuilt -> Resolved -> Configured
//!        \             \             \            \
//!         +-------------+-------------+------------+--> Failed(kind)
//! ```
//!
//! A [`BuildAttempt`] only ever moves forward. A failed or finished attempt
//! cannot be reused; start a new one.

use crate::codec::configure::Configurator;
use crate::codec::engine::JsonEngine;
use crate::codec::ConfiguredCodec;
use crate::config::CodecConfig;
use crate::error::{BuildError, BuildErrorKind};
use crate::graph::GraphBuilder;
use crate::resolver::{DiscriminatorPolicy, Resolver};
use crate::universe::TypeHandle;
use std::fmt;
use std::sync::Arc;

/// State of one build attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildState {
    Unconfigured,
    Extracting,
    GraphBuilt,
    Resolved,
    Configured,
    Failed(BuildErrorKind),
}

impl BuildState {
    /// Check if no further transition is possible.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Configured | Self::Failed(_))
    }

    /// Next state on success.
    pub fn successor(self) -> Option<Self> {
        match self {
            Self::Unconfigured => Some(Self::Extracting),
            Self::Extracting => Some(Self::GraphBuilt),
            Self::GraphBuilt => Some(Self::Resolved),
            Self::Resolved => Some(Self::Configured),
            Self::Configured | Self::Failed(_) => None,
        }
    }
}

impl fmt::Display for BuildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unconfigured => f.write_str("unconfigured"),
            Self::Extracting => f.write_str("extracting"),
            Self::GraphBuilt => f.write_str("graph-built"),
            Self::Resolved => f.write_str("resolved"),
            Self::Configured => f.write_str("configured"),
            Self::Failed(kind) => write!(f, "failed({:?})", kind),
        }
    }
}

/// Forward-only record of one build attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildAttempt {
    state: BuildState,
    trail: Vec<BuildState>,
}

impl Default for BuildAttempt {
    fn default() -> Self {
        Self::new()
    }
}

impl BuildAttempt {
    pub fn new() -> Self {
        Self {
            state: BuildState::Unconfigured,
            trail: vec![BuildState::Unconfigured],
        }
    }

    /// Current state.
    pub fn state(&self) -> BuildState {
        self.state
    }

    /// Every state visited, in order.
    pub fn trail(&self) -> &[BuildState] {
        &self.trail
    }

    /// Move to `next` if it is the successor of the current state, or a
    /// failure from a non-terminal state. Returns `false` otherwise.
    pub fn transition(&mut self, next: BuildState) -> bool {
        let allowed = match next {
            BuildState::Failed(_) => !self.state.is_terminal(),
            _ => self.state.successor() == Some(next),
        };
        if allowed {
            tracing::trace!(from = %self.state, to = %next, "build state transition");
            self.state = next;
            self.trail.push(next);
        }
        allowed
    }

    fn advance(&mut self) {
        if let Some(next) = self.state.successor() {
            self.transition(next);
        }
    }
}

/// Extractor -> graph builder -> resolver -> configurator.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: CodecConfig,
    policy: Arc<dyn DiscriminatorPolicy>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(CodecConfig::default())
    }
}

impl Pipeline {
    /// Pipeline using the policy named by `config`.
    pub fn new(config: CodecConfig) -> Self {
        let policy: Arc<dyn DiscriminatorPolicy> = Arc::new(config.discriminator_policy);
        Self { config, policy }
    }

    /// Replace the discriminator policy.
    pub fn with_policy(mut self, policy: impl DiscriminatorPolicy + 'static) -> Self {
        self.policy = Arc::new(policy);
        self
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Build a codec from `universe` with a fresh attempt.
    pub fn build<I>(&self, universe: I) -> Result<ConfiguredCodec, BuildError>
    where
        I: IntoIterator,
        I::Item: TypeHandle,
    {
        let mut attempt = BuildAttempt::new();
        self.run(universe, &mut attempt)
    }

    /// Build a codec, recording progress in `attempt`.
    ///
    /// `attempt` must be fresh; a used attempt yields
    /// [`BuildError::StaleAttempt`] and is left untouched.
    pub fn run<I>(
        &self,
        universe: I,
        attempt: &mut BuildAttempt,
    ) -> Result<ConfiguredCodec, BuildError>
    where
        I: IntoIterator,
        I::Item: TypeHandle,
    {
        if attempt.state() != BuildState::Unconfigured {
            return Err(BuildError::StaleAttempt {
                state: attempt.state().to_string(),
            });
        }

        let result = self.stages(universe, attempt);
        match &result {
            Ok(codec) => {
                let tables = codec.discriminator_tables().count();
                tracing::info!(
                    types = codec.type_count(),
                    polymorphic_roots = tables,
                    "codec configured"
                );
            }
            Err(err) => {
                let stage = attempt.state();
                attempt.transition(BuildState::Failed(err.kind()));
                tracing::warn!(stage = %stage, error = %err, "codec build failed");
            }
        }
        result
    }

    fn stages<I>(
        &self,
        universe: I,
        attempt: &mut BuildAttempt,
    ) -> Result<ConfiguredCodec, BuildError>
    where
        I: IntoIterator,
        I::Item: TypeHandle,
    {
        self.config.validate()?;

        attempt.advance();
        let graph = GraphBuilder::new()
            .with_filter(self.config.scan.clone())
            .build(universe)?;
        attempt.advance();

        let resolved = Resolver::with_shared_policy(Arc::clone(&self.policy))
            .with_discriminator_field(self.config.discriminator_field.clone())
            .resolve(graph)?;
        attempt.advance();

        let engine = JsonEngine::new(self.config.unknown_fields);
        let codec = Configurator::new(resolved).configure(engine)?;
        attempt.advance();
        Ok(codec)
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec configuration.
//!
//! Supports both programmatic and file-based configuration.
//!
//! ```toml
//! discriminator_field = "kind"
//! discriminator_policy = "explicit"
//! unknown_fields = "reject"
//!
//! [scan]
//! include = ["shop::model"]
//! exclude = ["shop::model::internal"]
//! ```

use crate::resolver::PolicyKind;
use crate::universe::ScanFilter;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Handling of JSON properties that match no field of the decoded type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownFields {
    /// Skip them.
    #[default]
    Ignore,
    /// Fail with `CodecError::UnknownField`.
    Reject,
}

/// Codec build configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Discriminator field used by hierarchies that do not override it.
    #[serde(default = "default_discriminator_field")]
    pub discriminator_field: String,

    /// How discriminators are derived from descriptors.
    #[serde(default)]
    pub discriminator_policy: PolicyKind,

    /// Unknown JSON properties on decode.
    #[serde(default)]
    pub unknown_fields: UnknownFields,

    /// Namespace filter applied to the candidate universe.
    #[serde(default)]
    pub scan: ScanFilter,
}

fn default_discriminator_field() -> String {
    "type".to_string()
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            discriminator_field: default_discriminator_field(),
            discriminator_policy: PolicyKind::default(),
            unknown_fields: UnknownFields::default(),
            scan: ScanFilter::default(),
        }
    }
}

impl CodecConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the default discriminator field.
    pub fn with_discriminator_field(mut self, field: impl Into<String>) -> Self {
        self.discriminator_field = field.into();
        self
    }

    /// Set the discriminator policy.
    pub fn with_policy(mut self, policy: PolicyKind) -> Self {
        self.discriminator_policy = policy;
        self
    }

    /// Set unknown-field handling.
    pub fn with_unknown_fields(mut self, mode: UnknownFields) -> Self {
        self.unknown_fields = mode;
        self
    }

    /// Set the scan filter.
    pub fn with_scan(mut self, scan: ScanFilter) -> Self {
        self.scan = scan;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.discriminator_field.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "discriminator_field must not be empty".into(),
            ));
        }

        for prefix in self.scan.include.iter().chain(&self.scan.exclude) {
            if prefix.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "scan prefixes must not be empty".into(),
                ));
            }
        }

        if let Some(both) = self
            .scan
            .include
            .iter()
            .find(|p| self.scan.exclude.contains(p))
        {
            return Err(ConfigError::Invalid(format!(
                "Namespace '{}' is both included and excluded",
                both
            )));
        }

        Ok(())
    }
}

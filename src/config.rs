// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Operator configuration file.
//!
//! The configuration is a YAML document; every field has a default so an absent file
//! or an empty document yields a working (if zone-less) operator.
//!
//! ```yaml
//! managedZones:
//!   - name: example-com
//!     domainName: example.com
//!     provider: inMemory
//!   - name: team-a-zone
//!     namespace: team-a
//!     domainName: team-a.example.com
//! credentialSelector:
//!   key: argocd.argoproj.io/secret-type
//!   value: cluster
//! gatewayBatchWindowMillis: 500
//! ```

use crate::constants::DEFAULT_GATEWAY_BATCH_WINDOW_MILLIS;
use crate::labels::{CREDENTIAL_LABEL_KEY, CREDENTIAL_LABEL_VALUE};
use anyhow::{bail, Context as _, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Publisher implementation backing a managed zone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProviderKind {
    /// Records are held in process memory. Used for dry runs and tests.
    #[default]
    InMemory,
}

/// A provider zone record sets may target.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedZoneConfig {
    /// Name referenced by `spec.managedZone.name`
    pub name: String,

    /// Restricts the zone to record sets in this namespace. Unset means every namespace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Apex domain of the zone, e.g. `example.com`
    pub domain_name: String,

    #[serde(default)]
    pub provider: ProviderKind,
}

/// Label identifying credential secrets.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialSelector {
    pub key: String,
    pub value: String,
}

impl Default for CredentialSelector {
    fn default() -> Self {
        Self {
            key: CREDENTIAL_LABEL_KEY.to_string(),
            value: CREDENTIAL_LABEL_VALUE.to_string(),
        }
    }
}

impl CredentialSelector {
    /// Kubernetes label selector string (`key=value`) for watch and list calls.
    #[must_use]
    pub fn as_label_selector(&self) -> String {
        format!("{}={}", self.key, self.value)
    }
}

/// Top-level operator configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorConfig {
    #[serde(default)]
    pub managed_zones: Vec<ManagedZoneConfig>,

    #[serde(default)]
    pub credential_selector: CredentialSelector,

    /// Window over which gateway re-evaluation requests are deduplicated
    #[serde(default = "default_batch_window_millis")]
    pub gateway_batch_window_millis: u64,
}

fn default_batch_window_millis() -> u64 {
    DEFAULT_GATEWAY_BATCH_WINDOW_MILLIS
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self {
            managed_zones: Vec::new(),
            credential_selector: CredentialSelector::default(),
            gateway_batch_window_millis: DEFAULT_GATEWAY_BATCH_WINDOW_MILLIS,
        }
    }
}

impl OperatorConfig {
    /// Parse and validate a YAML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid YAML for this shape or fails
    /// [`OperatorConfig::validate`].
    pub fn from_yaml(document: &str) -> Result<Self> {
        // serde_yaml rejects an empty document, which should mean "all defaults"
        let config: Self = if document.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(document).context("failed to parse operator configuration")?
        };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `path`, or defaults when no path is given.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            info!("No configuration file given, using defaults");
            return Ok(Self::default());
        };

        debug!(path = %path.display(), "Loading operator configuration");
        let document = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read configuration file {}", path.display()))?;

        let config = Self::from_yaml(&document)
            .with_context(|| format!("invalid configuration file {}", path.display()))?;

        info!(
            path = %path.display(),
            managed_zones = config.managed_zones.len(),
            "Loaded operator configuration"
        );
        Ok(config)
    }

    /// Reject configurations in which a zone reference could resolve ambiguously.
    ///
    /// # Errors
    ///
    /// Returns an error for empty zone names or domain names, or for two zones sharing
    /// both name and namespace scope.
    pub fn validate(&self) -> Result<()> {
        let mut seen = BTreeSet::new();

        for zone in &self.managed_zones {
            if zone.name.is_empty() {
                bail!("managed zone with domain '{}' has no name", zone.domain_name);
            }
            if zone.domain_name.is_empty() {
                bail!("managed zone '{}' has no domainName", zone.name);
            }
            if !seen.insert((zone.namespace.clone(), zone.name.clone())) {
                bail!(
                    "managed zone '{}' declared twice for namespace scope {:?}",
                    zone.name,
                    zone.namespace
                );
            }
        }

        if self.credential_selector.key.is_empty() {
            bail!("credentialSelector.key must not be empty");
        }

        Ok(())
    }

    #[must_use]
    pub fn gateway_batch_window(&self) -> Duration {
        Duration::from_millis(self.gateway_batch_window_millis)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;

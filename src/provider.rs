// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Zone publishers: the boundary between record set reconciliation and DNS providers.
//!
//! A [`ZonePublisher`] receives the planned operations of one cycle for one managed zone
//! and reports a result per operation. Publishers never abort the batch on the first
//! failure; every operation gets its own [`OperationResult`].
//!
//! The [`ProviderRegistry`] maps `spec.managedZone` references to configured zones and
//! their publishers, honouring namespace scoping.

use crate::config::{ManagedZoneConfig, OperatorConfig, ProviderKind};
use crate::crd::Endpoint;
use crate::errors::ProviderOperationError;
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// A configured provider zone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManagedZone {
    pub name: String,
    pub namespace: Option<String>,
    pub domain_name: String,
}

impl From<&ManagedZoneConfig> for ManagedZone {
    fn from(config: &ManagedZoneConfig) -> Self {
        Self {
            name: config.name.clone(),
            namespace: config.namespace.clone(),
            domain_name: config.domain_name.clone(),
        }
    }
}

impl ManagedZone {
    /// True when `dns_name` is the zone apex or a name below it.
    #[must_use]
    pub fn contains(&self, dns_name: &str) -> bool {
        let name = dns_name.trim_end_matches('.').to_ascii_lowercase();
        let apex = self.domain_name.trim_end_matches('.').to_ascii_lowercase();
        name == apex || name.ends_with(&format!(".{apex}"))
    }
}

/// A single planned change against a provider zone.
#[derive(Clone, Debug, PartialEq)]
pub enum Operation {
    Create(Endpoint),
    /// Carries the desired endpoint
    Update(Endpoint),
    Delete(Endpoint),
}

impl Operation {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Create(_) => "create",
            Self::Update(_) => "update",
            Self::Delete(_) => "delete",
        }
    }

    #[must_use]
    pub fn endpoint(&self) -> &Endpoint {
        match self {
            Self::Create(endpoint) | Self::Update(endpoint) | Self::Delete(endpoint) => endpoint,
        }
    }

    #[must_use]
    pub fn set_id(&self) -> String {
        self.endpoint().set_id()
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.endpoint())
    }
}

/// Outcome of one [`Operation`].
#[derive(Clone, Debug, PartialEq)]
pub struct OperationResult {
    pub operation: Operation,
    pub outcome: Result<(), ProviderOperationError>,
}

impl OperationResult {
    #[must_use]
    pub fn success(operation: Operation) -> Self {
        Self {
            operation,
            outcome: Ok(()),
        }
    }

    #[must_use]
    pub fn failure(operation: Operation, error: ProviderOperationError) -> Self {
        Self {
            operation,
            outcome: Err(error),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Applies planned operations to one provider zone.
#[async_trait]
pub trait ZonePublisher: Send + Sync {
    /// Apply `operations` to `zone`, returning exactly one result per operation, in order.
    async fn apply(&self, zone: &ManagedZone, operations: &[Operation]) -> Vec<OperationResult>;
}

/// In-process zone store.
///
/// Holds records keyed by set id. Creating an existing set id or updating a missing one
/// is rejected, as a real provider would; deleting a missing set id succeeds so teardown
/// converges. Names outside the zone apex are rejected.
///
/// Failures can be injected per set id, or for the whole zone, to exercise partial
/// publishing.
#[derive(Default)]
pub struct InMemoryZone {
    records: RwLock<BTreeMap<String, Endpoint>>,
    rejected_set_ids: RwLock<BTreeSet<String>>,
    unavailable: RwLock<bool>,
}

impl InMemoryZone {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records currently held, ordered by set id.
    pub async fn records(&self) -> Vec<Endpoint> {
        self.records.read().await.values().cloned().collect()
    }

    /// Make every operation on `set_id` fail with a rejection.
    pub async fn reject_set_id(&self, set_id: impl Into<String>) {
        self.rejected_set_ids.write().await.insert(set_id.into());
    }

    pub async fn clear_rejections(&self) {
        self.rejected_set_ids.write().await.clear();
    }

    /// Make every operation fail as if the provider could not be reached.
    pub async fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.write().await = unavailable;
    }

    fn rejected(
        operation: &Operation,
        zone: &ManagedZone,
        reason: impl Into<String>,
    ) -> OperationResult {
        OperationResult::failure(
            operation.clone(),
            ProviderOperationError::Rejected {
                operation: operation.kind().to_string(),
                set_id: operation.set_id(),
                zone: zone.name.clone(),
                reason: reason.into(),
            },
        )
    }
}

#[async_trait]
impl ZonePublisher for InMemoryZone {
    async fn apply(&self, zone: &ManagedZone, operations: &[Operation]) -> Vec<OperationResult> {
        if *self.unavailable.read().await {
            warn!(zone = %zone.name, operations = operations.len(), "In-memory zone unavailable");
            return operations
                .iter()
                .map(|operation| {
                    OperationResult::failure(
                        operation.clone(),
                        ProviderOperationError::Unavailable {
                            zone: zone.name.clone(),
                            reason: "zone marked unavailable".to_string(),
                        },
                    )
                })
                .collect();
        }

        let rejected_set_ids = self.rejected_set_ids.read().await.clone();
        let mut records = self.records.write().await;
        let mut results = Vec::with_capacity(operations.len());

        for operation in operations {
            let set_id = operation.set_id();
            let endpoint = operation.endpoint();

            if rejected_set_ids.contains(&set_id) {
                results.push(Self::rejected(operation, zone, "rejected by provider"));
                continue;
            }

            if !zone.contains(&endpoint.dns_name) {
                results.push(Self::rejected(
                    operation,
                    zone,
                    format!("name is outside zone apex {}", zone.domain_name),
                ));
                continue;
            }

            let result = match operation {
                Operation::Create(_) if records.contains_key(&set_id) => {
                    Self::rejected(operation, zone, "record already exists")
                }
                Operation::Update(_) if !records.contains_key(&set_id) => {
                    Self::rejected(operation, zone, "record does not exist")
                }
                Operation::Create(desired) | Operation::Update(desired) => {
                    records.insert(set_id.clone(), desired.clone());
                    OperationResult::success(operation.clone())
                }
                Operation::Delete(_) => {
                    records.remove(&set_id);
                    OperationResult::success(operation.clone())
                }
            };

            debug!(
                zone = %zone.name,
                operation = operation.kind(),
                set_id = %set_id,
                success = result.is_success(),
                "Applied in-memory zone operation"
            );
            results.push(result);
        }

        results
    }
}

/// A zone reference resolved to its publisher.
#[derive(Clone)]
pub struct ResolvedZone {
    pub zone: ManagedZone,
    pub publisher: Arc<dyn ZonePublisher>,
}

/// Configured managed zones and their publishers.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    zones: Vec<ResolvedZone>,
}

impl ProviderRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build publishers for every zone declared in the configuration.
    #[must_use]
    pub fn from_config(config: &OperatorConfig) -> Self {
        let mut registry = Self::new();
        for zone_config in &config.managed_zones {
            let publisher: Arc<dyn ZonePublisher> = match zone_config.provider {
                ProviderKind::InMemory => Arc::new(InMemoryZone::new()),
            };
            registry.register(ManagedZone::from(zone_config), publisher);
        }
        registry
    }

    pub fn register(&mut self, zone: ManagedZone, publisher: Arc<dyn ZonePublisher>) {
        self.zones.push(ResolvedZone { zone, publisher });
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Resolve zone `name` for a record set in `namespace`.
    ///
    /// A zone scoped to `namespace` wins over an unscoped zone of the same name. Zones
    /// scoped to another namespace never resolve.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderOperationError::ZoneNotFound`] when no zone matches.
    pub fn resolve(&self, namespace: &str, name: &str) -> Result<ResolvedZone, ProviderOperationError> {
        let mut candidates = self.zones.iter().filter(|resolved| resolved.zone.name == name);

        let scoped = candidates
            .clone()
            .find(|resolved| resolved.zone.namespace.as_deref() == Some(namespace));
        let unscoped = candidates.find(|resolved| resolved.zone.namespace.is_none());

        scoped
            .or(unscoped)
            .cloned()
            .ok_or_else(|| ProviderOperationError::ZoneNotFound {
                zone: name.to_string(),
                namespace: namespace.to_string(),
            })
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod provider_tests;

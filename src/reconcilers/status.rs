// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Status condition helpers for `DNSRecord` resources.
//!
//! Kubernetes conditions follow a standard format:
//! - `type`: The aspect of the resource being reported (`Ready`, `Failed`)
//! - `status`: "True", "False", or "Unknown"
//! - `reason`: A programmatic identifier (CamelCase)
//! - `message`: A human-readable explanation
//! - `lastTransitionTime`: RFC3339 timestamp when the status last changed
//! - `observedGeneration`: the `metadata.generation` the condition was computed for
//!
//! # Example
//!
//! ```rust,no_run
//! use gateway_dns::reconcilers::status::create_condition;
//!
//! let condition = create_condition(
//!     "Ready",
//!     "True",
//!     "ProviderSuccess",
//!     "3 endpoint(s) published"
//! );
//! ```

use crate::crd::{Condition, DNSRecord, DNSRecordStatus, Endpoint};
use anyhow::Result;
use chrono::Utc;
use kube::api::Patch;
use kube::{api::PatchParams, Api, Client, ResourceExt};
use serde_json::json;
use tracing::debug;

/// Create a new Kubernetes condition with the current timestamp.
///
/// # Example
///
/// ```rust,no_run
/// # use gateway_dns::reconcilers::status::create_condition;
/// let condition = create_condition("Ready", "True", "ProviderSuccess", "published");
/// assert_eq!(condition.r#type, "Ready");
/// assert_eq!(condition.status, "True");
/// ```
#[must_use]
pub fn create_condition(
    condition_type: &str,
    status: &str,
    reason: &str,
    message: &str,
) -> Condition {
    Condition {
        r#type: condition_type.to_string(),
        status: status.to_string(),
        reason: Some(reason.to_string()),
        message: Some(message.to_string()),
        last_transition_time: Some(Utc::now().to_rfc3339()),
        observed_generation: None,
    }
}

/// Find a condition by type in a list of conditions.
#[must_use]
pub fn find_condition<'a>(
    conditions: &'a [Condition],
    condition_type: &str,
) -> Option<&'a Condition> {
    conditions.iter().find(|c| c.r#type == condition_type)
}

/// True when a condition of `condition_type` exists with status `True`.
#[must_use]
pub fn is_condition_true(conditions: &[Condition], condition_type: &str) -> bool {
    find_condition(conditions, condition_type).is_some_and(|c| c.status == "True")
}

/// Update or add a condition in a mutable conditions list (in-memory, no API call).
///
/// Preserves `lastTransitionTime` when the status is unchanged; sets a new timestamp
/// when it flips.
pub fn update_condition_in_memory(
    conditions: &mut Vec<Condition>,
    condition_type: &str,
    status: &str,
    reason: &str,
    message: &str,
    observed_generation: Option<i64>,
) {
    if let Some(existing) = conditions.iter_mut().find(|c| c.r#type == condition_type) {
        let last_transition_time = if existing.status == status {
            existing
                .last_transition_time
                .clone()
                .unwrap_or_else(|| Utc::now().to_rfc3339())
        } else {
            Utc::now().to_rfc3339()
        };

        existing.status = status.to_string();
        existing.reason = Some(reason.to_string());
        existing.message = Some(message.to_string());
        existing.last_transition_time = Some(last_transition_time);
        existing.observed_generation = observed_generation;
    } else {
        let mut condition = create_condition(condition_type, status, reason, message);
        condition.observed_generation = observed_generation;
        conditions.push(condition);
    }
}

/// Compare two condition lists, ignoring `lastTransitionTime`.
#[must_use]
pub fn conditions_equal(current: &[Condition], new: &[Condition]) -> bool {
    if current.len() != new.len() {
        return false;
    }

    new.iter().all(|new_cond| {
        current.iter().any(|curr_cond| {
            curr_cond.r#type == new_cond.r#type
                && curr_cond.status == new_cond.status
                && curr_cond.reason == new_cond.reason
                && curr_cond.message == new_cond.message
                && curr_cond.observed_generation == new_cond.observed_generation
        })
    })
}

/// Centralized status updater for `DNSRecord` resources.
///
/// Collects every status change of a reconciliation cycle in memory and applies them in
/// a single merge patch, so one cycle produces at most one "object updated" event.
///
/// # Example
///
/// ```rust,ignore
/// use gateway_dns::reconcilers::status::DNSRecordStatusUpdater;
///
/// async fn reconcile(client: Client, record: DNSRecord) -> Result<()> {
///     let mut status_updater = DNSRecordStatusUpdater::new(&record);
///
///     status_updater.set_condition("Ready", "True", "ProviderSuccess", "published");
///     status_updater.set_endpoints(published);
///     status_updater.set_observed_generation();
///
///     status_updater.apply(&client).await?;
///     Ok(())
/// }
/// ```
pub struct DNSRecordStatusUpdater {
    namespace: String,
    name: String,
    generation: Option<i64>,
    current_status: Option<DNSRecordStatus>,
    new_status: DNSRecordStatus,
}

impl DNSRecordStatusUpdater {
    #[must_use]
    pub fn new(record: &DNSRecord) -> Self {
        let current_status = record.status.clone();
        let new_status = current_status.clone().unwrap_or_default();

        Self {
            namespace: record.namespace().unwrap_or_default(),
            name: record.name_any(),
            generation: record.metadata.generation,
            current_status,
            new_status,
        }
    }

    /// Update or add a condition stamped with the record's generation (in-memory only).
    pub fn set_condition(
        &mut self,
        condition_type: &str,
        status: &str,
        reason: &str,
        message: &str,
    ) {
        update_condition_in_memory(
            &mut self.new_status.conditions,
            condition_type,
            status,
            reason,
            message,
            self.generation,
        );
    }

    /// Replace the published endpoints (in-memory only).
    pub fn set_endpoints(&mut self, endpoints: Vec<Endpoint>) {
        self.new_status.endpoints = endpoints;
    }

    /// Record the managed zone holding the published endpoints (in-memory only).
    pub fn set_published_zone(&mut self, zone: &str) {
        self.new_status.published_zone = Some(zone.to_string());
    }

    /// Mark the record's current generation as processed (in-memory only).
    pub fn set_observed_generation(&mut self) {
        self.new_status.observed_generation = self.generation;
    }

    /// True if the collected status differs semantically from the current one.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        match &self.current_status {
            None => true,
            Some(current) => {
                current.endpoints != self.new_status.endpoints
                    || current.observed_generation != self.new_status.observed_generation
                    || current.published_zone != self.new_status.published_zone
                    || !conditions_equal(&current.conditions, &self.new_status.conditions)
            }
        }
    }

    #[must_use]
    pub fn status(&self) -> &DNSRecordStatus {
        &self.new_status
    }

    /// Apply the collected status changes in one merge patch.
    ///
    /// Skips the API call when nothing changed semantically.
    ///
    /// # Errors
    ///
    /// Returns an error if the Kubernetes API call fails.
    pub async fn apply(&self, client: &Client) -> Result<()> {
        if !self.has_changes() {
            debug!(
                "DNSRecord {}/{} status unchanged, skipping update",
                self.namespace, self.name
            );
            return Ok(());
        }

        let api: Api<DNSRecord> = Api::namespaced(client.clone(), &self.namespace);

        // endpoints is always sent so a merge patch can clear it
        let patch = json!({
            "status": {
                "conditions": self.new_status.conditions,
                "observedGeneration": self.new_status.observed_generation,
                "endpoints": self.new_status.endpoints,
                "publishedZone": self.new_status.published_zone,
            }
        });

        api.patch_status(&self.name, &PatchParams::default(), &Patch::Merge(&patch))
            .await?;

        debug!(
            "Updated DNSRecord {}/{} status: {} condition(s), {} published endpoint(s)",
            self.namespace,
            self.name,
            self.new_status.conditions.len(),
            self.new_status.endpoints.len()
        );

        Ok(())
    }
}

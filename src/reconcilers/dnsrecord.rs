// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `DNSRecord` reconciliation.
//!
//! One cycle validates the record set, resolves its managed zone, plans the difference
//! between `spec.endpoints` and `status.endpoints`, applies the plan in a single
//! publisher call and folds the per-operation results back into `status.endpoints`.
//!
//! Operations that fail leave the published state exactly as the provider holds it, so
//! the next cycle plans only what is still pending.

pub mod plan;
pub mod publish;
pub mod validation;

use crate::constants::KIND_DNS_RECORD;
use crate::context::Context;
use crate::crd::{DNSRecord, DNSRecordStatus, Endpoint};
use crate::errors::ValidationError;
use crate::provider::{OperationResult, ResolvedZone};
use crate::reconcilers::should_reconcile;
use crate::reconcilers::status::{is_condition_true, DNSRecordStatusUpdater};
use crate::status_reasons::{
    CONDITION_STATUS_FALSE, CONDITION_STATUS_TRUE, CONDITION_TYPE_FAILED, CONDITION_TYPE_READY,
    REASON_DELETING, REASON_NO_FAILURES, REASON_PROVIDER_ERROR, REASON_PROVIDER_SUCCESS,
    REASON_VALIDATION_FAILED, REASON_ZONE_NOT_FOUND,
};
use anyhow::{anyhow, Result};
use kube::ResourceExt;
use plan::{plan_changes, Changes};
use publish::{publish_results, summarize_failures};
use std::sync::Arc;
use tracing::{debug, info, warn};
use validation::{validate_endpoints, validate_zone_ref};

/// What a reconciliation cycle did, used to pick the requeue interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Every planned operation was confirmed
    Published,
    /// Some operations failed and are retried on the next cycle
    PartiallyFailed,
    /// The record set was rejected before any provider call
    ValidationFailed,
    /// Generation already observed, ready, and nothing to publish
    Unchanged,
}

/// Result of applying one plan to a zone.
#[derive(Clone, Debug)]
pub struct CycleReport {
    pub changes: Changes,
    pub results: Vec<OperationResult>,
    pub published: Vec<Endpoint>,
}

impl CycleReport {
    #[must_use]
    pub fn failure_summary(&self) -> Option<String> {
        summarize_failures(&self.results)
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|result| !result.is_success()).count()
    }
}

/// Plan, apply and fold one cycle against a resolved zone.
///
/// An empty plan makes no publisher call.
pub async fn publish_cycle(
    resolved: &ResolvedZone,
    desired: &[Endpoint],
    published: &[Endpoint],
) -> CycleReport {
    let changes = plan_changes(desired, published);

    let results = if changes.is_empty() {
        Vec::new()
    } else {
        let operations = changes.operations();
        debug!(
            zone = %resolved.zone.name,
            creates = changes.create.len(),
            updates = changes.update.len(),
            deletes = changes.delete.len(),
            "Applying planned changes"
        );
        resolved.publisher.apply(&resolved.zone, &operations).await
    };

    for result in &results {
        crate::metrics::record_provider_operation(result.operation.kind(), result.is_success());
        if let Err(error) = &result.outcome {
            warn!(
                zone = %resolved.zone.name,
                operation = %result.operation,
                reason = error.status_reason(),
                "Provider operation failed: {error}"
            );
        }
    }

    let published = publish_results(published, desired, &changes, &results);

    CycleReport {
        changes,
        results,
        published,
    }
}

/// Record a completed cycle in the status updater and classify it.
pub fn record_cycle_status(
    updater: &mut DNSRecordStatusUpdater,
    report: &CycleReport,
) -> ReconcileOutcome {
    updater.set_endpoints(report.published.clone());
    updater.set_observed_generation();

    if let Some(summary) = report.failure_summary() {
        updater.set_condition(
            CONDITION_TYPE_READY,
            CONDITION_STATUS_FALSE,
            REASON_PROVIDER_ERROR,
            &format!(
                "{} of {} operation(s) failed",
                report.failed_count(),
                report.results.len()
            ),
        );
        updater.set_condition(
            CONDITION_TYPE_FAILED,
            CONDITION_STATUS_TRUE,
            REASON_PROVIDER_ERROR,
            &summary,
        );
        return ReconcileOutcome::PartiallyFailed;
    }

    updater.set_condition(
        CONDITION_TYPE_READY,
        CONDITION_STATUS_TRUE,
        REASON_PROVIDER_SUCCESS,
        &format!("{} endpoint(s) published", report.published.len()),
    );
    updater.set_condition(
        CONDITION_TYPE_FAILED,
        CONDITION_STATUS_FALSE,
        REASON_NO_FAILURES,
        "",
    );
    ReconcileOutcome::Published
}

/// Record a rejected record set: nothing is published and the generation is marked
/// processed, so the failure stands until the spec changes.
pub fn record_validation_failure(
    updater: &mut DNSRecordStatusUpdater,
    error: &ValidationError,
) -> ReconcileOutcome {
    let message = error.to_string();
    updater.set_condition(
        CONDITION_TYPE_READY,
        CONDITION_STATUS_FALSE,
        REASON_VALIDATION_FAILED,
        &message,
    );
    updater.set_condition(
        CONDITION_TYPE_FAILED,
        CONDITION_STATUS_TRUE,
        REASON_VALIDATION_FAILED,
        &message,
    );
    updater.set_observed_generation();
    ReconcileOutcome::ValidationFailed
}

/// Record a zone reference that resolves to no provider.
///
/// The generation is left unobserved: the cycle is retried once the zone is configured.
pub fn record_zone_not_found(updater: &mut DNSRecordStatusUpdater, message: &str) {
    updater.set_condition(
        CONDITION_TYPE_READY,
        CONDITION_STATUS_FALSE,
        REASON_ZONE_NOT_FOUND,
        message,
    );
    updater.set_condition(
        CONDITION_TYPE_FAILED,
        CONDITION_STATUS_TRUE,
        REASON_ZONE_NOT_FOUND,
        message,
    );
}

/// Zone still holding published endpoints after `spec.managedZone` moved to `zone_name`.
///
/// Statuses written before the zone was recorded are taken to be in the current zone.
#[must_use]
pub fn previous_zone<'a>(status: &'a DNSRecordStatus, zone_name: &str) -> Option<&'a str> {
    if status.endpoints.is_empty() {
        return None;
    }
    status
        .published_zone
        .as_deref()
        .filter(|published_zone| *published_zone != zone_name)
}

/// Reconcile a `DNSRecord`: publish `spec.endpoints` to its managed zone.
///
/// Validation failures are durable: they are reported and the cycle succeeds, waiting
/// for a spec change. An unresolvable zone is reported and returned as an error so the
/// controller backs off and retries. Endpoints left in a previous zone are deleted there
/// before anything is created in the new one.
///
/// # Errors
///
/// Returns an error if the managed zone (or the previous one) cannot be resolved or the
/// status patch fails.
pub async fn reconcile_dnsrecord(ctx: Arc<Context>, record: DNSRecord) -> Result<ReconcileOutcome> {
    let namespace = record.namespace().unwrap_or_default();
    let name = record.name_any();
    let mut updater = DNSRecordStatusUpdater::new(&record);

    let current_status = record.status.clone().unwrap_or_default();
    let mut published = current_status.endpoints.clone();

    let validated = validate_zone_ref(&record.spec)
        .and_then(|zone_ref| validate_endpoints(&record.spec.endpoints).map(|()| zone_ref));

    let zone_ref = match validated {
        Ok(zone_ref) => zone_ref,
        Err(error) => {
            warn!(namespace = %namespace, name = %name, "DNSRecord rejected: {error}");
            crate::metrics::record_error(KIND_DNS_RECORD, error.status_reason());
            let outcome = record_validation_failure(&mut updater, &error);
            updater.apply(&ctx.client).await?;
            return Ok(outcome);
        }
    };

    let resolved = match ctx.providers.resolve(&namespace, &zone_ref.name) {
        Ok(resolved) => resolved,
        Err(error) => {
            warn!(namespace = %namespace, name = %name, "DNSRecord zone unresolved: {error}");
            crate::metrics::record_error(KIND_DNS_RECORD, error.status_reason());
            record_zone_not_found(&mut updater, &error.to_string());
            updater.apply(&ctx.client).await?;
            return Err(anyhow!(error));
        }
    };

    if let Some(old_zone) = previous_zone(&current_status, &zone_ref.name) {
        let old_resolved = match ctx.providers.resolve(&namespace, old_zone) {
            Ok(old_resolved) => old_resolved,
            Err(error) => {
                crate::metrics::record_error(KIND_DNS_RECORD, error.status_reason());
                record_zone_not_found(
                    &mut updater,
                    &format!("cannot remove endpoints published to previous zone: {error}"),
                );
                updater.apply(&ctx.client).await?;
                return Err(anyhow!(error));
            }
        };

        info!(
            namespace = %namespace,
            name = %name,
            from = %old_zone,
            to = %zone_ref.name,
            "Managed zone changed, removing endpoints from previous zone"
        );
        let teardown = publish_cycle(&old_resolved, &[], &published).await;
        if teardown.failure_summary().is_some() {
            let outcome = record_cycle_status(&mut updater, &teardown);
            updater.apply(&ctx.client).await?;
            return Ok(outcome);
        }
        published = teardown.published;
    } else {
        let generation_observed =
            !should_reconcile(record.metadata.generation, current_status.observed_generation);
        if generation_observed
            && is_condition_true(&current_status.conditions, CONDITION_TYPE_READY)
            && plan_changes(&record.spec.endpoints, &published).is_empty()
        {
            debug!(namespace = %namespace, name = %name, "DNSRecord up to date, skipping publish");
            return Ok(ReconcileOutcome::Unchanged);
        }
    }

    let report = publish_cycle(&resolved, &record.spec.endpoints, &published).await;
    let outcome = record_cycle_status(&mut updater, &report);
    updater.set_published_zone(&resolved.zone.name);
    updater.apply(&ctx.client).await?;

    info!(
        namespace = %namespace,
        name = %name,
        zone = %resolved.zone.name,
        operations = report.results.len(),
        failed = report.failed_count(),
        published = report.published.len(),
        "Reconciled DNSRecord"
    );

    Ok(outcome)
}

/// Delete every published endpoint of a `DNSRecord` being removed.
///
/// Endpoints are deleted from the zone recorded in status, falling back to
/// `spec.managedZone`. Succeeds immediately when nothing is published. Otherwise the
/// finalizer is kept (by returning an error) until every delete is confirmed.
///
/// # Errors
///
/// Returns an error if the zone cannot be resolved, any delete fails, or the status
/// patch fails.
pub async fn delete_dnsrecord(ctx: Arc<Context>, record: DNSRecord) -> Result<()> {
    let namespace = record.namespace().unwrap_or_default();
    let name = record.name_any();
    let current_status = record.status.clone().unwrap_or_default();
    let published = current_status.endpoints;

    if published.is_empty() {
        info!(namespace = %namespace, name = %name, "DNSRecord has no published endpoints, nothing to delete");
        return Ok(());
    }

    let mut updater = DNSRecordStatusUpdater::new(&record);

    let zone_name = match current_status.published_zone {
        Some(zone_name) => Ok(zone_name),
        None => validate_zone_ref(&record.spec)
            .map(|zone_ref| zone_ref.name.clone())
            .map_err(|error| anyhow!(error)),
    };
    let resolved = match zone_name.and_then(|zone_name| {
        ctx.providers
            .resolve(&namespace, &zone_name)
            .map_err(|error| anyhow!(error))
    }) {
        Ok(resolved) => resolved,
        Err(error) => {
            crate::metrics::record_error(KIND_DNS_RECORD, REASON_ZONE_NOT_FOUND);
            record_zone_not_found(
                &mut updater,
                &format!("cannot delete published endpoints: {error}"),
            );
            updater.apply(&ctx.client).await?;
            return Err(error.context(format!(
                "DNSRecord {namespace}/{name} cannot be torn down"
            )));
        }
    };

    let report = publish_cycle(&resolved, &[], &published).await;
    updater.set_endpoints(report.published.clone());

    if let Some(summary) = report.failure_summary() {
        updater.set_condition(
            CONDITION_TYPE_READY,
            CONDITION_STATUS_FALSE,
            REASON_DELETING,
            &format!("{} endpoint(s) still published", report.published.len()),
        );
        updater.set_condition(
            CONDITION_TYPE_FAILED,
            CONDITION_STATUS_TRUE,
            REASON_PROVIDER_ERROR,
            &summary,
        );
        updater.apply(&ctx.client).await?;
        return Err(anyhow!(
            "DNSRecord {namespace}/{name} teardown incomplete: {summary}"
        ));
    }

    updater.set_condition(
        CONDITION_TYPE_READY,
        CONDITION_STATUS_FALSE,
        REASON_DELETING,
        "all published endpoints deleted",
    );
    updater.apply(&ctx.client).await?;

    info!(
        namespace = %namespace,
        name = %name,
        zone = %resolved.zone.name,
        deleted = report.results.len(),
        "Deleted DNSRecord endpoints"
    );
    Ok(())
}

#[cfg(test)]
#[path = "dnsrecord_tests.rs"]
mod dnsrecord_tests;

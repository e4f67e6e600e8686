// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `DNSRecord` controller.
//!
//! Wires [`reconcile_dnsrecord`] and [`delete_dnsrecord`] into a
//! `kube::runtime::Controller`, guarding deletion with a finalizer so published
//! endpoints are removed from the provider before the resource disappears.

use crate::constants::{
    ERROR_REQUEUE_DURATION_SECS, KIND_DNS_RECORD, PARTIAL_FAILURE_REQUEUE_SECS,
    READY_REQUEUE_DURATION_SECS,
};
use crate::context::Context;
use crate::crd::DNSRecord;
use crate::errors::ReconcileError;
use crate::labels::FINALIZER_DNS_RECORD;
use crate::reconcilers::{delete_dnsrecord, reconcile_dnsrecord, ReconcileOutcome};
use anyhow::{anyhow, Result};
use futures::StreamExt;
use kube::api::Api;
use kube::runtime::controller::Action;
use kube::runtime::finalizer;
use kube::runtime::watcher::Config as WatcherConfig;
use kube::runtime::Controller;
use kube::ResourceExt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// Error policy for the record controller.
///
/// Returns an action to requeue the resource after a delay when reconciliation fails.
#[allow(clippy::needless_pass_by_value)] // Signature required by kube::runtime::Controller
fn error_policy(record: Arc<DNSRecord>, err: &ReconcileError, _ctx: Arc<Context>) -> Action {
    error!(
        error = %err,
        namespace = ?record.namespace(),
        name = %record.name_any(),
        "Reconciliation error - will retry in {}s",
        ERROR_REQUEUE_DURATION_SECS
    );
    Action::requeue(Duration::from_secs(ERROR_REQUEUE_DURATION_SECS))
}

/// Requeue policy for a completed cycle.
///
/// Validation failures wait for a spec change; partial failures retry soon; healthy
/// record sets are re-checked periodically.
#[must_use]
pub fn requeue_for_outcome(outcome: ReconcileOutcome) -> Action {
    match outcome {
        ReconcileOutcome::Published | ReconcileOutcome::Unchanged => {
            Action::requeue(Duration::from_secs(READY_REQUEUE_DURATION_SECS))
        }
        ReconcileOutcome::PartiallyFailed => {
            crate::metrics::record_reconciliation_requeue(KIND_DNS_RECORD, "partial_failure");
            Action::requeue(Duration::from_secs(PARTIAL_FAILURE_REQUEUE_SECS))
        }
        ReconcileOutcome::ValidationFailed => Action::await_change(),
    }
}

/// Run the `DNSRecord` controller until its watch stream ends.
///
/// # Errors
///
/// Returns an error if the controller fails to start.
pub async fn run_record_controller(context: Arc<Context>) -> Result<()> {
    info!("Starting {} controller", KIND_DNS_RECORD);

    let api = Api::<DNSRecord>::all(context.client.clone());

    Controller::new(api, WatcherConfig::default().any_semantic())
        .shutdown_on_signal()
        .run(reconcile_wrapper, error_policy, context)
        .for_each(|result| {
            if let Err(e) = result {
                debug!("Controller event error: {e}");
            }
            futures::future::ready(())
        })
        .await;

    Ok(())
}

/// Reconciliation wrapper with finalizer support and metrics.
async fn reconcile_wrapper(
    record: Arc<DNSRecord>,
    context: Arc<Context>,
) -> Result<Action, ReconcileError> {
    let start = std::time::Instant::now();
    let namespace = record
        .namespace()
        .ok_or_else(|| ReconcileError::from(anyhow!("{KIND_DNS_RECORD} has no namespace")))?;
    let api: Api<DNSRecord> = Api::namespaced(context.client.clone(), &namespace);

    let result = finalizer(&api, FINALIZER_DNS_RECORD, record, |event| async {
        match event {
            finalizer::Event::Apply(rec) => {
                let outcome = reconcile_dnsrecord(context.clone(), (*rec).clone())
                    .await
                    .map_err(ReconcileError::from)?;

                debug!(
                    namespace = %namespace,
                    name = %rec.name_any(),
                    outcome = ?outcome,
                    "Reconcile cycle finished"
                );
                Ok(requeue_for_outcome(outcome))
            }
            finalizer::Event::Cleanup(rec) => {
                delete_dnsrecord(context.clone(), (*rec).clone())
                    .await
                    .map_err(ReconcileError::from)?;

                info!(
                    "Successfully removed published endpoints of {}: {}/{}",
                    KIND_DNS_RECORD,
                    namespace,
                    rec.name_any()
                );
                crate::metrics::record_record_set_deleted();
                Ok(Action::await_change())
            }
        }
    })
    .await;

    let duration = start.elapsed();
    if result.is_ok() {
        crate::metrics::record_reconciliation_success(KIND_DNS_RECORD, duration);
    } else {
        crate::metrics::record_reconciliation_error(KIND_DNS_RECORD, duration);
        crate::metrics::record_error(KIND_DNS_RECORD, "reconcile_error");
    }

    result.map_err(|e: finalizer::Error<ReconcileError>| match e {
        finalizer::Error::ApplyFailed(err) | finalizer::Error::CleanupFailed(err) => err,
        finalizer::Error::AddFinalizer(err) | finalizer::Error::RemoveFinalizer(err) => {
            ReconcileError::from(anyhow!("Finalizer error: {err}"))
        }
        finalizer::Error::UnnamedObject => {
            ReconcileError::from(anyhow!("{KIND_DNS_RECORD} has no name"))
        }
        finalizer::Error::InvalidFinalizer => {
            ReconcileError::from(anyhow!("Invalid finalizer for {KIND_DNS_RECORD}"))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::requeue_for_outcome;
    use crate::reconcilers::ReconcileOutcome;
    use kube::runtime::controller::Action;
    use std::time::Duration;

    #[test]
    fn test_requeue_for_outcome() {
        assert_eq!(
            requeue_for_outcome(ReconcileOutcome::Published),
            Action::requeue(Duration::from_secs(300))
        );
        assert_eq!(
            requeue_for_outcome(ReconcileOutcome::PartiallyFailed),
            Action::requeue(Duration::from_secs(15))
        );
        assert_eq!(
            requeue_for_outcome(ReconcileOutcome::ValidationFailed),
            Action::await_change()
        );
    }
}

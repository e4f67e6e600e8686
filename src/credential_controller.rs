// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Credential watch and gateway re-evaluation delivery.
//!
//! Two tasks cooperate:
//!
//! - [`run_credential_controller`] watches labelled `Secret`s and hands every event to the
//!   [`DependencyRouter`], which queues the dependent gateways.
//! - [`run_gateway_dispatcher`] drains the queue, deduplicates requests over a batching
//!   window and delivers each distinct gateway once by stamping the
//!   `gatewaydns.io/credentials-changed-at` annotation, which the gateway controller
//!   observes as a change. Failed deliveries are carried into later batches with a
//!   growing delay, up to [`GATEWAY_DISPATCH_MAX_ATTEMPTS`] attempts.

use crate::constants::{GATEWAY_DISPATCH_MAX_ATTEMPTS, GATEWAY_DISPATCH_MAX_BACKOFF_SECS};
use crate::context::Context;
use crate::gateway::Gateway;
use crate::labels::GATEWAY_REEVALUATE_ANNOTATION;
use crate::router::{ApiGatewayLister, DependencyRouter, GatewayRequestQueue};
use anyhow::Result;
use chrono::Utc;
use futures::StreamExt;
use k8s_openapi::api::core::v1::Secret;
use kube::api::{Patch, PatchParams};
use kube::runtime::reflector::ObjectRef;
use kube::runtime::{watcher, WatchStreamExt};
use kube::{Api, Client};
use serde_json::json;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, error, info, warn};

/// Namespaced name of a gateway awaiting re-evaluation.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct GatewayKey {
    pub namespace: String,
    pub name: String,
}

impl From<&ObjectRef<Gateway>> for GatewayKey {
    fn from(reference: &ObjectRef<Gateway>) -> Self {
        Self {
            namespace: reference.namespace.clone().unwrap_or_default(),
            name: reference.name.clone(),
        }
    }
}

/// Watch credential secrets and route every event to the dependent gateways.
///
/// Applied, deleted and initially listed secrets are handled alike. Routing failures
/// are logged and counted; the next event for the secret retries.
///
/// # Errors
///
/// Returns an error if the watch cannot be established.
pub async fn run_credential_controller(
    context: Arc<Context>,
    queue: GatewayRequestQueue,
) -> Result<()> {
    let selector = context.config.credential_selector.clone();
    info!(selector = %selector.as_label_selector(), "Starting credential controller");

    let api = Api::<Secret>::all(context.client.clone());
    let watcher_config = watcher::Config::default().labels(&selector.as_label_selector());
    let router = DependencyRouter::new(ApiGatewayLister::new(context.client.clone()), queue, selector);

    let mut events = watcher(api, watcher_config).default_backoff().boxed();

    while let Some(event) = events.next().await {
        let secret = match event {
            Ok(watcher::Event::Apply(secret) | watcher::Event::Delete(secret) | watcher::Event::InitApply(secret)) => secret,
            Ok(watcher::Event::Init | watcher::Event::InitDone) => continue,
            Err(e) => {
                warn!("Credential watch error: {e}");
                continue;
            }
        };

        // Errors are logged and counted by the router
        let _ = router.enqueue_for_object(&secret).await;
    }

    Ok(())
}

/// Collect one batch of requests on top of the `retained` keys of earlier failed deliveries.
///
/// With nothing retained, waits for the first request; then gathers for `window`.
/// Returns `None` once the queue is closed and drained and nothing is retained.
pub async fn collect_batch(
    requests: &mut UnboundedReceiver<ObjectRef<Gateway>>,
    window: Duration,
    retained: BTreeSet<GatewayKey>,
) -> Option<BTreeSet<GatewayKey>> {
    let mut batch = retained;
    if batch.is_empty() {
        let first = requests.recv().await?;
        batch.insert(GatewayKey::from(&first));
    }

    let deadline = tokio::time::sleep(window);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            () = &mut deadline => break,
            next = requests.recv() => match next {
                Some(request) => {
                    batch.insert(GatewayKey::from(&request));
                }
                None => break,
            },
        }
    }

    Some(batch)
}

/// Gateways whose delivery failed, with the attempts made so far.
#[derive(Debug, Default)]
pub struct PendingDeliveries {
    attempts: BTreeMap<GatewayKey, u32>,
}

impl PendingDeliveries {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }

    /// Keys to carry into the next batch.
    #[must_use]
    pub fn keys(&self) -> BTreeSet<GatewayKey> {
        self.attempts.keys().cloned().collect()
    }

    pub fn record_success(&mut self, key: &GatewayKey) {
        self.attempts.remove(key);
    }

    /// Count a failed attempt. Returns `false` once the key has used every attempt and
    /// has been dropped.
    pub fn record_failure(&mut self, key: &GatewayKey) -> bool {
        let attempts = self.attempts.entry(key.clone()).or_insert(0);
        *attempts += 1;
        if *attempts >= GATEWAY_DISPATCH_MAX_ATTEMPTS {
            self.attempts.remove(key);
            return false;
        }
        true
    }

    /// Gathering window of the next batch: `window` doubled per attempt of the most
    /// retried key, capped at [`GATEWAY_DISPATCH_MAX_BACKOFF_SECS`].
    #[must_use]
    pub fn backoff(&self, window: Duration) -> Duration {
        let attempts = self.attempts.values().copied().max().unwrap_or(0);
        let cap = Duration::from_secs(GATEWAY_DISPATCH_MAX_BACKOFF_SECS);
        window
            .checked_mul(2u32.saturating_pow(attempts))
            .map_or(cap, |delay| delay.min(cap))
    }
}

/// Stamp the re-evaluation annotation on one gateway.
///
/// A gateway deleted in the meantime is skipped.
async fn deliver(client: &Client, key: &GatewayKey, stamp: &str) -> Result<(), kube::Error> {
    let api: Api<Gateway> = Api::namespaced(client.clone(), &key.namespace);
    let patch = json!({
        "metadata": {
            "annotations": {
                GATEWAY_REEVALUATE_ANNOTATION: stamp
            }
        }
    });

    match api.patch(&key.name, &PatchParams::default(), &Patch::Merge(&patch)).await {
        Ok(_) => Ok(()),
        Err(kube::Error::Api(api_err)) if api_err.code == 404 => {
            debug!(namespace = %key.namespace, gateway = %key.name, "Gateway gone, skipping re-evaluation");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Deliver queued gateway re-evaluation requests until the queue closes.
///
/// # Errors
///
/// Never fails today; the `Result` keeps the signature aligned with the other
/// long-running tasks.
pub async fn run_gateway_dispatcher(
    client: Client,
    mut requests: UnboundedReceiver<ObjectRef<Gateway>>,
    window: Duration,
) -> Result<()> {
    info!(window_ms = window.as_millis(), "Starting gateway dispatcher");

    let mut pending = PendingDeliveries::default();

    loop {
        let batch_window = if pending.is_empty() {
            window
        } else {
            pending.backoff(window)
        };
        let Some(batch) = collect_batch(&mut requests, batch_window, pending.keys()).await else {
            break;
        };
        let stamp = Utc::now().to_rfc3339();

        for key in &batch {
            match deliver(&client, key, &stamp).await {
                Ok(()) => {
                    pending.record_success(key);
                    crate::metrics::record_gateway_dispatch(true);
                    debug!(namespace = %key.namespace, gateway = %key.name, "Gateway re-evaluation requested");
                }
                Err(e) => {
                    crate::metrics::record_gateway_dispatch(false);
                    if pending.record_failure(key) {
                        warn!(
                            namespace = %key.namespace,
                            gateway = %key.name,
                            "Failed to request gateway re-evaluation, will retry: {e}"
                        );
                    } else {
                        error!(
                            namespace = %key.namespace,
                            gateway = %key.name,
                            attempts = GATEWAY_DISPATCH_MAX_ATTEMPTS,
                            "Giving up gateway re-evaluation request: {e}"
                        );
                    }
                }
            }
        }

        info!(gateways = batch.len(), "Dispatched gateway re-evaluation batch");
    }

    Ok(())
}

#[cfg(test)]
#[path = "credential_controller_tests.rs"]
mod credential_controller_tests;

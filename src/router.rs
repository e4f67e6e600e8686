// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Dependency routing from changed credentials to the gateways that consume them.
//!
//! A credential is a labelled `Secret`. When one changes (created, updated, deleted, or
//! seen during the initial listing; the event kind does not matter), every `Gateway` in
//! the same namespace with a TLS listener referencing it gets exactly one re-evaluation
//! request.
//!
//! # Example
//!
//! ```rust,no_run
//! use gateway_dns::config::CredentialSelector;
//! use gateway_dns::router::{ApiGatewayLister, DependencyRouter, GatewayRequestQueue};
//! use k8s_openapi::api::core::v1::Secret;
//! use kube::Client;
//!
//! # async fn example(client: Client, secret: Secret) -> anyhow::Result<()> {
//! let (queue, _requests) = GatewayRequestQueue::new();
//! let router = DependencyRouter::new(
//!     ApiGatewayLister::new(client),
//!     queue,
//!     CredentialSelector::default(),
//! );
//!
//! let enqueued = router.enqueue_for_object(&secret).await?;
//! println!("{enqueued} gateway(s) queued for re-evaluation");
//! # Ok(())
//! # }
//! ```

use crate::config::CredentialSelector;
use crate::errors::DependencyListError;
use crate::gateway::{Gateway, Listener};
use crate::constants::KUBE_LIST_PAGE_SIZE;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::api::ListParams;
use kube::runtime::reflector::ObjectRef;
use kube::{Api, Client, ResourceExt};
use std::collections::HashSet;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Lists the gateways of a namespace.
#[async_trait]
pub trait GatewayLister: Send + Sync {
    /// # Errors
    ///
    /// Returns [`DependencyListError::ListFailed`] when the gateways cannot be listed.
    async fn list_gateways(&self, namespace: &str) -> Result<Vec<Gateway>, DependencyListError>;
}

/// Accepts gateway re-evaluation requests.
pub trait RequestQueue: Send + Sync {
    fn add(&self, request: ObjectRef<Gateway>);
}

/// Lists gateways from the Kubernetes API, page by page.
#[derive(Clone)]
pub struct ApiGatewayLister {
    client: Client,
}

impl ApiGatewayLister {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

/// List parameters for one page of gateways, continuing after `continue_token`.
#[must_use]
pub fn gateway_page_params(continue_token: Option<String>) -> ListParams {
    ListParams {
        limit: Some(KUBE_LIST_PAGE_SIZE),
        continue_token,
        ..ListParams::default()
    }
}

#[async_trait]
impl GatewayLister for ApiGatewayLister {
    async fn list_gateways(&self, namespace: &str) -> Result<Vec<Gateway>, DependencyListError> {
        let api: Api<Gateway> = Api::namespaced(self.client.clone(), namespace);

        let mut gateways = Vec::new();
        let mut continue_token = None;
        let mut pages = 0_u32;

        // A failed page fails the whole listing; a partial candidate set is never routed
        loop {
            pages += 1;
            let page = api
                .list(&gateway_page_params(continue_token))
                .await
                .map_err(|e| DependencyListError::ListFailed {
                    namespace: namespace.to_string(),
                    reason: e.to_string(),
                })?;
            gateways.extend(page.items);

            continue_token = page.metadata.continue_.filter(|token| !token.is_empty());
            if continue_token.is_none() {
                break;
            }
        }

        debug!(
            namespace = %namespace,
            pages,
            gateways = gateways.len(),
            "Listed candidate gateways"
        );
        Ok(gateways)
    }
}

/// A fixed set of gateways, filtered by namespace on listing.
#[async_trait]
impl GatewayLister for Vec<Gateway> {
    async fn list_gateways(&self, namespace: &str) -> Result<Vec<Gateway>, DependencyListError> {
        Ok(self
            .iter()
            .filter(|gateway| gateway.namespace().as_deref() == Some(namespace))
            .cloned()
            .collect())
    }
}

/// Re-evaluation requests delivered over an unbounded channel.
///
/// The receiving half is drained by the gateway dispatcher.
#[derive(Clone)]
pub struct GatewayRequestQueue {
    sender: mpsc::UnboundedSender<ObjectRef<Gateway>>,
}

impl GatewayRequestQueue {
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ObjectRef<Gateway>>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl RequestQueue for GatewayRequestQueue {
    fn add(&self, request: ObjectRef<Gateway>) {
        if let Err(e) = self.sender.send(request) {
            warn!(gateway = %e.0, "Gateway dispatcher stopped, dropping re-evaluation request");
        }
    }
}

/// True when `secret` carries the credential label.
#[must_use]
pub fn is_credential(secret: &Secret, selector: &CredentialSelector) -> bool {
    secret
        .labels()
        .get(&selector.key)
        .is_some_and(|value| *value == selector.value)
}

/// True when `listener` terminates TLS with the credential `name` in `namespace`.
///
/// A certificate reference without a namespace points into `gateway_namespace`.
#[must_use]
pub fn listener_references_credential(
    listener: &Listener,
    gateway_namespace: &str,
    name: &str,
    namespace: &str,
) -> bool {
    listener.certificate_refs().iter().any(|reference| {
        reference.is_secret()
            && reference.name == name
            && reference.namespace_or(gateway_namespace) == namespace
    })
}

/// Gateways in `credential_namespace` with a listener referencing the credential.
///
/// Deduplicated, in list order. Gateways in other namespaces never match.
#[must_use]
pub fn dependent_gateways(
    credential_name: &str,
    credential_namespace: &str,
    gateways: &[Gateway],
) -> Vec<ObjectRef<Gateway>> {
    let mut seen = HashSet::new();

    gateways
        .iter()
        .filter(|gateway| gateway.namespace().as_deref() == Some(credential_namespace))
        .filter(|gateway| {
            gateway.spec.listeners.iter().any(|listener| {
                listener_references_credential(
                    listener,
                    credential_namespace,
                    credential_name,
                    credential_namespace,
                )
            })
        })
        .map(ObjectRef::from_obj)
        .filter(|reference| seen.insert(reference.clone()))
        .collect()
}

/// Maps a changed credential to re-evaluation requests for its dependent gateways.
pub struct DependencyRouter<L, Q> {
    lister: L,
    queue: Q,
    selector: CredentialSelector,
}

impl<L: GatewayLister, Q: RequestQueue> DependencyRouter<L, Q> {
    pub fn new(lister: L, queue: Q, selector: CredentialSelector) -> Self {
        Self {
            lister,
            queue,
            selector,
        }
    }

    #[must_use]
    pub fn selector(&self) -> &CredentialSelector {
        &self.selector
    }

    /// Enqueue one request per gateway depending on `secret`; returns how many.
    ///
    /// Secrets without the credential label, or without a namespace, enqueue nothing.
    ///
    /// # Errors
    ///
    /// Returns [`DependencyListError`] when the gateways cannot be listed; nothing is
    /// enqueued in that case.
    pub async fn enqueue_for_object(&self, secret: &Secret) -> Result<usize, DependencyListError> {
        if !is_credential(secret, &self.selector) {
            return Ok(0);
        }

        let name = secret.name_any();
        let Some(namespace) = secret.namespace() else {
            debug!(secret = %name, "Credential has no namespace, skipping");
            return Ok(0);
        };

        let gateways = match self.lister.list_gateways(&namespace).await {
            Ok(gateways) => gateways,
            Err(e) => {
                error!(
                    namespace = %namespace,
                    secret = %name,
                    "Failed to list gateways for credential: {e}"
                );
                crate::metrics::record_router_list_error();
                return Err(e);
            }
        };

        let dependents = dependent_gateways(&name, &namespace, &gateways);
        for gateway in &dependents {
            debug!(namespace = %namespace, secret = %name, gateway = %gateway, "Queueing gateway re-evaluation");
            self.queue.add(gateway.clone());
        }

        if !dependents.is_empty() {
            info!(
                namespace = %namespace,
                secret = %name,
                gateways = dependents.len(),
                "Credential changed, gateways queued for re-evaluation"
            );
        }
        crate::metrics::record_router_enqueues(dependents.len());

        Ok(dependents.len())
    }
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod router_tests;

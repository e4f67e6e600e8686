// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Read-only model of Gateway API `Gateway` resources.
//!
//! Only the fields needed to find TLS listeners and the credentials they reference are
//! modelled. Unknown fields are ignored on deserialization, so the full upstream resource
//! decodes into this type. The CRD itself is owned by the Gateway API installation and is
//! never generated from here.

use crate::constants::{
    CORE_API_GROUP, KIND_SECRET, PROTOCOL_HTTPS, PROTOCOL_TLS, TLS_MODE_PASSTHROUGH,
};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Partial `gateway.networking.k8s.io/v1` Gateway spec.
#[derive(CustomResource, Clone, Debug, Default, Serialize, Deserialize, PartialEq, JsonSchema)]
#[kube(
    group = "gateway.networking.k8s.io",
    version = "v1",
    kind = "Gateway",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct GatewaySpec {
    #[serde(default)]
    pub gateway_class_name: String,

    #[serde(default)]
    pub listeners: Vec<Listener>,
}

/// A logical endpoint on which the gateway accepts connections.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Listener {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,

    #[serde(default)]
    pub port: i32,

    /// `HTTP`, `HTTPS`, `TLS`, `TCP` or `UDP`
    pub protocol: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<GatewayTlsConfig>,
}

/// TLS configuration of a listener.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GatewayTlsConfig {
    /// `Terminate` (default) or `Passthrough`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,

    #[serde(default)]
    pub certificate_refs: Vec<SecretObjectReference>,
}

/// Reference to a certificate-holding object, by default a `Secret` in the gateway namespace.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct SecretObjectReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl Listener {
    /// True when the listener terminates TLS and therefore consumes certificate references.
    ///
    /// `HTTPS` listeners always do; `TLS` listeners only outside `Passthrough` mode. A
    /// listener without a `tls` block never does.
    #[must_use]
    pub fn tls_enabled(&self) -> bool {
        let Some(tls) = self.tls.as_ref() else {
            return false;
        };

        if self.protocol == PROTOCOL_HTTPS {
            return true;
        }

        self.protocol == PROTOCOL_TLS && tls.mode.as_deref() != Some(TLS_MODE_PASSTHROUGH)
    }

    /// Certificate references of the listener, empty unless TLS is enabled.
    #[must_use]
    pub fn certificate_refs(&self) -> &[SecretObjectReference] {
        match self.tls.as_ref() {
            Some(tls) if self.tls_enabled() => &tls.certificate_refs,
            _ => &[],
        }
    }
}

impl SecretObjectReference {
    /// True when the reference points at a core `Secret`, applying the API defaults.
    #[must_use]
    pub fn is_secret(&self) -> bool {
        self.group.as_deref().unwrap_or(CORE_API_GROUP) == CORE_API_GROUP
            && self.kind.as_deref().unwrap_or(KIND_SECRET) == KIND_SECRET
    }

    /// Namespace of the referenced object, defaulting to the referencing gateway's namespace.
    #[must_use]
    pub fn namespace_or<'a>(&'a self, gateway_namespace: &'a str) -> &'a str {
        self.namespace.as_deref().unwrap_or(gateway_namespace)
    }
}

#[cfg(test)]
#[path = "gateway_tests.rs"]
mod gateway_tests;

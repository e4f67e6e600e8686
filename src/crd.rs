// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Custom Resource Definitions (CRDs) for DNS record management.
//!
//! This module defines the `DNSRecord` custom resource and the value types it is built
//! from. A `DNSRecord` is the record set of one managed provider zone: the endpoints the
//! declaring controller wants published (`spec.endpoints`) and the endpoints the provider
//! was last confirmed to hold (`status.endpoints`).
//!
//! # Resource Types
//!
//! - [`DNSRecord`] - Desired and published endpoints for one managed zone
//!
//! # Value Types
//!
//! - [`Endpoint`] - One DNS record (name, type, targets, TTL, set identifier, metadata)
//! - [`RecordType`] - Closed set of record types with an escape hatch for extensions
//! - [`ProviderSpecific`] - Ordered provider-specific key/value overrides
//!
//! # Example: Declaring a record set
//!
//! ```rust,no_run
//! use gateway_dns::crd::{DNSRecordSpec, Endpoint, ManagedZoneReference, RecordType};
//!
//! let spec = DNSRecordSpec {
//!     managed_zone: Some(ManagedZoneReference {
//!         name: "example-com".to_string(),
//!     }),
//!     endpoints: vec![
//!         Endpoint::new("api.example.com", RecordType::A, vec!["192.0.2.10".to_string()])
//!             .with_ttl(60),
//!     ],
//! };
//! ```

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Condition represents an observation of a resource's current state.
///
/// Conditions are used in status subresources to communicate the state of
/// a resource to users and controllers.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition. `DNSRecord` uses `Ready` and `Failed`.
    pub r#type: String,

    /// Status of the condition: True, False, or Unknown.
    pub status: String,

    /// Brief CamelCase reason for the condition's last transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Human-readable message indicating details about the transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Last time the condition transitioned from one status to another (RFC3339 format).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,

    /// The `metadata.generation` the condition was set for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}

/// DNS resource record type.
///
/// Known types are closed variants; anything else a provider understands is carried in
/// [`RecordType::Other`] and validated before it reaches a provider.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RecordType {
    /// RFC 1035 IPv4 address record
    A,
    /// RFC 3596 IPv6 address record
    AAAA,
    /// RFC 1035 canonical name record
    CNAME,
    /// Name server record
    NS,
    /// Text record
    TXT,
    /// Service locator record
    SRV,
    /// Mail exchange record
    MX,
    /// Pointer record
    PTR,
    /// Certification authority authorization record
    CAA,
    /// Provider-specific extension type, kept verbatim
    Other(String),
}

impl RecordType {
    /// Canonical (upper case) string form of the record type.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::A => "A",
            Self::AAAA => "AAAA",
            Self::CNAME => "CNAME",
            Self::NS => "NS",
            Self::TXT => "TXT",
            Self::SRV => "SRV",
            Self::MX => "MX",
            Self::PTR => "PTR",
            Self::CAA => "CAA",
            Self::Other(value) => value,
        }
    }

    /// Returns true for an extension type that is not a plausible record type mnemonic.
    ///
    /// An extension spelling a known type (e.g. `Other("txt")`) is invalid too: it would
    /// come back from the API server as the closed variant and never match its published copy.
    #[must_use]
    pub fn is_invalid_extension(&self) -> bool {
        match self {
            Self::Other(value) => {
                value.is_empty()
                    || !value.chars().all(|c| c.is_ascii_alphanumeric())
                    || !matches!(Self::from(value.as_str()), Self::Other(_))
            }
            _ => false,
        }
    }
}

impl From<String> for RecordType {
    fn from(value: String) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "A" => Self::A,
            "AAAA" => Self::AAAA,
            "CNAME" => Self::CNAME,
            "NS" => Self::NS,
            "TXT" => Self::TXT,
            "SRV" => Self::SRV,
            "MX" => Self::MX,
            "PTR" => Self::PTR,
            "CAA" => Self::CAA,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for RecordType {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<RecordType> for String {
    fn from(value: RecordType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name and value of a configuration which is specific to individual DNS providers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ProviderSpecificProperty {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value: String,
}

/// Provider-specific configuration of an endpoint.
///
/// Behaves as a map with insertion order preserved: at most one property per name,
/// setting an existing name updates it in place, setting a new name appends it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ProviderSpecific(pub Vec<ProviderSpecificProperty>);

/// A single DNS record as published to a provider zone.
///
/// # Example
///
/// ```yaml
/// dnsName: api.example.com
/// recordType: A
/// targets:
///   - 192.0.2.10
/// recordTTL: 60
/// setIdentifier: eu-west
/// providerSpecific:
///   - name: aws/weight
///     value: "100"
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    /// The hostname of the DNS record
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub dns_name: String,

    /// The targets the DNS record points to. Order is significant for equality.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<String>,

    /// Record type, e.g. A, CNAME, NS
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    pub record_type: Option<RecordType>,

    /// Identifier distinguishing multiple records with the same name and type
    /// (weighted or latency based routing policies)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub set_identifier: String,

    /// TTL in seconds; zero means provider default
    #[serde(default, rename = "recordTTL", skip_serializing_if = "is_default_ttl")]
    pub record_ttl: i64,

    /// Metadata carried with the endpoint, never sent to providers
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    /// Provider specific configuration
    #[serde(default, skip_serializing_if = "ProviderSpecific::is_empty")]
    pub provider_specific: ProviderSpecific,
}

#[allow(clippy::trivially_copy_pass_by_ref)] // Signature required by serde skip_serializing_if
fn is_default_ttl(ttl: &i64) -> bool {
    *ttl == crate::constants::DEFAULT_PROVIDER_TTL
}

/// Reference to a managed provider zone.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ManagedZoneReference {
    /// Name of the managed zone, as declared in the controller configuration
    pub name: String,
}

/// `DNSRecord` holds the desired endpoints of one managed zone.
///
/// # Example
///
/// ```yaml
/// apiVersion: gatewaydns.io/v1alpha1
/// kind: DNSRecord
/// metadata:
///   name: prod-web-api
///   namespace: multi-cluster-gateways
/// spec:
///   managedZone:
///     name: example-com
///   endpoints:
///     - dnsName: api.example.com
///       recordType: CNAME
///       targets:
///         - lb.eu-west.example.com
///       recordTTL: 300
/// ```
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, PartialEq, JsonSchema)]
#[kube(
    group = "gatewaydns.io",
    version = "v1alpha1",
    kind = "DNSRecord",
    namespaced,
    shortname = "dnsrec",
    doc = "DNSRecord is the record set of one managed DNS zone. spec.endpoints is the declared intent; status.endpoints holds the endpoints the provider was last confirmed to hold.",
    printcolumn = r#"{"name":"Ready","type":"string","jsonPath":".status.conditions[?(@.type==\"Ready\")].status","description":"DNSRecord ready."}"#
)]
#[kube(status = "DNSRecordStatus")]
#[serde(rename_all = "camelCase")]
pub struct DNSRecordSpec {
    /// Managed zone the endpoints are published to. Required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub managed_zone: Option<ManagedZoneReference>,

    /// Desired endpoints. At least one entry when present.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[schemars(length(min = 1))]
    pub endpoints: Vec<Endpoint>,
}

/// `DNSRecord` status
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DNSRecordStatus {
    /// Conditions of the record in its managed zone.
    ///
    /// If publishing fails, the `Failed` condition is set with a reason and a message
    /// describing the failed operations.
    #[serde(default)]
    pub conditions: Vec<Condition>,

    /// Most recently processed `metadata.generation`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,

    /// Endpoints last confirmed as published by the provider.
    ///
    /// Endpoints that disappear from `spec.endpoints` are deleted from the provider
    /// using this list.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub endpoints: Vec<Endpoint>,

    /// Managed zone holding `endpoints`.
    ///
    /// When `spec.managedZone` moves, the endpoints are removed from this zone before
    /// they are created in the new one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_zone: Option<String>,
}

#[cfg(test)]
#[path = "crd_tests.rs"]
mod crd_tests;

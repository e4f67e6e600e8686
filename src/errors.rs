// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for record set reconciliation and dependency routing.
//!
//! This module provides specialized error types for:
//! - Record set validation (rejected before any provider call)
//! - Provider operations (scoped to one endpoint, never abort sibling operations)
//! - Dependency listing (scoped to one router invocation)
//!
//! Every error is recoverable by retry at the next triggering event. Errors expose a
//! status reason so they can be reported through status conditions and metrics.

use thiserror::Error;

/// A record set that cannot be published as declared.
///
/// Validation errors reject the whole cycle; nothing is partially applied.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Two desired endpoints share the same set id (`dnsName` + `setIdentifier`)
    #[error("duplicate endpoint set id '{set_id}' in desired endpoints")]
    DuplicateSetId {
        /// The set id declared more than once
        set_id: String,
    },

    /// `spec.managedZone` is missing
    #[error("spec.managedZone is required")]
    MissingZoneReference,

    /// An endpoint has no `dnsName`
    #[error("endpoint at index {index} has an empty dnsName")]
    EmptyDnsName {
        /// Position of the endpoint in `spec.endpoints`
        index: usize,
    },

    /// An endpoint has no `recordType`
    #[error("endpoint '{dns_name}' has no recordType")]
    MissingRecordType {
        /// The endpoint name
        dns_name: String,
    },

    /// An endpoint uses an extension record type that is not a valid mnemonic
    #[error("endpoint '{dns_name}' has invalid recordType '{record_type}'")]
    InvalidRecordType {
        /// The endpoint name
        dns_name: String,
        /// The rejected record type
        record_type: String,
    },
}

impl ValidationError {
    /// Returns the Kubernetes status reason code for this error.
    #[must_use]
    pub fn status_reason(&self) -> &'static str {
        match self {
            Self::DuplicateSetId { .. } => "DuplicateSetId",
            Self::MissingZoneReference => "MissingZoneReference",
            Self::EmptyDnsName { .. } | Self::MissingRecordType { .. } => "InvalidEndpoint",
            Self::InvalidRecordType { .. } => "InvalidRecordType",
        }
    }
}

/// Failure of a single create/update/delete operation against a provider zone.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderOperationError {
    /// The provider refused the change (bad data, conflicting record, quota)
    #[error("provider rejected {operation} of '{set_id}' in zone '{zone}': {reason}")]
    Rejected {
        /// Operation kind (`create`, `update`, `delete`)
        operation: String,
        /// Set id of the endpoint
        set_id: String,
        /// Managed zone name
        zone: String,
        /// Provider explanation
        reason: String,
    },

    /// The provider could not be reached or timed out
    #[error("provider for zone '{zone}' unavailable: {reason}")]
    Unavailable {
        /// Managed zone name
        zone: String,
        /// Transport level explanation
        reason: String,
    },

    /// The referenced managed zone resolves to no provider
    #[error("managed zone '{zone}' is not configured for namespace '{namespace}'")]
    ZoneNotFound {
        /// Managed zone name
        zone: String,
        /// Namespace of the record set
        namespace: String,
    },
}

impl ProviderOperationError {
    /// Returns true if retrying the same operation may succeed without a spec change.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Unavailable { .. } | Self::ZoneNotFound { .. } => true,
            Self::Rejected { .. } => false,
        }
    }

    /// Returns the Kubernetes status reason code for this error.
    #[must_use]
    pub fn status_reason(&self) -> &'static str {
        match self {
            Self::Rejected { .. } => "ProviderRejected",
            Self::Unavailable { .. } => "ProviderUnavailable",
            Self::ZoneNotFound { .. } => "ZoneNotFound",
        }
    }
}

/// Listing the candidate gateways of a changed credential failed.
///
/// The router performs no enqueues for the invocation; redelivery is the event source's job.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DependencyListError {
    /// The list call failed
    #[error("failed to list gateways in namespace '{namespace}': {reason}")]
    ListFailed {
        /// Namespace that was listed
        namespace: String,
        /// Underlying error message
        reason: String,
    },
}

impl DependencyListError {
    /// Returns the status reason code for this error.
    #[must_use]
    pub fn status_reason(&self) -> &'static str {
        match self {
            Self::ListFailed { .. } => "GatewayListFailed",
        }
    }
}

/// Reconciliation error wrapper handed to the controller runtime.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ReconcileError(#[from] anyhow::Error);

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;

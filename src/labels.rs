// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Common label, annotation and finalizer constants.
//!
//! This module defines the labels used to recognise credentials, the annotation used to
//! hand gateway re-evaluation requests to the gateway controller, and the finalizer that
//! guards `DNSRecord` teardown.

// ============================================================================
// Credential Labels
// ============================================================================

/// Default label key marking a `Secret` as a gateway credential
pub const CREDENTIAL_LABEL_KEY: &str = "argocd.argoproj.io/secret-type";

/// Default label value marking a `Secret` as a gateway credential
pub const CREDENTIAL_LABEL_VALUE: &str = "cluster";

// ============================================================================
// Gateway Annotations
// ============================================================================

/// Annotation written on a `Gateway` to request its re-evaluation (value is an RFC3339 timestamp)
pub const GATEWAY_REEVALUATE_ANNOTATION: &str = "gatewaydns.io/credentials-changed-at";

// ============================================================================
// Finalizers
// ============================================================================

/// Finalizer for `DNSRecord` resources
pub const FINALIZER_DNS_RECORD: &str = "dnsrecord.gatewaydns.io/finalizer";

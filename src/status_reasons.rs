// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Standard Kubernetes status condition types and reasons for `DNSRecord` resources.
//!
//! Reasons are programmatic identifiers in CamelCase that explain why a condition has
//! a particular status.
//!
//! # Condition Types
//!
//! - `Ready` - every desired endpoint is published and every stale endpoint removed
//! - `Failed` - at least one provider operation of the last cycle failed, or the record
//!   set was rejected by validation
//!
//! # Example Status
//!
//! ```yaml
//! status:
//!   observedGeneration: 4
//!   conditions:
//!     - type: Ready
//!       status: "False"
//!       reason: ProviderError
//!       message: "1 of 2 operations failed"
//!       observedGeneration: 4
//!     - type: Failed
//!       status: "True"
//!       reason: ProviderError
//!       message: "create b.example.com: provider rejected create ..."
//!       observedGeneration: 4
//! ```

// ============================================================================
// Condition Types
// ============================================================================

/// Condition type for the overall readiness of a record set.
pub const CONDITION_TYPE_READY: &str = "Ready";

/// Condition type raised when the last cycle failed in whole or in part.
pub const CONDITION_TYPE_FAILED: &str = "Failed";

pub const CONDITION_STATUS_TRUE: &str = "True";
pub const CONDITION_STATUS_FALSE: &str = "False";

// ============================================================================
// Reasons
// ============================================================================

/// Every operation of the cycle was confirmed by the provider.
pub const REASON_PROVIDER_SUCCESS: &str = "ProviderSuccess";

/// At least one operation of the cycle failed at the provider.
///
/// Endpoints whose operations succeeded are still reflected in `status.endpoints`;
/// the failed ones are retried on the next cycle.
pub const REASON_PROVIDER_ERROR: &str = "ProviderError";

/// The record set was rejected before any provider call (duplicate set ids, empty names,
/// missing or invalid record types, missing zone reference).
///
/// Nothing is retried until `metadata.generation` changes.
pub const REASON_VALIDATION_FAILED: &str = "ValidationFailed";

/// `spec.managedZone` names a zone that is not configured for the record's namespace.
pub const REASON_ZONE_NOT_FOUND: &str = "ZoneNotFound";

/// The record set is being torn down and published endpoints are being deleted.
pub const REASON_DELETING: &str = "Deleting";

/// No failure was observed in the last cycle.
pub const REASON_NO_FAILURES: &str = "NoFailures";

/// Maps a boolean to the Kubernetes condition status string.
#[must_use]
pub fn condition_status(value: bool) -> &'static str {
    if value {
        CONDITION_STATUS_TRUE
    } else {
        CONDITION_STATUS_FALSE
    }
}

#[cfg(test)]
#[path = "status_reasons_tests.rs"]
mod status_reasons_tests;

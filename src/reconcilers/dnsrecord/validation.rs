// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Validation of a record set before any provider call.

use crate::crd::{DNSRecordSpec, Endpoint, ManagedZoneReference};
use crate::errors::ValidationError;
use std::collections::BTreeSet;

/// Check that `desired` can be published as declared.
///
/// Every endpoint needs a name and a record type (extension types must be plausible
/// mnemonics), and set ids must be unique across the collection.
///
/// # Errors
///
/// Returns the first [`ValidationError`] found, in endpoint order.
pub fn validate_endpoints(desired: &[Endpoint]) -> Result<(), ValidationError> {
    let mut seen = BTreeSet::new();

    for (index, endpoint) in desired.iter().enumerate() {
        if endpoint.dns_name.trim().is_empty() {
            return Err(ValidationError::EmptyDnsName { index });
        }

        let Some(record_type) = endpoint.record_type.as_ref() else {
            return Err(ValidationError::MissingRecordType {
                dns_name: endpoint.dns_name.clone(),
            });
        };

        if record_type.is_invalid_extension() {
            return Err(ValidationError::InvalidRecordType {
                dns_name: endpoint.dns_name.clone(),
                record_type: record_type.to_string(),
            });
        }

        let set_id = endpoint.set_id();
        if !seen.insert(set_id.clone()) {
            return Err(ValidationError::DuplicateSetId { set_id });
        }
    }

    Ok(())
}

/// Return the zone reference of `spec`.
///
/// # Errors
///
/// Returns [`ValidationError::MissingZoneReference`] when unset or empty.
pub fn validate_zone_ref(spec: &DNSRecordSpec) -> Result<&ManagedZoneReference, ValidationError> {
    spec.managed_zone
        .as_ref()
        .filter(|zone| !zone.name.is_empty())
        .ok_or(ValidationError::MissingZoneReference)
}

#[cfg(test)]
#[path = "validation_tests.rs"]
mod validation_tests;

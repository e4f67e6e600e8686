// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Folding provider results into the next published state.

use super::plan::Changes;
use crate::crd::Endpoint;
use crate::provider::OperationResult;
use std::collections::{BTreeMap, BTreeSet};

/// Compute the endpoints the provider holds after applying `changes`.
///
/// - confirmed creates and updates take the desired version
/// - a failed update keeps the previously published version
/// - a failed create is absent
/// - a confirmed delete is removed, a failed one is kept
/// - endpoints the plan did not touch take the desired version
///
/// A planned operation without a result counts as failed. The returned list follows
/// the order of `desired`, followed by retained deletes in published order.
#[must_use]
pub fn publish_results(
    published: &[Endpoint],
    desired: &[Endpoint],
    changes: &Changes,
    results: &[OperationResult],
) -> Vec<Endpoint> {
    let confirmed: BTreeSet<String> = results
        .iter()
        .filter(|result| result.is_success())
        .map(|result| result.operation.set_id())
        .collect();

    let mut published_by_id: BTreeMap<String, &Endpoint> = BTreeMap::new();
    for endpoint in published {
        published_by_id.entry(endpoint.set_id()).or_insert(endpoint);
    }

    let planned = changes.set_ids();
    let desired_ids: BTreeSet<String> = desired.iter().map(Endpoint::set_id).collect();
    let mut next = Vec::with_capacity(desired.len());

    for endpoint in desired {
        let set_id = endpoint.set_id();
        let previous = published_by_id.get(&set_id);

        if !planned.contains(&set_id) {
            if previous.is_some() {
                next.push(endpoint.clone());
            }
        } else if confirmed.contains(&set_id) {
            next.push(endpoint.clone());
        } else if let Some(previous) = previous {
            next.push((*previous).clone());
        }
    }

    let mut retained = BTreeSet::new();
    for endpoint in published {
        let set_id = endpoint.set_id();
        if desired_ids.contains(&set_id) || !retained.insert(set_id.clone()) {
            continue;
        }
        if !(planned.contains(&set_id) && confirmed.contains(&set_id)) {
            next.push(endpoint.clone());
        }
    }

    next
}

/// Failure summary of a cycle, `None` when every operation succeeded.
///
/// The message names the number of failures and each failed operation with its error.
#[must_use]
pub fn summarize_failures(results: &[OperationResult]) -> Option<String> {
    let failures: Vec<String> = results
        .iter()
        .filter_map(|result| {
            result.outcome.as_ref().err().map(|error| {
                format!(
                    "{} {}: {error}",
                    result.operation.kind(),
                    result.operation.set_id()
                )
            })
        })
        .collect();

    if failures.is_empty() {
        return None;
    }

    Some(format!(
        "{} of {} operation(s) failed: {}",
        failures.len(),
        results.len(),
        failures.join("; ")
    ))
}

#[cfg(test)]
#[path = "publish_tests.rs"]
mod publish_tests;

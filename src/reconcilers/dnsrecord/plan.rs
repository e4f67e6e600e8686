// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Diff of desired endpoints against published endpoints.
//!
//! Endpoints are matched by set id. A set id present on both sides is never planned as
//! a create plus a delete; it is an update when the provider-visible fields differ and
//! nothing at all otherwise.

use crate::crd::Endpoint;
use crate::provider::Operation;
use std::collections::{BTreeMap, BTreeSet};

/// An endpoint whose provider-visible fields changed.
#[derive(Clone, Debug, PartialEq)]
pub struct EndpointUpdate {
    /// Currently published version
    pub previous: Endpoint,
    /// Version to publish
    pub desired: Endpoint,
}

/// Planned changes for one cycle. Lists are disjoint by set id and sorted by set id.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Changes {
    pub create: Vec<Endpoint>,
    pub update: Vec<EndpointUpdate>,
    pub delete: Vec<Endpoint>,
}

impl Changes {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.create.is_empty() && self.update.is_empty() && self.delete.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.create.len() + self.update.len() + self.delete.len()
    }

    /// Flatten into provider operations: creates, then updates, then deletes.
    #[must_use]
    pub fn operations(&self) -> Vec<Operation> {
        self.create
            .iter()
            .cloned()
            .map(Operation::Create)
            .chain(
                self.update
                    .iter()
                    .map(|update| Operation::Update(update.desired.clone())),
            )
            .chain(self.delete.iter().cloned().map(Operation::Delete))
            .collect()
    }

    /// Set ids touched by the plan.
    #[must_use]
    pub fn set_ids(&self) -> BTreeSet<String> {
        self.create
            .iter()
            .chain(self.update.iter().map(|update| &update.desired))
            .chain(self.delete.iter())
            .map(Endpoint::set_id)
            .collect()
    }
}

/// Compute the operations that move `published` to `desired`.
///
/// `desired` is expected to have passed validation. Should `published` hold a set id
/// twice, the first occurrence is the one compared.
#[must_use]
pub fn plan_changes(desired: &[Endpoint], published: &[Endpoint]) -> Changes {
    let mut published_by_id: BTreeMap<String, &Endpoint> = BTreeMap::new();
    for endpoint in published {
        published_by_id.entry(endpoint.set_id()).or_insert(endpoint);
    }

    let desired_ids: BTreeSet<String> = desired.iter().map(Endpoint::set_id).collect();
    let mut changes = Changes::default();

    for endpoint in desired {
        match published_by_id.get(&endpoint.set_id()) {
            None => changes.create.push(endpoint.clone()),
            Some(previous) if !endpoint.provider_equal(previous) => {
                changes.update.push(EndpointUpdate {
                    previous: (*previous).clone(),
                    desired: endpoint.clone(),
                });
            }
            Some(_) => {}
        }
    }

    changes.delete = published_by_id
        .into_iter()
        .filter(|(set_id, _)| !desired_ids.contains(set_id))
        .map(|(_, endpoint)| endpoint.clone())
        .collect();

    changes.create.sort_by_key(Endpoint::set_id);
    changes.update.sort_by_key(|update| update.desired.set_id());

    changes
}

#[cfg(test)]
#[path = "plan_tests.rs"]
mod plan_tests;

// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Behaviour of the [`Endpoint`] value type.
//!
//! Endpoints are keyed by their *set id* (`dnsName` + `setIdentifier`), which must be
//! unique within a record set. Update detection compares endpoints with
//! [`Endpoint::provider_equal`], which ignores the label metadata providers never see.

use crate::crd::{Endpoint, ProviderSpecific, ProviderSpecificProperty, RecordType};
use std::fmt;

impl Endpoint {
    /// Create an endpoint with the provider default TTL and no set identifier.
    #[must_use]
    pub fn new(dns_name: impl Into<String>, record_type: RecordType, targets: Vec<String>) -> Self {
        Self {
            dns_name: dns_name.into(),
            targets,
            record_type: Some(record_type),
            ..Default::default()
        }
    }

    /// Id that must be unique across a set of endpoints.
    #[must_use]
    pub fn set_id(&self) -> String {
        format!("{}{}", self.dns_name, self.set_identifier)
    }

    /// Applies the given set identifier to the endpoint.
    #[must_use]
    pub fn with_set_identifier(mut self, set_identifier: impl Into<String>) -> Self {
        self.set_identifier = set_identifier.into();
        self
    }

    #[must_use]
    pub fn with_ttl(mut self, ttl: i64) -> Self {
        self.record_ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Returns the provider specific property named `key`, if present.
    #[must_use]
    pub fn get_provider_specific(&self, key: &str) -> Option<&ProviderSpecificProperty> {
        self.provider_specific.get(key)
    }

    /// Sets a provider specific key/value pair, replacing any existing value for `key`.
    pub fn set_provider_specific(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.provider_specific.set(key, value);
    }

    /// Structural equality over everything a provider sees.
    ///
    /// Labels are excluded; target order is significant.
    #[must_use]
    pub fn provider_equal(&self, other: &Self) -> bool {
        self.dns_name == other.dns_name
            && self.set_identifier == other.set_identifier
            && self.record_type == other.record_type
            && self.record_ttl == other.record_ttl
            && self.targets == other.targets
            && self.provider_specific == other.provider_specific
    }
}

impl fmt::Display for Endpoint {
    /// Zone-file-like line: `name ttl IN type setIdentifier [targets] [providerSpecific]`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let record_type = self.record_type.as_ref().map_or("", RecordType::as_str);
        write!(
            f,
            "{} {} IN {} {} [{}] {}",
            self.dns_name,
            self.record_ttl,
            record_type,
            self.set_identifier,
            self.targets.join(" "),
            self.provider_specific
        )
    }
}

impl ProviderSpecific {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProviderSpecificProperty> {
        self.0.iter()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ProviderSpecificProperty> {
        self.0.iter().find(|property| property.name == name)
    }

    /// Upsert by name: update in place when present, append otherwise.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();

        if let Some(existing) = self.0.iter_mut().find(|property| property.name == name) {
            existing.value = value;
            return;
        }

        self.0.push(ProviderSpecificProperty { name, value });
    }
}

impl fmt::Display for ProviderSpecific {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .0
            .iter()
            .map(|property| format!("{{{} {}}}", property.name, property.value))
            .collect();
        write!(f, "[{}]", rendered.join(" "))
    }
}

#[cfg(test)]
#[path = "endpoint_tests.rs"]
mod endpoint_tests;

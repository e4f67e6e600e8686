// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

#![allow(unexpected_cfgs)]

//! # gateway-dns - DNS record and credential reconciliation for gateway control planes
//!
//! `gateway-dns` is the core of a multi-cluster gateway control plane: it publishes the
//! endpoints declared in `DNSRecord` resources to managed provider zones, and it wakes
//! up Gateways whenever a TLS credential they depend on changes.
//!
//! ## Overview
//!
//! - `DNSRecord` reconciliation: validate, plan, publish, record per-operation outcomes
//! - Record-set teardown through a finalizer when a `DNSRecord` is deleted
//! - Credential dependency routing from labelled `Secret`s to dependent `Gateway`s
//!
//! ## Modules
//!
//! - [`crd`] - `DNSRecord` custom resource and endpoint types
//! - [`gateway`] - The subset of the Gateway API consumed by the router
//! - [`reconcilers`] - Reconciliation logic for `DNSRecord`
//! - [`router`] - Credential to Gateway dependency routing
//! - [`provider`] - Managed zones and the publisher abstraction
//! - [`config`] - Operator configuration
//!
//! ## Example
//!
//! ```rust,no_run
//! use gateway_dns::crd::{DNSRecordSpec, Endpoint, ManagedZoneReference, RecordType};
//!
//! let spec = DNSRecordSpec {
//!     managed_zone: Some(ManagedZoneReference {
//!         name: "example-com".to_string(),
//!     }),
//!     endpoints: vec![Endpoint::new(
//!         "api.example.com",
//!         RecordType::A,
//!         vec!["192.0.2.10".to_string()],
//!     )
//!     .with_set_identifier("eu-west")
//!     .with_ttl(60)],
//! };
//! ```

pub mod config;
pub mod constants;
pub mod context;
pub mod credential_controller;
pub mod crd;
pub mod endpoint;
pub mod errors;
pub mod gateway;
pub mod labels;
pub mod metrics;
pub mod provider;
pub mod reconcilers;
pub mod record_controller;
pub mod router;
pub mod status_reasons;

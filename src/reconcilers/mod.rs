// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Kubernetes reconciliation logic for `DNSRecord` resources.
//!
//! The operator follows the standard Kubernetes controller pattern:
//!
//! 1. **Watch** - Monitor `DNSRecord` changes via the Kubernetes API
//! 2. **Reconcile** - Diff desired endpoints (`spec.endpoints`) against published ones
//!    (`status.endpoints`)
//! 3. **Publish** - Apply the diff to the managed zone's publisher
//! 4. **Status** - Report published endpoints and conditions back to Kubernetes
//!
//! # Available Reconcilers
//!
//! - [`reconcile_dnsrecord`] - Publishes a record set to its managed zone
//! - [`delete_dnsrecord`] - Removes every published endpoint of a deleted record set
//!
//! # Example: Using a Reconciler
//!
//! ```rust,no_run
//! use gateway_dns::reconcilers::reconcile_dnsrecord;
//! use gateway_dns::crd::DNSRecord;
//! use gateway_dns::context::Context;
//! use std::sync::Arc;
//!
//! async fn reconcile(ctx: Arc<Context>, record: DNSRecord) -> anyhow::Result<()> {
//!     let outcome = reconcile_dnsrecord(ctx, record).await?;
//!     println!("cycle finished: {outcome:?}");
//!     Ok(())
//! }
//! ```

pub mod dnsrecord;
pub mod status;


pub use dnsrecord::{delete_dnsrecord, reconcile_dnsrecord, ReconcileOutcome};

/// Check if a resource's spec has changed by comparing generation with `observed_generation`.
///
/// The `metadata.generation` field is incremented by Kubernetes only when the spec changes,
/// while `status.observed_generation` is set by the controller after processing a spec.
///
/// # Returns
///
/// * `true` - Reconciliation is needed (spec changed or first reconciliation)
/// * `false` - No reconciliation needed (spec unchanged, status-only update)
///
/// # Kubernetes Generation Semantics
///
/// - When they match: spec hasn't changed since last reconciliation
/// - When they differ: spec has changed
/// - When `observed_generation` is None: first reconciliation
#[must_use]
pub fn should_reconcile(current_generation: Option<i64>, observed_generation: Option<i64>) -> bool {
    match (current_generation, observed_generation) {
        (Some(current), Some(observed)) => current != observed,
        (Some(_), None) => true, // First reconciliation
        _ => false,              // No generation tracking available
    }
}

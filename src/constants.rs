// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the gateway DNS controller.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// API Constants
// ============================================================================

/// API group for all gateway-dns CRDs
pub const API_GROUP: &str = "gatewaydns.io";

/// API version for all gateway-dns CRDs
pub const API_VERSION: &str = "v1alpha1";

/// Fully qualified API version (group/version)
pub const API_GROUP_VERSION: &str = "gatewaydns.io/v1alpha1";

/// Kind name for `DNSRecord` resource
pub const KIND_DNS_RECORD: &str = "DNSRecord";

/// Kind name for the Gateway API `Gateway` resource
pub const KIND_GATEWAY: &str = "Gateway";

/// Kind name for core `Secret` resources (credentials)
pub const KIND_SECRET: &str = "Secret";

/// API group of Gateway API resources
pub const GATEWAY_API_GROUP: &str = "gateway.networking.k8s.io";

/// Core API group (empty string in Gateway API object references)
pub const CORE_API_GROUP: &str = "";

// ============================================================================
// Gateway Listener Constants
// ============================================================================

/// Listener protocol that terminates TLS for HTTP traffic
pub const PROTOCOL_HTTPS: &str = "HTTPS";

/// Listener protocol for raw TLS traffic
pub const PROTOCOL_TLS: &str = "TLS";

/// TLS mode in which the gateway does not terminate TLS (no certificate used)
pub const TLS_MODE_PASSTHROUGH: &str = "Passthrough";

// ============================================================================
// Record Set Constants
// ============================================================================

/// TTL value meaning "use the provider default"
pub const DEFAULT_PROVIDER_TTL: i64 = 0;

// ============================================================================
// Controller Error Handling Constants
// ============================================================================

/// Requeue duration for controller errors (30 seconds)
pub const ERROR_REQUEUE_DURATION_SECS: u64 = 30;

/// Requeue duration after a publish cycle with failed provider operations (15 seconds)
pub const PARTIAL_FAILURE_REQUEUE_SECS: u64 = 15;

/// Requeue duration for a fully published record set (5 minutes)
pub const READY_REQUEUE_DURATION_SECS: u64 = 300;

// ============================================================================
// Dependency Router Constants
// ============================================================================

/// Default window during which repeated gateway requests collapse into one (milliseconds)
pub const DEFAULT_GATEWAY_BATCH_WINDOW_MILLIS: u64 = 500;

/// Delivery attempts per gateway before a re-evaluation request is given up
pub const GATEWAY_DISPATCH_MAX_ATTEMPTS: u32 = 5;

/// Upper bound of the delay before failed gateway deliveries are retried (seconds)
pub const GATEWAY_DISPATCH_MAX_BACKOFF_SECS: u64 = 30;

/// Page size for Kubernetes list operations
pub const KUBE_LIST_PAGE_SIZE: u32 = 100;

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of worker threads for Tokio runtime
pub const TOKIO_WORKER_THREADS: usize = 4;

// ============================================================================
// Metrics Server Constants
// ============================================================================

/// Port for Prometheus metrics HTTP server
pub const METRICS_SERVER_PORT: u16 = 8080;

/// Path for Prometheus metrics endpoint
pub const METRICS_SERVER_PATH: &str = "/metrics";

/// Path for the liveness endpoint
pub const HEALTH_SERVER_PATH: &str = "/healthz";

/// Bind address for metrics HTTP server
pub const METRICS_SERVER_BIND_ADDRESS: &str = "0.0.0.0";

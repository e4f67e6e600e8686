// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared context for all controllers.
//!
//! Every controller receives an `Arc<Context>` holding:
//! - Kubernetes client
//! - Provider registry resolving managed zone references
//! - Operator configuration

use crate::config::OperatorConfig;
use crate::provider::ProviderRegistry;
use kube::Client;

/// Shared context passed to all controllers.
#[derive(Clone)]
pub struct Context {
    /// Kubernetes client for API operations
    pub client: Client,

    /// Managed zones and their publishers
    pub providers: ProviderRegistry,

    /// Loaded operator configuration
    pub config: OperatorConfig,
}

impl Context {
    /// Build a context, creating publishers for every configured managed zone.
    #[must_use]
    pub fn new(client: Client, config: OperatorConfig) -> Self {
        let providers = ProviderRegistry::from_config(&config);
        Self {
            client,
            providers,
            config,
        }
    }
}

//! In-memory capability provider.

use super::{BucketKey, Capability, CapabilityProvider, ProviderConnector, RegistrationRequest};
use crate::error::{LearnPathError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Provider with a fixed capability list. Useful for testing and offline runs.
#[derive(Default)]
pub struct StaticCapabilityProvider {
    capabilities: Vec<Capability>,
    failure: Option<String>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl StaticCapabilityProvider {
    pub fn new(capabilities: Vec<Capability>) -> Self {
        Self {
            capabilities,
            ..Self::default()
        }
    }

    /// Provider exposing the given names, all attributed to one server.
    pub fn with_names(server: BucketKey, names: &[&str]) -> Self {
        Self::new(names.iter().map(|n| Capability::new(n, server)).collect())
    }

    /// Provider whose capability query always fails with `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    /// Calls made through [`CapabilityProvider::call_capability`], in order.
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl CapabilityProvider for StaticCapabilityProvider {
    async fn list_capabilities(&self) -> Result<Vec<Capability>> {
        match &self.failure {
            Some(message) => Err(LearnPathError::Mcp(message.clone())),
            None => Ok(self.capabilities.clone()),
        }
    }

    async fn call_capability(&self, name: &str, arguments: Value) -> Result<String> {
        if !self.capabilities.iter().any(|c| c.name == name) {
            return Err(LearnPathError::Mcp(format!("Unknown tool: {}", name)));
        }
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((name.to_string(), arguments.clone()));
        }
        Ok(format!("{} result for {}", name, arguments))
    }
}

/// Connector handing out one shared [`StaticCapabilityProvider`].
pub struct StaticConnector {
    provider: Arc<StaticCapabilityProvider>,
    connects: AtomicUsize,
}

impl StaticConnector {
    pub fn new(provider: StaticCapabilityProvider) -> Self {
        Self {
            provider: Arc::new(provider),
            connects: AtomicUsize::new(0),
        }
    }

    /// How many times a provider was requested.
    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

impl ProviderConnector for StaticConnector {
    fn connect(&self, _request: &RegistrationRequest) -> Result<Arc<dyn CapabilityProvider>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(self.provider.clone())
    }
}

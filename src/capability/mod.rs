//! Capability negotiation.
//!
//! Builds the registration request from the configured endpoints, asks the
//! capability provider which tools actually exist, and classifies them into
//! the three fixed buckets (YouTube, Google Drive, Notion).

mod memory;
mod negotiator;

pub use memory::{StaticCapabilityProvider, StaticConnector};
pub use negotiator::{CapabilityNegotiator, Negotiation};

use crate::error::{LearnPathError, Result};
use crate::progress::ProgressSink;
use crate::validation::validate_url;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// The fixed registration keys. `Youtube` is the only mandatory one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketKey {
    Youtube,
    Drive,
    Notion,
}

impl BucketKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            BucketKey::Youtube => "youtube",
            BucketKey::Drive => "drive",
            BucketKey::Notion => "notion",
        }
    }

    /// Human-readable integration name.
    pub fn label(&self) -> &'static str {
        match self {
            BucketKey::Youtube => "YouTube",
            BucketKey::Drive => "Google Drive",
            BucketKey::Notion => "Notion",
        }
    }
}

impl std::fmt::Display for BucketKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Transport used to reach a capability provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Transport {
    #[default]
    StreamableHttp,
}

/// Where and how to reach one capability provider.
///
/// Serialises the endpoint under `url`, the key MCP client configs expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionDescriptor {
    pub url: Url,
    pub transport: Transport,
}

/// Endpoint URLs as entered by the user, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EndpointSet {
    pub youtube_url: Option<String>,
    pub drive_url: Option<String>,
    pub notion_url: Option<String>,
}

/// Mapping from bucket key to connection descriptor. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RegistrationRequest {
    entries: BTreeMap<BucketKey, ConnectionDescriptor>,
}

impl RegistrationRequest {
    /// Build the request from whichever endpoints validate.
    ///
    /// A missing or malformed YouTube endpoint fails with [`LearnPathError::Config`].
    /// Malformed optional endpoints are left out without error.
    pub fn build(endpoints: &EndpointSet, progress: &mut dyn ProgressSink) -> Result<Self> {
        let invalid_primary = || LearnPathError::Config("Invalid YouTube MCP URL provided".to_string());
        let youtube = endpoints
            .youtube_url
            .as_deref()
            .filter(|u| validate_url(u))
            .ok_or_else(invalid_primary)?;

        let mut entries = BTreeMap::new();
        entries.insert(
            BucketKey::Youtube,
            descriptor(youtube).map_err(|_| invalid_primary())?,
        );

        for (key, url) in [
            (BucketKey::Drive, endpoints.drive_url.as_deref()),
            (BucketKey::Notion, endpoints.notion_url.as_deref()),
        ] {
            let Some(url) = url.filter(|u| !u.is_empty()) else {
                continue;
            };
            if !validate_url(url) {
                debug!("Ignoring malformed {} endpoint", key);
                continue;
            }
            match descriptor(url) {
                Ok(d) => {
                    entries.insert(key, d);
                    progress.notify(&format!("Added {} integration...", key.label()));
                }
                Err(e) => debug!("Ignoring {} endpoint: {}", key, e),
            }
        }

        Ok(Self { entries })
    }

    pub fn get(&self, key: BucketKey) -> Option<&ConnectionDescriptor> {
        self.entries.get(&key)
    }

    pub fn contains(&self, key: BucketKey) -> bool {
        self.entries.contains_key(&key)
    }

    /// Entries in fixed key order (youtube, drive, notion).
    pub fn iter(&self) -> impl Iterator<Item = (BucketKey, &ConnectionDescriptor)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn descriptor(url: &str) -> Result<ConnectionDescriptor> {
    Ok(ConnectionDescriptor {
        url: Url::parse(url)?,
        transport: Transport::StreamableHttp,
    })
}

/// A named operation exposed by a provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Capability {
    pub name: String,
    pub description: Option<String>,
    pub input_schema: Value,
    /// The endpoint that exposed this capability.
    pub server: BucketKey,
}

impl Capability {
    pub fn new(name: &str, server: BucketKey) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            input_schema: serde_json::json!({ "type": "object", "properties": {} }),
            server,
        }
    }
}

/// Case-insensitive substring keywords for each bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityKeywords {
    pub youtube: Vec<String>,
    pub drive: Vec<String>,
    pub notion: Vec<String>,
}

impl Default for CapabilityKeywords {
    fn default() -> Self {
        Self {
            youtube: vec!["youtube".to_string()],
            drive: vec!["drive".to_string(), "google".to_string()],
            notion: vec!["notion".to_string()],
        }
    }
}

impl CapabilityKeywords {
    fn matches(keywords: &[String], name: &str) -> bool {
        let name = name.to_lowercase();
        keywords.iter().any(|k| name.contains(&k.to_lowercase()))
    }
}

/// Which capability buckets were detected in a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityReport {
    pub youtube_available: bool,
    pub drive_available: bool,
    pub notion_available: bool,
    /// Every capability name observed, in provider order.
    pub available_tools: Vec<String>,
    pub errors: Vec<String>,
}

impl AvailabilityReport {
    /// Classify capability names into buckets.
    ///
    /// A name may match several buckets; each match sets its flag.
    pub fn classify(names: Vec<String>, keywords: &CapabilityKeywords) -> Self {
        let any = |kw: &[String]| names.iter().any(|n| CapabilityKeywords::matches(kw, n));
        let youtube_available = any(&keywords.youtube);
        let drive_available = any(&keywords.drive);
        let notion_available = any(&keywords.notion);

        Self {
            youtube_available,
            drive_available,
            notion_available,
            available_tools: names,
            errors: Vec::new(),
        }
    }

    /// Whether a document-creation capability (Drive or Notion) exists.
    pub fn has_document_capability(&self) -> bool {
        self.drive_available || self.notion_available
    }

    /// Availability flag per bucket.
    pub fn is_available(&self, key: BucketKey) -> bool {
        match key {
            BucketKey::Youtube => self.youtube_available,
            BucketKey::Drive => self.drive_available,
            BucketKey::Notion => self.notion_available,
        }
    }
}

/// Source of capabilities for one registration request.
#[async_trait]
pub trait CapabilityProvider: Send + Sync {
    /// Query every registered endpoint for its capabilities.
    async fn list_capabilities(&self) -> Result<Vec<Capability>>;

    /// Invoke a capability by name and return its textual result.
    async fn call_capability(&self, name: &str, arguments: Value) -> Result<String>;

    /// Release any connections held by the provider.
    async fn close(&self) {}
}

/// Builds a capability provider for a registration request.
pub trait ProviderConnector: Send + Sync {
    fn connect(&self, request: &RegistrationRequest) -> Result<Arc<dyn CapabilityProvider>>;
}

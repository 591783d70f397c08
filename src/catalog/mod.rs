//! Version catalog for server jar downloads.
//!
//! The upstream version manifest is fetched at most once per process
//! lifetime and cached until explicitly invalidated. The fetch itself is
//! behind the [`VersionFetcher`] trait so tests control cache state
//! directly; the HTTP implementation lives behind the default-on `http`
//! feature.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors that can occur when fetching or querying the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Manifest request failed.
    #[cfg(feature = "http")]
    #[error("manifest request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Manifest body did not match the expected shape.
    #[error("malformed manifest: {0}")]
    Malformed(String),

    /// Fetcher-specific failure.
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// No version with the requested identifier.
    #[error("version not found: {0}")]
    VersionNotFound(String),
}

/// Release channel of a published server version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseChannel {
    /// Stable release.
    Release,
    /// Development snapshot.
    Snapshot,
}

/// One entry of the upstream version manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionDescriptor {
    /// Version identifier, e.g. "1.21.4".
    pub id: String,
    /// Release channel.
    #[serde(rename = "type")]
    pub channel: ReleaseChannel,
    /// URL of the per-version detail document.
    pub url: String,
    /// Publication timestamp, when the manifest carries one.
    #[serde(rename = "releaseTime", default, skip_serializing_if = "Option::is_none")]
    pub release_time: Option<DateTime<Utc>>,
}

/// The manifest document as served upstream.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionManifest {
    /// Ordered version descriptors, newest first.
    pub versions: Vec<VersionDescriptor>,
}

/// Source of version descriptors.
#[async_trait]
pub trait VersionFetcher: Send + Sync {
    /// Fetch the full, ordered version list.
    async fn fetch(&self) -> Result<Vec<VersionDescriptor>, CatalogError>;
}

/// Process-lifetime cache over a [`VersionFetcher`].
///
/// The first successful fetch is cached; failures are not, so a transient
/// upstream error does not poison the catalog. [`invalidate`] resets the
/// cache explicitly.
///
/// [`invalidate`]: VersionCatalog::invalidate
pub struct VersionCatalog<F: VersionFetcher> {
    fetcher: F,
    cache: RwLock<Option<Vec<VersionDescriptor>>>,
}

impl<F: VersionFetcher> VersionCatalog<F> {
    /// Create a catalog over the given fetcher, with an empty cache.
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            cache: RwLock::new(None),
        }
    }

    /// The fetcher backing this catalog.
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// All known versions, fetching once on first use.
    pub async fn versions(&self) -> Result<Vec<VersionDescriptor>, CatalogError> {
        if let Some(cached) = self.cache.read().await.as_ref() {
            return Ok(cached.clone());
        }

        let mut cache = self.cache.write().await;
        // Another caller may have filled the cache while we waited.
        if let Some(cached) = cache.as_ref() {
            return Ok(cached.clone());
        }

        let fetched = self.fetcher.fetch().await?;
        *cache = Some(fetched.clone());
        Ok(fetched)
    }

    /// Versions on the release channel only, in manifest order.
    pub async fn releases(&self) -> Result<Vec<VersionDescriptor>, CatalogError> {
        Ok(self
            .versions()
            .await?
            .into_iter()
            .filter(|v| v.channel == ReleaseChannel::Release)
            .collect())
    }

    /// Look up a version by identifier.
    pub async fn find(&self, id: &str) -> Result<VersionDescriptor, CatalogError> {
        self.versions()
            .await?
            .into_iter()
            .find(|v| v.id == id)
            .ok_or_else(|| CatalogError::VersionNotFound(id.to_string()))
    }

    /// Whether a fetched version list is currently cached.
    pub async fn is_cached(&self) -> bool {
        self.cache.read().await.is_some()
    }

    /// Drop the cached version list; the next query fetches again.
    pub async fn invalidate(&self) {
        *self.cache.write().await = None;
    }
}

/// Fetcher backed by an HTTP manifest endpoint.
#[cfg(feature = "http")]
pub struct HttpVersionFetcher {
    client: reqwest::Client,
    manifest_url: String,
}

#[cfg(feature = "http")]
impl HttpVersionFetcher {
    /// Create a fetcher against the given manifest URL.
    pub fn new(manifest_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            manifest_url: manifest_url.into(),
        }
    }

    /// The manifest URL this fetcher reads.
    pub fn manifest_url(&self) -> &str {
        &self.manifest_url
    }
}

#[cfg(feature = "http")]
#[async_trait]
impl VersionFetcher for HttpVersionFetcher {
    async fn fetch(&self) -> Result<Vec<VersionDescriptor>, CatalogError> {
        let manifest: VersionManifest = self
            .client
            .get(&self.manifest_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(manifest.versions)
    }
}

//! NuGet package version lookup over the v3 flat container API.

use std::sync::Arc;
use std::time::Duration;

use bumper_core::errors::RegistryError;
use bumper_core::{CancellationToken, SemanticVersion};
use moka::sync::Cache;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;

/// The nuget.org flat container base address.
pub const NUGET_FLAT_CONTAINER: &str = "https://api.nuget.org/v3-flatcontainer";

/// Published versions of a package.
pub trait PackageVersionSource: Send + Sync {
    fn versions(
        &self,
        package_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<SemanticVersion>, RegistryError>;
}

#[derive(Debug, Deserialize)]
struct FlatContainerIndex {
    versions: Vec<String>,
}

pub struct NuGetPackageSource {
    client: Client,
    base_url: String,
    cache: Cache<String, Arc<Vec<SemanticVersion>>>,
}

impl NuGetPackageSource {
    pub fn new() -> Result<Self, RegistryError> {
        Self::with_base_url(NUGET_FLAT_CONTAINER)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, RegistryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("bumper/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RegistryError::Client {
                message: e.to_string(),
            })?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            cache: Cache::builder().build(),
        })
    }

    fn fetch(&self, id: &str) -> Result<Vec<SemanticVersion>, RegistryError> {
        let url = format!("{}/{id}/index.json", self.base_url.trim_end_matches('/'));
        tracing::debug!(url = %url, "fetching package versions");
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| RegistryError::Transient {
                message: e.to_string(),
            })?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(RegistryError::NotFound {
                name: id.to_string(),
                reference: "index.json".into(),
            });
        }
        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            return Err(RegistryError::Transient {
                message: format!("{url} returned {status}"),
            });
        }
        if !status.is_success() {
            return Err(RegistryError::InvalidResponse {
                message: format!("{url} returned {status}"),
            });
        }
        let index: FlatContainerIndex = response.json().map_err(|e| RegistryError::InvalidResponse {
            message: e.to_string(),
        })?;
        let mut versions: Vec<SemanticVersion> =
            index.versions.iter().filter_map(|v| v.parse().ok()).collect();
        versions.sort();
        Ok(versions)
    }
}

impl PackageVersionSource for NuGetPackageSource {
    fn versions(
        &self,
        package_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<SemanticVersion>, RegistryError> {
        if cancel.is_cancelled() {
            return Err(RegistryError::Cancelled);
        }
        // Flat container ids are lower-case.
        let id = package_id.to_ascii_lowercase();
        if let Some(cached) = self.cache.get(&id) {
            return Ok(cached.as_ref().clone());
        }
        let versions = self.fetch(&id)?;
        self.cache.insert(id, Arc::new(versions.clone()));
        Ok(versions)
    }
}

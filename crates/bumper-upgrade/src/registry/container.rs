//! Container registry client resolving `image:tag` to a manifest digest.

use std::time::Duration;

use bumper_core::errors::RegistryError;
use bumper_core::CancellationToken;
use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, WWW_AUTHENTICATE};
use reqwest::StatusCode;
use serde::Deserialize;

const DIGEST_HEADER: &str = "Docker-Content-Digest";

const MANIFEST_TYPES: &str = "application/vnd.oci.image.index.v1+json, \
application/vnd.docker.distribution.manifest.list.v2+json, \
application/vnd.oci.image.manifest.v1+json, \
application/vnd.docker.distribution.manifest.v2+json";

/// Resolves an image tag to the digest of the manifest it points at.
pub trait ContainerRegistry: Send + Sync {
    /// `image` is the full repository reference, e.g. `mcr.microsoft.com/dotnet/sdk`.
    fn resolve_digest(
        &self,
        image: &str,
        tag: &str,
        cancel: &CancellationToken,
    ) -> Result<String, RegistryError>;
}

/// Anonymous Registry HTTP API v2 client.
///
/// Registries that answer `401` with a `Bearer` challenge get an anonymous
/// pull token from the advertised realm and the request is retried once.
pub struct HttpContainerRegistry {
    client: Client,
}

impl HttpContainerRegistry {
    pub fn new() -> Result<Self, RegistryError> {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, RegistryError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("bumper/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RegistryError::Client {
                message: e.to_string(),
            })?;
        Ok(Self { client })
    }

    fn head_manifest(&self, url: &str, token: Option<&str>) -> Result<Response, RegistryError> {
        let mut request = self.client.head(url).header(ACCEPT, MANIFEST_TYPES);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request.send().map_err(|e| RegistryError::Transient {
            message: e.to_string(),
        })
    }

    /// Exchange a `Bearer` challenge for an anonymous token.
    fn fetch_token(&self, challenge: &BearerChallenge) -> Result<String, RegistryError> {
        tracing::debug!(realm = %challenge.realm, "requesting anonymous registry token");
        let response = self
            .client
            .get(&challenge.realm)
            .query(&challenge.params)
            .send()
            .map_err(|e| RegistryError::Transient {
                message: e.to_string(),
            })?;
        let status = response.status();
        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            return Err(RegistryError::Transient {
                message: format!("{} returned {status}", challenge.realm),
            });
        }
        if !status.is_success() {
            return Err(RegistryError::InvalidResponse {
                message: format!("{} returned {status}", challenge.realm),
            });
        }
        let body: TokenResponse = response.json().map_err(|e| RegistryError::InvalidResponse {
            message: e.to_string(),
        })?;
        body.token
            .or(body.access_token)
            .ok_or_else(|| RegistryError::InvalidResponse {
                message: format!("{} returned no token", challenge.realm),
            })
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: Option<String>,
    access_token: Option<String>,
}

/// A parsed `WWW-Authenticate: Bearer realm="..",service="..",scope=".."` header.
#[derive(Debug, PartialEq, Eq)]
struct BearerChallenge {
    realm: String,
    /// Every other parameter, passed through as query arguments.
    params: Vec<(String, String)>,
}

fn parse_bearer_challenge(header: &str) -> Option<BearerChallenge> {
    let (scheme, rest) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let mut realm = None;
    let mut params = Vec::new();
    let mut rest = rest.trim_start();
    while !rest.is_empty() {
        let (key, after) = rest.split_once('=')?;
        let key = key.trim().to_ascii_lowercase();
        let (value, remainder) = match after.strip_prefix('"') {
            Some(quoted) => {
                let end = quoted.find('"')?;
                (&quoted[..end], &quoted[end + 1..])
            }
            None => match after.find(',') {
                Some(end) => (&after[..end], &after[end..]),
                None => (after, ""),
            },
        };
        if key == "realm" {
            realm = Some(value.to_string());
        } else {
            params.push((key, value.to_string()));
        }
        rest = remainder.trim_start().trim_start_matches(',').trim_start();
    }

    Some(BearerChallenge { realm: realm?, params })
}

/// Split `mcr.microsoft.com/dotnet/sdk` into host and repository path.
fn split_image(image: &str) -> (&str, String) {
    match image.split_once('/') {
        Some((host, rest)) if host.contains('.') || host.contains(':') || host == "localhost" => {
            (host, rest.to_string())
        }
        Some(_) => ("registry-1.docker.io", image.to_string()),
        None => ("registry-1.docker.io", format!("library/{image}")),
    }
}

impl ContainerRegistry for HttpContainerRegistry {
    fn resolve_digest(
        &self,
        image: &str,
        tag: &str,
        cancel: &CancellationToken,
    ) -> Result<String, RegistryError> {
        if cancel.is_cancelled() {
            return Err(RegistryError::Cancelled);
        }
        let (host, repository) = split_image(image);
        let url = format!("https://{host}/v2/{repository}/manifests/{tag}");
        tracing::debug!(url = %url, "resolving image digest");

        let mut response = self.head_manifest(&url, None)?;
        if response.status() == StatusCode::UNAUTHORIZED {
            let challenge = response
                .headers()
                .get(WWW_AUTHENTICATE)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_bearer_challenge);
            if let Some(challenge) = challenge {
                if cancel.is_cancelled() {
                    return Err(RegistryError::Cancelled);
                }
                let token = self.fetch_token(&challenge)?;
                response = self.head_manifest(&url, Some(&token))?;
            }
        }

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(RegistryError::NotFound {
                name: image.to_string(),
                reference: tag.to_string(),
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

        response
            .headers()
            .get(DIGEST_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|d| d.starts_with("sha256:"))
            .map(str::to_string)
            .ok_or_else(|| RegistryError::InvalidResponse {
                message: format!("{url} returned no {DIGEST_HEADER} header"),
            })
    }
}

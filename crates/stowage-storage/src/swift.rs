//! Minimal OpenStack Swift client for Rackspace Cloud Files.
//!
//! Authenticates with the v1.0 `X-Auth-User` / `X-Auth-Key` exchange and
//! issues plain REST object requests with reqwest.

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Client, StatusCode, Url};
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::debug;

use crate::cloudfiles::{ConnectionRequest, Connector, ObjectStore};

/// Rackspace's US authentication endpoint.
pub const DEFAULT_AUTH_URL: &str = "https://auth.api.rackspacecloud.com/v1.0";

const AUTH_USER: &str = "X-Auth-User";
const AUTH_KEY: &str = "X-Auth-Key";
const AUTH_TOKEN: &str = "X-Auth-Token";
const STORAGE_URL: &str = "X-Storage-Url";

#[derive(Debug, thiserror::Error)]
pub enum SwiftError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Authentication response is missing the {0} header")]
    MissingHeader(&'static str),
    #[error("Object not found: {0}")]
    NotFound(String),
    #[error("Unexpected status {status} from {operation}")]
    UnexpectedStatus { operation: &'static str, status: u16 },
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Creates authenticated [`SwiftConnection`]s.
#[derive(Debug, Clone, Default)]
pub struct SwiftConnector {
    client: Client,
}

impl SwiftConnector {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Exchange username and API key for a storage URL and auth token.
    pub async fn authenticate(
        &self,
        request: &ConnectionRequest,
    ) -> Result<SwiftConnection, SwiftError> {
        let auth_url = request
            .auth_url
            .as_deref()
            .unwrap_or(DEFAULT_AUTH_URL)
            .trim_end_matches('/');
        debug!(provider = request.provider, auth_url, "authenticating");

        let resp = self
            .client
            .get(auth_url)
            .header(AUTH_USER, &request.username)
            .header(AUTH_KEY, &request.api_key)
            .send()
            .await?;

        match resp.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(SwiftError::Unauthorized(format!(
                    "user '{}'",
                    request.username
                )));
            }
            status if !status.is_success() => {
                return Err(SwiftError::UnexpectedStatus {
                    operation: "authenticate",
                    status: status.as_u16(),
                });
            }
            _ => {}
        }

        let header = |name: &'static str| {
            resp.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
                .ok_or(SwiftError::MissingHeader(name))
        };
        let auth_token = header(AUTH_TOKEN)?;
        let mut storage_url = header(STORAGE_URL)?;

        if request.servicenet {
            storage_url = servicenet_url(&storage_url)?;
        }

        Ok(SwiftConnection {
            client: self.client.clone(),
            storage_url: storage_url.trim_end_matches('/').to_string(),
            auth_token,
        })
    }
}

#[async_trait]
impl Connector for SwiftConnector {
    async fn connect(&self, request: &ConnectionRequest) -> anyhow::Result<Box<dyn ObjectStore>> {
        Ok(Box::new(self.authenticate(request).await?))
    }
}

/// Rewrite a storage URL to its ServiceNet host (`snet-` prefix).
pub fn servicenet_url(storage_url: &str) -> Result<String, SwiftError> {
    let invalid = |reason: String| SwiftError::InvalidUrl {
        url: storage_url.to_string(),
        reason,
    };

    let mut url = Url::parse(storage_url).map_err(|e| invalid(e.to_string()))?;
    let host = url
        .host_str()
        .ok_or_else(|| invalid("no host".to_string()))?
        .to_string();
    url.set_host(Some(&format!("snet-{host}")))
        .map_err(|e| invalid(e.to_string()))?;
    Ok(url.to_string().trim_end_matches('/').to_string())
}

/// An authenticated session against one Swift account.
#[derive(Debug, Clone)]
pub struct SwiftConnection {
    client: Client,
    storage_url: String,
    auth_token: String,
}

impl SwiftConnection {
    pub fn storage_url(&self) -> &str {
        &self.storage_url
    }

    fn object_url(&self, container: &str, object: &str) -> String {
        let object = object
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        format!(
            "{}/{}/{}",
            self.storage_url,
            urlencoding::encode(container),
            object
        )
    }

    /// Stream `file` into `container/object`, attaching `headers`. Only `201 Created` counts as stored.
    pub async fn put_object(
        &self,
        container: &str,
        object: &str,
        file: File,
        headers: &BTreeMap<String, String>,
    ) -> Result<(), SwiftError> {
        let len = file.metadata().await?.len();
        let content_type = mime_guess::from_path(object).first_or_octet_stream();
        let url = self.object_url(container, object);
        debug!(%url, len, "PUT object");

        let mut req = self
            .client
            .put(&url)
            .header(AUTH_TOKEN, &self.auth_token)
            .header(CONTENT_LENGTH, len)
            .header(CONTENT_TYPE, content_type.as_ref());
        for (name, value) in headers {
            req = req.header(name.as_str(), value.as_str());
        }

        let resp = req
            .body(reqwest::Body::wrap_stream(ReaderStream::new(file)))
            .send()
            .await?;

        match resp.status() {
            StatusCode::CREATED => Ok(()),
            StatusCode::UNAUTHORIZED => {
                Err(SwiftError::Unauthorized(format!("{container}/{object}")))
            }
            StatusCode::NOT_FOUND => Err(SwiftError::NotFound(format!("{container}/{object}"))),
            status => Err(SwiftError::UnexpectedStatus {
                operation: "put_object",
                status: status.as_u16(),
            }),
        }
    }

    /// Delete `container/object`.
    pub async fn delete_object(&self, container: &str, object: &str) -> Result<(), SwiftError> {
        let url = self.object_url(container, object);
        debug!(%url, "DELETE object");

        let resp = self
            .client
            .delete(&url)
            .header(AUTH_TOKEN, &self.auth_token)
            .send()
            .await?;

        match resp.status() {
            status if status.is_success() => Ok(()),
            StatusCode::UNAUTHORIZED => {
                Err(SwiftError::Unauthorized(format!("{container}/{object}")))
            }
            StatusCode::NOT_FOUND => Err(SwiftError::NotFound(format!("{container}/{object}"))),
            status => Err(SwiftError::UnexpectedStatus {
                operation: "delete_object",
                status: status.as_u16(),
            }),
        }
    }
}

#[async_trait]
impl ObjectStore for SwiftConnection {
    async fn put_object(
        &self,
        container: &str,
        object: &str,
        file: File,
        headers: &BTreeMap<String, String>,
    ) -> anyhow::Result<()> {
        Ok(SwiftConnection::put_object(self, container, object, file, headers).await?)
    }

    async fn delete_object(&self, container: &str, object: &str) -> anyhow::Result<()> {
        Ok(SwiftConnection::delete_object(self, container, object).await?)
    }
}

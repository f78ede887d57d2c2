use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use stowage_core::Package;
use stowage_core::config::CloudFilesConfig;
use tokio::fs::File;
use tokio::sync::OnceCell;
use tracing::info;

use crate::provider::{Storage, storage_name};
use crate::swift::SwiftConnector;

/// Provider identifier handed to the connector.
pub const PROVIDER: &str = "Rackspace";

/// Parameters used to open a connection to the object store.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionRequest {
    pub provider: &'static str,
    pub username: String,
    pub api_key: String,
    pub auth_url: Option<String>,
    pub servicenet: bool,
}

impl fmt::Debug for ConnectionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionRequest")
            .field("provider", &self.provider)
            .field("username", &self.username)
            .field("api_key", &"[REDACTED]")
            .field("auth_url", &self.auth_url)
            .field("servicenet", &self.servicenet)
            .finish()
    }
}

/// An authenticated object store session.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload the whole of `file` as `container/object` with extra `headers`.
    async fn put_object(
        &self,
        container: &str,
        object: &str,
        file: File,
        headers: &BTreeMap<String, String>,
    ) -> anyhow::Result<()>;

    /// Delete `container/object`.
    async fn delete_object(&self, container: &str, object: &str) -> anyhow::Result<()>;
}

/// Opens [`ObjectStore`] sessions.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, request: &ConnectionRequest) -> anyhow::Result<Box<dyn ObjectStore>>;
}

/// Rackspace Cloud Files storage.
///
/// The connection is opened on first use and reused for the lifetime of the
/// storage. One instance must not run `transfer`/`remove` concurrently.
pub struct CloudFilesStorage<C = SwiftConnector> {
    config: CloudFilesConfig,
    local_path: PathBuf,
    connector: C,
    connection: OnceCell<Box<dyn ObjectStore>>,
    name: String,
}

impl CloudFilesStorage<SwiftConnector> {
    /// Create a storage reading package files from `local_path`.
    pub fn new(config: CloudFilesConfig, local_path: &Path) -> Self {
        Self::with_connector(config, local_path, SwiftConnector::default())
    }
}

impl<C: Connector> CloudFilesStorage<C> {
    pub fn with_connector(config: CloudFilesConfig, local_path: &Path, connector: C) -> Self {
        let name = storage_name("CloudFiles", config.id.as_deref());
        Self {
            config,
            local_path: local_path.to_path_buf(),
            connector,
            connection: OnceCell::new(),
            name,
        }
    }

    pub fn config(&self) -> &CloudFilesConfig {
        &self.config
    }

    pub fn connection_request(&self) -> ConnectionRequest {
        ConnectionRequest {
            provider: PROVIDER,
            username: self.config.username.clone(),
            api_key: self.config.api_key.clone(),
            auth_url: self.config.auth_url.clone(),
            servicenet: self.config.servicenet,
        }
    }

    /// The memoized connection, opened on the first call.
    pub async fn connection(&self) -> anyhow::Result<&dyn ObjectStore> {
        let conn = self
            .connection
            .get_or_try_init(|| async {
                self.connector.connect(&self.connection_request()).await
            })
            .await?;
        Ok(&**conn)
    }

    /// `additional_metadata` as object headers. A repeated name keeps the last value.
    pub fn user_metadata(&self) -> BTreeMap<String, String> {
        self.config
            .additional_metadata
            .iter()
            .map(|(name, value)| (name.clone(), value.to_string()))
            .collect()
    }
}

#[async_trait]
impl<C: Connector> Storage for CloudFilesStorage<C> {
    async fn transfer(&self, package: &Package) -> anyhow::Result<()> {
        let remote_path = package.remote_path(&self.config.path);
        let connection = self.connection().await?;

        for (local_file, remote_file) in package.files_to_transfer() {
            info!("{} started transferring '{}'.", self.name, local_file);
            let options = self.user_metadata();

            let file = File::open(self.local_path.join(&local_file)).await?;
            connection
                .put_object(
                    &self.config.container,
                    &format!("{remote_path}/{remote_file}"),
                    file,
                    &options,
                )
                .await?;
        }
        Ok(())
    }

    async fn remove(&self, package: &Package) -> anyhow::Result<()> {
        let remote_path = package.remote_path(&self.config.path);
        let connection = self.connection().await?;

        for (local_file, remote_file) in package.transferred_files() {
            info!(
                "{} started removing '{}' from container '{}'.",
                self.name, local_file, self.config.container
            );
            connection
                .delete_object(&self.config.container, &format!("{remote_path}/{remote_file}"))
                .await?;
        }
        Ok(())
    }

    fn storage_name(&self) -> &str {
        &self.name
    }

    fn keep(&self) -> Option<u32> {
        self.config.keep
    }
}

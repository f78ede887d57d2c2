use async_trait::async_trait;
use std::path::{Path, PathBuf};
use stowage_core::Package;
use stowage_core::config::LocalConfig;
use tracing::info;

use crate::provider::{Storage, storage_name};

/// Filesystem directory storage, e.g. a mounted NAS share.
pub struct LocalStorage {
    base_path: PathBuf,
    local_path: PathBuf,
    keep: Option<u32>,
    name: String,
}

impl LocalStorage {
    /// The target directory is only created on the first `transfer`.
    pub fn new(config: &LocalConfig, local_path: &Path) -> Self {
        Self {
            base_path: PathBuf::from(&config.path),
            local_path: local_path.to_path_buf(),
            keep: config.keep,
            name: storage_name("Local", config.id.as_deref()),
        }
    }

    fn package_dir(&self, package: &Package) -> PathBuf {
        self.base_path.join(package.remote_path(""))
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn transfer(&self, package: &Package) -> anyhow::Result<()> {
        let dest = self.package_dir(package);
        std::fs::create_dir_all(&dest)?;

        for (local_file, remote_file) in package.files_to_transfer() {
            info!("{} started transferring '{}'.", self.name, local_file);
            std::fs::copy(self.local_path.join(&local_file), dest.join(&remote_file))?;
        }
        Ok(())
    }

    async fn remove(&self, package: &Package) -> anyhow::Result<()> {
        let dir = self.package_dir(package);

        for (local_file, remote_file) in package.transferred_files() {
            info!(
                "{} started removing '{}' from '{}'.",
                self.name,
                local_file,
                self.base_path.display()
            );
            std::fs::remove_file(dir.join(&remote_file))?;
        }

        if std::fs::read_dir(&dir)?.next().is_none() {
            std::fs::remove_dir(&dir)?;
        }
        Ok(())
    }

    fn storage_name(&self) -> &str {
        &self.name
    }

    fn keep(&self) -> Option<u32> {
        self.keep
    }
}

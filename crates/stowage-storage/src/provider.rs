use async_trait::async_trait;
use stowage_core::Package;

/// Trait for backup package storage backends.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Upload every file of `package`, in order. Stops at the first failure.
    async fn transfer(&self, package: &Package) -> anyhow::Result<()>;

    /// Delete the files a previous `transfer` stored for `package`.
    ///
    /// Errors are returned as-is. Retention cycling is expected to log them
    /// and carry on with the next package.
    async fn remove(&self, package: &Package) -> anyhow::Result<()>;

    /// Display name used in log messages, e.g. `Storage::CloudFiles (primary)`.
    fn storage_name(&self) -> &str;

    /// Number of packages to retain, if cycling is enabled.
    fn keep(&self) -> Option<u32>;
}

/// `Storage::<kind>`, with ` (<id>)` appended when a storage id is set.
pub fn storage_name(kind: &str, storage_id: Option<&str>) -> String {
    match storage_id {
        Some(id) => format!("Storage::{kind} ({id})"),
        None => format!("Storage::{kind}"),
    }
}

//! Retention cycling: keep the newest `keep` packages per storage.
//!
//! Each storage has a JSON ledger of the packages it holds, newest first,
//! under `<data_path>/<trigger>/`.

use std::path::{Path, PathBuf};

use stowage_core::Package;
use tracing::{info, warn};

use crate::provider::Storage;

/// Outcome of one cycling pass.
#[derive(Debug, Default)]
pub struct CycleReport {
    pub removed: Vec<Package>,
    pub failed: Vec<Package>,
}

pub struct Cycler {
    data_path: PathBuf,
}

impl Cycler {
    pub fn new(data_path: &Path) -> Self {
        Self {
            data_path: data_path.to_path_buf(),
        }
    }

    fn ledger_path(&self, storage: &dyn Storage, trigger: &str) -> PathBuf {
        self.data_path
            .join(trigger)
            .join(format!("{}.json", ledger_name(storage.storage_name())))
    }

    /// Packages currently recorded for `storage`, newest first.
    pub fn packages(&self, storage: &dyn Storage, trigger: &str) -> anyhow::Result<Vec<Package>> {
        load(&self.ledger_path(storage, trigger))
    }

    /// Record `package` and remove whatever falls beyond `storage.keep()`.
    ///
    /// Removal failures are logged and reported, never returned; the ledger
    /// drops those packages either way.
    pub async fn cycle(
        &self,
        storage: &dyn Storage,
        package: &Package,
    ) -> anyhow::Result<CycleReport> {
        let mut report = CycleReport::default();
        let keep = match storage.keep() {
            Some(keep) if keep > 0 => keep as usize,
            _ => return Ok(report),
        };

        info!("{}: Cycling Started...", storage.storage_name());

        let path = self.ledger_path(storage, &package.trigger);
        let mut packages = load(&path)?;
        packages.insert(0, package.clone());
        let excess = if packages.len() > keep {
            packages.split_off(keep)
        } else {
            Vec::new()
        };

        for old in excess {
            match storage.remove(&old).await {
                Ok(()) => report.removed.push(old),
                Err(e) => {
                    warn!(
                        "{}: There was a problem removing the following package:\n  \
                         Trigger: {} :: Dated: {}\n  \
                         Package included the following {} file(s):\n  {}\n  \
                         Error: {:#}",
                        storage.storage_name(),
                        old.trigger,
                        old.time,
                        old.filenames().len(),
                        old.filenames().join("\n  "),
                        e
                    );
                    report.failed.push(old);
                }
            }
        }

        save(&path, &packages)?;
        Ok(report)
    }
}

/// `Storage::CloudFiles (primary)` -> `CloudFiles-primary`
fn ledger_name(storage_name: &str) -> String {
    let name = storage_name.trim_start_matches("Storage::");
    let name = match name.split_once(" (") {
        Some((kind, id)) => format!("{kind}-{}", id.trim_end_matches(')')),
        None => name.to_string(),
    };
    name.replace(['/', '\\', ':', ' '], "_")
}

fn load(path: &Path) -> anyhow::Result<Vec<Package>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn save(path: &Path, packages: &[Package]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(packages)?)?;
    Ok(())
}

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, StowageError};

/// Timestamp format used for `Package::time` and remote path segments.
pub const TIME_FORMAT: &str = "%Y.%m.%d.%H.%M.%S";

/// The files produced by one backup run.
///
/// A package is a single `<trigger>.<extension>` file, or a series of
/// `<trigger>.<extension>-<suffix>` files when the archive was split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub trigger: String,
    pub time: String,
    pub extension: String,
    #[serde(default)]
    pub chunk_suffixes: Vec<String>,
}

impl Package {
    /// New package stamped with the current local time.
    pub fn new(trigger: &str, extension: &str) -> Self {
        Self {
            trigger: trigger.to_string(),
            time: chrono::Local::now().format(TIME_FORMAT).to_string(),
            extension: extension.to_string(),
            chunk_suffixes: Vec::new(),
        }
    }

    pub fn with_chunk_suffixes(mut self, suffixes: Vec<String>) -> Self {
        self.chunk_suffixes = suffixes;
        self
    }

    /// `<trigger>.<extension>`
    pub fn basename(&self) -> String {
        format!("{}.{}", self.trigger, self.extension)
    }

    /// File names making up this package, in upload order.
    pub fn filenames(&self) -> Vec<String> {
        let basename = self.basename();
        if self.chunk_suffixes.is_empty() {
            vec![basename]
        } else {
            self.chunk_suffixes
                .iter()
                .map(|suffix| format!("{basename}-{suffix}"))
                .collect()
        }
    }

    /// `(local_file, remote_file)` pairs to upload.
    pub fn files_to_transfer(&self) -> Vec<(String, String)> {
        self.filenames()
            .into_iter()
            .map(|f| (f.clone(), f))
            .collect()
    }

    /// `(local_file, remote_file)` pairs a previous transfer stored remotely.
    pub fn transferred_files(&self) -> Vec<(String, String)> {
        self.files_to_transfer()
    }

    /// Remote directory for this package: `<base>/<trigger>/<time>`.
    pub fn remote_path(&self, base: &str) -> String {
        let base = base.trim_end_matches('/');
        if base.is_empty() {
            format!("{}/{}", self.trigger, self.time)
        } else {
            format!("{}/{}/{}", base, self.trigger, self.time)
        }
    }

    /// Fail unless every package file exists under `local_path`.
    pub fn ensure_local_files(&self, local_path: &Path) -> Result<()> {
        for (local_file, _) in self.files_to_transfer() {
            let path = local_path.join(&local_file);
            if !path.is_file() {
                return Err(StowageError::MissingPackageFile(path.display().to_string()));
            }
        }
        Ok(())
    }
}

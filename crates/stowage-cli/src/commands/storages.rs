use std::path::Path;

use stowage_core::config::{StorageConfig, StowageConfig};
use stowage_storage::cloudfiles::CloudFilesStorage;
use stowage_storage::local::LocalStorage;
use stowage_storage::provider::Storage;

/// Build every configured storage. Nothing connects until first use.
pub fn init_storages(config: &StowageConfig) -> Vec<Box<dyn Storage>> {
    let local_path = Path::new(&config.stowage.tmp_path);

    config
        .storages
        .iter()
        .map(|sc| -> Box<dyn Storage> {
            match sc {
                StorageConfig::CloudFiles(cf) => {
                    Box::new(CloudFilesStorage::new(cf.clone(), local_path))
                }
                StorageConfig::Local(local) => Box::new(LocalStorage::new(local, local_path)),
            }
        })
        .collect()
}

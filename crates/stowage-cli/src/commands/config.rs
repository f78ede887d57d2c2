use anyhow::Result;
use std::path::Path;

use stowage_core::config::{StorageConfig, StowageConfig};

pub fn run(base_dir: &Path) -> Result<()> {
    let config_path = StowageConfig::default_path(base_dir);
    let config = StowageConfig::load(&config_path)?;

    println!("Config: {}", config_path.display());
    println!();
    println!("  Tmp path:   {}", config.stowage.tmp_path);
    println!("  Data path:  {}", config.stowage.data_path);
    println!();

    if config.storages.is_empty() {
        println!("  No storages configured.");
        println!();
        println!("  Add storages to {}:", config_path.display());
        println!("  [[storages]]");
        println!("  type = \"cloudfiles\"    # or \"local\"");
        println!("  username = \"my_username\"");
        println!("  api_key = \"my_api_key\"");
        println!("  container = \"my_backups\"");
        println!("  keep = 5");
        return Ok(());
    }

    println!("  Storages ({}):", config.storages.len());
    for storage in &config.storages {
        let keep = storage
            .keep()
            .map(|k| k.to_string())
            .unwrap_or_else(|| "all".to_string());
        let id = storage.id().unwrap_or("-");
        match storage {
            StorageConfig::CloudFiles(cf) => println!(
                "    - {} (type=cloudfiles, container={}, path={}, servicenet={}, metadata={}, keep={})",
                id,
                cf.container,
                cf.path,
                cf.servicenet,
                cf.additional_metadata.len(),
                keep
            ),
            StorageConfig::Local(local) => println!(
                "    - {} (type=local, path={}, keep={})",
                id, local.path, keep
            ),
        }
    }

    Ok(())
}

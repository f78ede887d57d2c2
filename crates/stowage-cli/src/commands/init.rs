use anyhow::Result;
use std::path::Path;

use stowage_core::config::StowageConfig;

pub fn run(base_dir: &Path) -> Result<()> {
    println!("Initializing stowage in {}", base_dir.display());
    std::fs::create_dir_all(base_dir)?;

    let config_path = StowageConfig::default_path(base_dir);
    if config_path.exists() {
        println!("Config already exists at {}", config_path.display());
    } else {
        let config = StowageConfig::default_config(base_dir);
        config.save(&config_path)?;
        std::fs::create_dir_all(&config.stowage.tmp_path)?;
        std::fs::create_dir_all(&config.stowage.data_path)?;
        println!("Created config: {}", config_path.display());
    }

    println!("\nNext steps:");
    println!("  1. Add storages to {}", config_path.display());
    println!("  2. Run `stowage store <trigger>` once a package is in the tmp path");

    Ok(())
}

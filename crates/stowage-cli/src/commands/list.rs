use anyhow::Result;
use std::path::Path;

use stowage_core::config::StowageConfig;
use stowage_storage::cycler::Cycler;

use super::storages::init_storages;

pub fn run(trigger: &str, base_dir: &Path) -> Result<()> {
    let config_path = StowageConfig::default_path(base_dir);
    let config = StowageConfig::load(&config_path)?;
    let storages = init_storages(&config);
    let cycler = Cycler::new(Path::new(&config.stowage.data_path));

    for storage in &storages {
        let packages = cycler.packages(&**storage, trigger)?;
        println!("{} ({} packages)", storage.storage_name(), packages.len());
        for p in &packages {
            println!("  {:<22} {}", p.time, p.filenames().join(", "));
        }
    }

    Ok(())
}

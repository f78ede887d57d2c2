use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

use stowage_core::Package;
use stowage_core::config::StowageConfig;
use stowage_storage::cycler::Cycler;

use super::storages::init_storages;

pub async fn run(
    trigger: &str,
    extension: &str,
    chunk_suffixes: &[String],
    base_dir: &Path,
) -> Result<()> {
    let config_path = StowageConfig::default_path(base_dir);
    let config = StowageConfig::load(&config_path)?;

    if config.storages.is_empty() {
        anyhow::bail!("No storages configured in {}", config_path.display());
    }

    let package = Package::new(trigger, extension).with_chunk_suffixes(chunk_suffixes.to_vec());
    let local_path = Path::new(&config.stowage.tmp_path);
    package.ensure_local_files(local_path)?;
    println!(
        "Storing {} ({} file(s)) dated {}",
        package.basename(),
        package.filenames().len(),
        package.time
    );

    let storages = init_storages(&config);
    let cycler = Cycler::new(Path::new(&config.stowage.data_path));

    let pb = ProgressBar::new(storages.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );

    let mut failures = 0usize;
    for storage in &storages {
        pb.set_message(storage.storage_name().to_string());

        if let Err(e) = storage.transfer(&package).await {
            pb.println(format!("FAILED {}: {e:#}", storage.storage_name()));
            failures += 1;
            pb.inc(1);
            continue;
        }

        let report = match cycler.cycle(&**storage, &package).await {
            Ok(report) => report,
            Err(e) => {
                pb.println(format!("FAILED {}: cycling: {e:#}", storage.storage_name()));
                failures += 1;
                pb.inc(1);
                continue;
            }
        };
        pb.println(format!(
            "OK {}: cycled out {} package(s), {} removal failure(s)",
            storage.storage_name(),
            report.removed.len(),
            report.failed.len()
        ));
        pb.inc(1);
    }

    pb.finish_with_message("done");

    if failures > 0 {
        anyhow::bail!("{failures} of {} storage(s) failed", storages.len());
    }
    Ok(())
}

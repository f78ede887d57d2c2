mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "stowage")]
#[command(about = "Ship backup packages to Cloud Files and cycle old ones")]
#[command(version)]
struct Cli {
    /// Path to the stowage config directory (default: ~/.stowage)
    #[arg(long, global = true, env = "STOWAGE_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init,

    /// Show current configuration
    Config,

    /// Transfer a package to every configured storage, then cycle
    Store {
        /// Backup trigger (model name) the package belongs to
        trigger: String,
        /// Package file extension, e.g. `tar` or `tar.gz.enc`
        #[arg(long, default_value = "tar")]
        extension: String,
        /// Split-archive suffixes, in order (`--chunk-suffix aa --chunk-suffix ab`)
        #[arg(long = "chunk-suffix")]
        chunk_suffixes: Vec<String>,
    },

    /// List the packages each storage is retaining for a trigger
    List {
        trigger: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("stowage=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let base_dir = match cli.config_dir {
        Some(ref dir) => dir.clone(),
        None => stowage_core::config::StowageConfig::default_base_dir()?,
    };

    let rt = tokio::runtime::Runtime::new()?;

    match cli.command {
        Commands::Init => commands::init::run(&base_dir),
        Commands::Config => commands::config::run(&base_dir),
        Commands::Store {
            ref trigger,
            ref extension,
            ref chunk_suffixes,
        } => rt.block_on(commands::store::run(
            trigger,
            extension,
            chunk_suffixes,
            &base_dir,
        )),
        Commands::List { ref trigger } => commands::list::run(trigger, &base_dir),
    }
}

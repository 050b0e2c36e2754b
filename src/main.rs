//! Ingress router daemon.
//!
//! # Architecture Overview
//!
//! ```text
//!   rules/*.toml ──▶ RulesWatcher ──▶ ChangeEvent ──▶ TableReconciler
//!                                                        │
//!                  FileRuleStore ◀── list_rule_sets ─────┤
//!                                                        ▼
//!                                              build (classify, resolve)
//!                                                        │
//!                                                        ▼
//!   proxy / admin API ──▶ TableHandle::route ◀── publish (ArcSwap)
//! ```

use std::path::PathBuf;

use clap::Parser;

use ingress_router::config::{load_config, RouterConfig};
use ingress_router::lifecycle::startup;
use ingress_router::observability::logging;

#[derive(Parser)]
#[command(name = "ingress-router")]
#[command(about = "Resolves (host, path) to a backend from multi-author routing rules", long_about = None)]
struct Args {
    /// Path to the TOML config file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the rules directory from the config file.
    #[arg(long)]
    rules_dir: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => RouterConfig::default(),
    };
    if let Some(dir) = args.rules_dir {
        config.rules.directory = dir;
    }

    logging::init(&config.observability)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        rules_directory = %config.rules.directory,
        watch = config.rules.watch,
        admin_address = %config.listener.bind_address,
        "ingress-router starting"
    );

    startup::run(config).await?;
    Ok(())
}

use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::Parser;
use server::{
    config::Config,
    database::RedisUserStore,
    logging::{init_logging, with_startup_logging},
    start_server,
    users::{MemoryUserStore, UserStore},
};
use tracing::{error, warn};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Listen port, overrides PORT
    #[arg(long)]
    port: Option<u16>,

    /// Structured log file, overrides LOG_FILE
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Keep users in process memory instead of Redis
    #[arg(long)]
    in_memory: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = with_startup_logging(Config::load)?;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(log_file) = args.log_file {
        config.log_file = log_file;
    }

    let _guard = init_logging(&config.log_file)?;

    let store: Arc<dyn UserStore> = if args.in_memory {
        warn!("Using the in-memory user store, data is lost on exit");
        Arc::new(MemoryUserStore::new())
    } else {
        match RedisUserStore::connect(&config.redis_url).await {
            Ok(store) => Arc::new(store),
            Err(e) => {
                error!(error = %e, "Error connecting to the database");
                return Err(e.into());
            }
        }
    };

    start_server(config, store).await
}

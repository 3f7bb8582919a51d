//! PID Minter Service Entry Point
//!
//! Loads configuration, builds the Tokio runtime with the configured number
//! of worker threads, and runs the service.

use pid_minter::config::AppConfig;
use pid_minter::run;

fn main() -> anyhow::Result<()> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    let config = AppConfig::load()?;

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    if config.server.workers > 0 {
        builder.worker_threads(config.server.workers);
    }
    let runtime = builder.enable_all().build()?;

    runtime.block_on(run(config))
}

//! Mock CMS backend binary
//!
//! Serves the in-memory backend with a demo data set so the CLI can be tried
//! without a real CMS:
//!
//!   test-harness --port 5000
//!   corpsite login --email admin@corpsite.test --password password

use anyhow::Result;
use clap::Parser;
use corpsite_core::logging::{init_logging_with_config, LogConfig, LogLevel};
use corpsite_core::test_harness::{MockServer, MockState};
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "test-harness")]
#[command(about = "In-memory Corpsite CMS backend", long_about = None)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "5000")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Start with no accounts or records
    #[arg(long)]
    empty: bool,

    /// Set the log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: LogLevel,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging_with_config(LogConfig::new(args.log_level))?;

    let state = if args.empty {
        MockState::new()
    } else {
        info!("seeded demo data, log in as admin@corpsite.test / password");
        MockState::demo()
    };

    MockServer::new(Arc::new(state), format!("{}:{}", args.host, args.port))
        .run()
        .await
}

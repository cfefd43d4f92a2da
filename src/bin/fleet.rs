use clap::Parser;
use tracing_subscriber::EnvFilter;

use fleet_registry::cli::{run, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let code = run(cli).await;
    std::process::exit(code);
}

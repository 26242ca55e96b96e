use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "kaizen",
    about = "PDCA workflow MCP server — tracks features through plan/design/do/check/act/report over stdio",
    version
)]
struct Cli {
    /// Bind a project root at startup instead of waiting for kaizen_init
    #[arg(long, env = "KAIZEN_ROOT")]
    root: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Diagnostics go to stderr; stdout belongs to the protocol.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = kaizen_mcp::server::run(cli.root).await {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

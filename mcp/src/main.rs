use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use ads_mcp_runtime::{McpCommands, run};

#[derive(Parser)]
#[command(
    name = "ads-mcp",
    version,
    about = "MCP server exposing GAQL search and resource field discovery over stdio"
)]
struct Cli {
    #[command(subcommand)]
    command: McpCommands,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let _ = dotenvy::dotenv();

    // stdout carries protocol frames; logs go to stderr.
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "ads_mcp=info,ads_mcp_runtime=info,ads_core=info".into()
            }),
        )
        .with(fmt::layer().json().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let code = run(cli.command).await;
    std::process::exit(code);
}

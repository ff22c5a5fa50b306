use clap::Parser;
use guidance_search::cli::{Cli, run};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    guidance_search::tracing::init(cli.log_format);
    run(cli).await
}

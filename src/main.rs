use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use release_sentinel::config::SentinelConfig;
use release_sentinel::runner::Sentinel;

#[derive(Parser)]
#[command(name = "release-sentinel")]
#[command(
    version,
    about = "Tracks artifact releases and keeps the build-matrix ledger up to date"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(long, default_value = "sentinel.yml")]
    config: PathBuf,

    /// Open a pull request when the ledger needs changes
    #[arg(long)]
    open_pr: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = SentinelConfig::load(&cli.config)?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async move {
            let sentinel = Sentinel::new(config);
            let report = sentinel.run(cli.open_pr).await?;
            println!("{}", report.render());
            Ok(())
        })
}

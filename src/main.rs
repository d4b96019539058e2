use clap::Parser;
use wprouter::cli::{run_cli, Cli};
use wprouter::logging::{init_logging, LogConfig};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&LogConfig::from_env())?;
    run_cli(cli)
}

use clap::Parser;
use plysplat_tools::{run, Cli};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    run(&cli, &mut std::io::stdout().lock())
}

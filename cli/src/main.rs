use clap::Parser;
use pbxforge_cli::Cli;
use pbxforge_cli::logging::init_logging;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;
    pbxforge_cli::run(cli)
}

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = envsync::cli::Cli::parse();
    envsync::util::logging::init(cli.verbose);
    cli.run()
}

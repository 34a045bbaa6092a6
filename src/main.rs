use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = clawpress::cli::Cli::parse();
    clawpress::util::logging::init(cli.verbose);
    cli.run()
}

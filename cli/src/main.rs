mod cli;
mod commands;

use cli::{Cli, Commands};

pub fn run() -> anyhow::Result<()> {
    use clap::Parser;

    let cli = Cli::parse();
    match &cli.command {
        Commands::Markers(args) => commands::markers::run(&cli, args),
        Commands::District(args) => commands::district::run(&cli, args),
    }
}

fn main() -> anyhow::Result<()> { run() }

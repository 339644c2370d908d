//! `bcf`, a command-line front end for building BCF containers.

use clap::Parser;

mod cli;

fn main() -> anyhow::Result<()> {
    cli::Cli::parse().run()
}

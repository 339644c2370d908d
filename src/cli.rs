use std::path::{Path, PathBuf};

mod build;
mod init;
mod input;
mod terminal;
mod validate;

use bcfkit::Config;
use clap::ArgAction;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to the configuration file
    #[arg(short, long, default_value = "bcf.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);
        self.command.run(&self.config)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(verbosity > 1)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Build a BCF container from a topics file
    Build(build::Command),

    /// Check a topics file without building anything
    Validate(validate::Command),

    /// Write a default configuration file
    Init(init::Command),
}

impl Command {
    fn run(self, config_path: &Path) -> anyhow::Result<()> {
        match self {
            Self::Build(command) => command.run(&load_config(config_path)?),
            Self::Validate(command) => command.run(),
            Self::Init(command) => command.run(config_path),
        }
    }
}

fn load_config(path: &Path) -> anyhow::Result<Config> {
    Config::load_or_default(path)
        .map_err(|e| anyhow::anyhow!("Failed to load {}: {e}", path.display()))
}

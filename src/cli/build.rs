use std::{path::PathBuf, time::Duration};

use bcfkit::{Client, Config, DirectorySaver};
use indicatif::ProgressBar;
use tracing::instrument;

use super::{input::TopicFile, terminal::Colorize};

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// Topics file (.json, .yaml or .yml)
    topics: PathBuf,

    /// Header file, replacing any header in the topics file
    #[arg(long, value_name = "FILE")]
    header: Option<PathBuf>,

    /// Directory to save the container into
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    out: PathBuf,
}

impl Command {
    #[instrument(skip(config))]
    pub fn run(self, config: &Config) -> anyhow::Result<()> {
        let mut input = TopicFile::load(&self.topics)?;
        if let Some(header) = &self.header {
            input = input.with_header_from(header)?;
        }
        let count = input.topics.len();

        let client = Client::new(config, DirectorySaver::new(&self.out))?;

        let spinner = ProgressBar::new_spinner();
        spinner.set_message(format!("Building container from {count} topic(s)"));
        spinner.enable_steady_tick(Duration::from_millis(100));
        let result = client.create_container_from_records(input.topics, input.header);
        spinner.finish_and_clear();
        let saved = result?;

        println!(
            "{} {}",
            "Saved".success(),
            saved.path.display().to_string().saved_path()
        );
        println!("  topics: {count}");
        println!("  size:   {} bytes", saved.size);
        println!("  sha256: {}", saved.sha256.digest());
        Ok(())
    }
}

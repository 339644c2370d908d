use std::{collections::HashSet, path::PathBuf};

use bcfkit::{SchemaViolation, Validate};
use serde::Serialize;
use tracing::instrument;

use super::{input::TopicFile, terminal::Colorize};

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// Topics file (.json, .yaml or .yml)
    topics: PathBuf,

    /// Header file, replacing any header in the topics file
    #[arg(long, value_name = "FILE")]
    header: Option<PathBuf>,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// One problem found in the file.
#[derive(Debug, PartialEq, Serialize)]
struct Issue {
    /// Where the problem is, e.g. `topics[1].comments[0]`.
    location: String,
    message: String,
}

impl Issue {
    fn violation(scope: &str, violation: &SchemaViolation) -> Self {
        let location = if violation.path.is_empty() {
            scope.to_string()
        } else {
            format!("{scope}.{}", violation.path)
        };
        Self {
            location,
            message: violation.kind.to_string(),
        }
    }
}

impl Command {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self) -> anyhow::Result<()> {
        let mut input = TopicFile::load(&self.topics)?;
        if let Some(header) = &self.header {
            input = input.with_header_from(header)?;
        }

        let issues = check(&input);
        match self.output {
            OutputFormat::Table => print_table(&issues, input.topics.len()),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&issues)?),
        }

        if !issues.is_empty() {
            anyhow::bail!("{} problem(s) found in {}", issues.len(), self.topics.display());
        }
        Ok(())
    }
}

/// Validates everything in `input`, collecting every problem rather than
/// stopping at the first.
fn check(input: &TopicFile) -> Vec<Issue> {
    let mut issues = Vec::new();

    if let Err(violation) = input.header.validate() {
        issues.push(Issue::violation("header", &violation));
    }

    let mut seen = HashSet::new();
    for (position, record) in input.topics.iter().enumerate() {
        let scope = format!("topics[{position}]");
        match record.validate() {
            Ok(topic) => {
                if !seen.insert(topic.uuid()) {
                    issues.push(Issue {
                        location: format!("{scope}.uuid"),
                        message: format!("uuid {} is used by an earlier topic", topic.uuid()),
                    });
                }
            }
            Err(violation) => issues.push(Issue::violation(&scope, &violation)),
        }
    }

    issues
}

fn print_table(issues: &[Issue], topics: usize) {
    if issues.is_empty() {
        println!("{} {topics} topic(s) are valid", "✓".success());
        return;
    }
    for issue in issues {
        println!("{} {}", issue.location.location(), issue.message);
    }
}

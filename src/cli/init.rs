use std::path::Path;

use bcfkit::Config;
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// Overwrite an existing configuration file
    #[arg(long)]
    force: bool,
}

impl Command {
    #[instrument]
    pub fn run(self, path: &Path) -> anyhow::Result<()> {
        if path.exists() && !self.force {
            anyhow::bail!(
                "{} already exists (use --force to overwrite it)",
                path.display()
            );
        }

        Config::default()
            .save(path)
            .map_err(|e| anyhow::anyhow!("Failed to create {}: {e}", path.display()))?;

        println!("{} {}", "Created".success(), path.display());
        println!();
        println!("Next steps:");
        println!("  bcf build topics.yaml --out dist");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn writes_default_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bcf.toml");

        Command { force: false }.run(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), Config::default());
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bcf.toml");
        std::fs::write(&path, "_version = \"1\"\nextension = \"zip\"\n").unwrap();

        assert!(Command { force: false }.run(&path).is_err());
        assert_eq!(Config::load(&path).unwrap().extension, bcfkit::Extension::Zip);

        Command { force: true }.run(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), Config::default());
    }
}

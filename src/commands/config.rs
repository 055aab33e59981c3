use anyhow::{Context, Result};

use crate::cli::{Cli, ConfigCommand};
use crate::config::Config;

pub fn run(cli: &Cli, config: &Config, cmd: &ConfigCommand) -> Result<()> {
	match cmd {
		ConfigCommand::Show => {
			print!("{}", toml::to_string_pretty(config)?);
			Ok(())
		}
		ConfigCommand::Init { force } => {
			let path = cli.config.clone().unwrap_or_else(Config::path);
			if path.exists() && !force {
				anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
			}
			let written = Config::default()
				.save(Some(&path))
				.with_context(|| format!("failed to write {}", path.display()))?;
			println!("Wrote default config to {}", written.display());
			Ok(())
		}
	}
}

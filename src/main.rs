use anyhow::Result;
use clap::Parser;

use exo_transfer::cli::{Cli, Command, SendArgs};
use exo_transfer::{commands, logging};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
	let cli = Cli::parse();
	logging::init(cli.verbose);

	let config = commands::resolve_config(&cli)?;

	match &cli.command {
		None => commands::send::run(&config, &SendArgs::default()).await,
		Some(Command::Send(args)) => commands::send::run(&config, args).await,
		Some(Command::Balance { account, denom }) => {
			commands::balance::run(&config, account, denom.as_deref()).await
		}
		Some(Command::Account { account }) => commands::account::run(&config, account).await,
		Some(Command::Keys { command }) => commands::keys::run(&config, command),
		Some(Command::Tx { command }) => commands::tx::run(&config, command).await,
		Some(Command::Config { command }) => commands::config::run(&cli, &config, command),
	}
}

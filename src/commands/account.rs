use anyhow::Result;

use crate::commands::{connect, open_keyring, resolve_account};
use crate::config::Config;
use crate::node::AccountQuerier;

pub async fn run(config: &Config, account: &str) -> Result<()> {
	let keys = open_keyring(config)?;
	let address = resolve_account(&keys, config, account)?;

	let node = connect(config).await?;
	let state = node.account(&address).await?;
	println!("Address:        {address}");
	println!("Account number: {}", state.account_number);
	println!("Sequence:       {}", state.sequence);
	Ok(())
}

use anyhow::Result;

use crate::commands::{connect, open_keyring, resolve_account};
use crate::config::Config;
use crate::node::BalanceQuerier;

pub async fn run(config: &Config, account: &str, denom: Option<&str>) -> Result<()> {
	let keys = open_keyring(config)?;
	let address = resolve_account(&keys, config, account)?;
	let denom = denom.unwrap_or(&config.fee.denom);

	let node = connect(config).await?;
	let amount = node.balance(&address, denom).await?;
	println!("Address: {address}");
	println!("Balance: {amount} {denom}");
	Ok(())
}

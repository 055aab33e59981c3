use anyhow::Result;

use crate::cli::TxCommand;
use crate::commands::connect;
use crate::config::Config;
use crate::node::Broadcaster;

pub async fn run(config: &Config, cmd: &TxCommand) -> Result<()> {
	let node = connect(config).await?;

	match cmd {
		TxCommand::Status { tx_hash } => {
			match node.tx_status(tx_hash).await? {
				Some(status) => {
					let outcome = if status.is_success() { "success" } else { "failed" };
					println!("Transaction: {}", status.tx_hash);
					println!("Height:      {}", status.height);
					println!("Result:      {outcome} (code {})", status.code);
					println!("Gas:         {} used / {} wanted", status.gas_used, status.gas_wanted);
					if !status.is_success() {
						println!("Log:         {}", status.raw_log);
					}
				}
				None => println!("Transaction not found: {tx_hash}"),
			}
			Ok(())
		}
	}
}

use anyhow::Result;

use crate::cli::KeysCommand;
use crate::commands::open_keyring;
use crate::config::Config;
use crate::signer::{KeyInfo, Signer};

pub fn run(config: &Config, cmd: &KeysCommand) -> Result<()> {
	let mut keys = open_keyring(config)?;

	match cmd {
		KeysCommand::Add { name, algorithm } => {
			let algorithm = algorithm.map(Into::into).unwrap_or(config.keyring.algorithm);
			let info = keys.generate(name, algorithm)?;
			println!("Created key `{name}`.");
			print_key(&info);
		}
		KeysCommand::Import {
			name,
			private_key,
			algorithm,
		} => {
			let algorithm = algorithm.map(Into::into).unwrap_or(config.keyring.algorithm);
			let info = keys.import_hex(name, algorithm, private_key)?;
			println!("Imported key `{name}`.");
			print_key(&info);
		}
		KeysCommand::Show { name } => print_key(&keys.key(name)?),
		KeysCommand::List => {
			let all = keys.list()?;
			if all.is_empty() {
				println!("No keys in {}", config.keyring_dir().display());
			}
			for info in all {
				println!("{:<16} {:<14} {}", info.name, info.algorithm.as_str(), info.address);
			}
		}
	}
	Ok(())
}

fn print_key(info: &KeyInfo) {
	println!("Name:       {}", info.name);
	println!("Algorithm:  {}", info.algorithm.as_str());
	println!("Address:    {}", info.address);
	println!("Public key: {}", hex::encode(&info.public_key));
}

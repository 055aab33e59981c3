use anyhow::Result;

use crate::cli::SendArgs;
use crate::commands::{connect, open_keyring, resolve_account};
use crate::config::Config;
use crate::signer::Signer;
use crate::workflow::{PreparedTransfer, Settings, TransferReport, TransferRequest, Workflow};

pub async fn run(config: &Config, args: &SendArgs) -> Result<()> {
	let request = TransferRequest {
		from: args.from.clone().unwrap_or_else(|| config.transfer.from.clone()),
		to: args.to.clone().unwrap_or_else(|| config.transfer.to.clone()),
		denom: args.denom.clone().unwrap_or_else(|| config.fee.denom.clone()),
		amount: u128::from(args.amount.unwrap_or(config.transfer.amount)),
		memo: args.memo.clone(),
	};

	let keys = open_keyring(config)?;
	let settings = Settings::from_config(config);

	// Unknown names fail here, before a channel is opened.
	let sender = keys.key(&request.from)?;
	resolve_account(&keys, config, &request.to)?;
	println!("Sender:    {} ({})", sender.address, sender.name);

	let node = connect(config).await?;
	let workflow = Workflow::new(&node, &keys, &settings);

	println!("Signing transfer of {} {}...", request.amount, request.denom);
	let prepared = workflow.prepare(&request).await?;
	print_prepared(&prepared);

	if args.dry_run {
		println!("Dry run: not broadcasting.");
		return Ok(());
	}

	println!("Broadcasting...");
	let report = workflow.submit(prepared).await?;
	print_report(&report);
	Ok(())
}

fn print_prepared(p: &PreparedTransfer) {
	println!("Recipient: {}", p.recipient);
	println!("Gas used:  {} (wanted {})", p.gas.gas_used, p.gas.gas_wanted);
	println!("Gas limit: {}", p.tx.gas_limit());
	println!("Fee:       {} {}", p.tx.fee(), p.denom);
	if p.verified {
		println!("Signature: verified locally");
	} else {
		println!("Signature: LOCAL VERIFICATION FAILED (broadcasting anyway)");
	}
}

fn print_report(r: &TransferReport) {
	println!("TX:        {}", r.broadcast.tx_hash);
	match &r.confirmation {
		Some(status) if status.is_success() => {
			println!("Included at height {} (gas used {})", status.height, status.gas_used);
		}
		Some(status) => {
			println!("Included at height {} but failed with code {}: {}", status.height, status.code, status.raw_log);
		}
		None => println!("Not confirmed before timeout; balances may be stale."),
	}

	let denom = &r.prepared.denom;
	println!("Sender balance:    {} -> {}", show(r.sender_before, denom), show(r.sender_after, denom));
	println!(
		"Recipient balance: {} -> {}",
		show(r.recipient_before, denom),
		show(r.recipient_after, denom)
	);
}

fn show(amount: Option<u128>, denom: &str) -> String {
	match amount {
		Some(a) => format!("{a} {denom}"),
		None => "unknown".into(),
	}
}

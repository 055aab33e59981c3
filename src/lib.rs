pub mod cli;
pub mod commands;
pub mod config;
pub mod crypto;
pub mod envelope;
pub mod error;
pub mod logging;
pub mod node;
pub mod proto;
pub mod rpc;
pub mod signer;
pub mod tx_builder;
pub mod workflow;

pub use error::{Error, Result};

//! Main entry point for the Haven recovery service.
//!
//! This binary wires the emergency registry, token ledger and withdraw
//! engine together and exposes them over a thin HTTP request layer. The
//! verification core lives in `haven-core`; everything here is plumbing.

use clap::Parser;
use haven_config::Config;
use haven_core::RecoveryEngine;
use haven_crypto::{Eip712Domain, Eip712Signing};
use haven_ledger::{implementations::memory::MemoryLedger, LedgerService};
use haven_registry::{implementations::memory::MemoryRegistry, RegistryService};
use haven_types::SystemClock;
use std::path::PathBuf;
use std::sync::Arc;

mod server;

/// Command-line arguments for the recovery service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

/// Main entry point for the recovery service.
///
/// This function:
/// 1. Parses command-line arguments
/// 2. Initializes logging infrastructure
/// 3. Loads configuration from file
/// 4. Builds the recovery engine and its collaborators
/// 5. Serves the HTTP API until interrupted
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	let config_path = args.config.to_str().ok_or("Invalid config path")?;
	let config = Config::from_file_async(config_path).await?;
	tracing::info!(
		token = %config.token.name,
		chain_id = config.token.chain_id,
		"Loaded configuration"
	);

	let engine = Arc::new(build_engine(&config)?);

	let api_enabled = config.api.as_ref().is_some_and(|api| api.enabled);
	if api_enabled {
		let api_config = config.api.clone().ok_or("API config missing")?;
		server::start_server(api_config, engine).await?;
	} else {
		tracing::warn!("API server disabled; nothing to serve");
	}

	tracing::info!("Stopped recovery service");
	Ok(())
}

/// Builds the recovery engine with in-memory registry and ledger backends.
fn build_engine(config: &Config) -> Result<RecoveryEngine, Box<dyn std::error::Error>> {
	let domain = Eip712Domain {
		name: config.token.name.clone(),
		version: config.token.version.clone(),
		chain_id: config.token.chain_id,
		verifying_contract: config.token.contract_address()?,
	};
	let signing = Eip712Signing::new(domain);
	tracing::info!(
		separator = %signing.domain_separator(),
		"Initialized EIP-712 signing context"
	);

	let registry = Arc::new(RegistryService::new(Box::new(MemoryRegistry::new())));
	let ledger = Arc::new(LedgerService::new(Box::new(MemoryLedger::new())));

	Ok(RecoveryEngine::new(
		registry,
		ledger,
		signing,
		Arc::new(SystemClock),
	))
}

//! Configuration module for the Haven recovery system.
//!
//! This module provides structures and utilities for managing service
//! configuration. It supports loading configuration from TOML files and
//! validates that all deployment-time domain constants are properly set,
//! since the EIP-712 domain separator is derived from them.

use haven_types::{parse_address, Address};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the huge input dump
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure for the recovery service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Deployment constants the EIP-712 domain is built from.
	pub token: TokenConfig,
	/// Configuration for the HTTP API server.
	pub api: Option<ApiConfig>,
}

/// Deployment-time constants binding signatures to this instance.
///
/// Changing any of these invalidates every previously issued authorization,
/// which is exactly the cross-context replay protection the domain separator
/// exists for.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenConfig {
	/// Token name bound into the domain separator.
	pub name: String,
	/// Optional version tag. Omit to use the minimal domain type without a
	/// `version` field; signing tooling must make the same choice.
	pub version: Option<String>,
	/// Chain identifier.
	pub chain_id: u64,
	/// Contract instance address, hex with optional 0x prefix.
	pub contract_address: String,
}

impl TokenConfig {
	/// Parses the configured contract address.
	pub fn contract_address(&self) -> Result<Address, ConfigError> {
		parse_address(&self.contract_address)
			.map_err(|e| ConfigError::Validation(format!("Invalid contract_address: {}", e)))
	}
}

/// Configuration for the HTTP API server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	/// Whether the API server should be started.
	#[serde(default = "default_api_enabled")]
	pub enabled: bool,
	/// Host to bind to.
	#[serde(default = "default_api_host")]
	pub host: String,
	/// Port to bind to.
	#[serde(default = "default_api_port")]
	pub port: u16,
}

fn default_api_enabled() -> bool {
	true
}

fn default_api_host() -> String {
	"127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
	8080
}

impl Config {
	/// Parses a configuration from a TOML string and validates it.
	pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
		let config: Config = toml::from_str(raw)?;
		config.validate()?;
		Ok(config)
	}

	/// Loads a configuration from a TOML file.
	pub async fn from_file_async(path: &str) -> Result<Self, ConfigError> {
		let raw = tokio::fs::read_to_string(path).await?;
		Self::from_toml_str(&raw)
	}

	/// Validates the deployment constants.
	fn validate(&self) -> Result<(), ConfigError> {
		if self.token.name.trim().is_empty() {
			return Err(ConfigError::Validation(
				"token.name must not be empty".to_string(),
			));
		}
		if let Some(version) = &self.token.version {
			if version.trim().is_empty() {
				return Err(ConfigError::Validation(
					"token.version must not be empty when present".to_string(),
				));
			}
		}
		if self.token.chain_id == 0 {
			return Err(ConfigError::Validation(
				"token.chain_id must be non-zero".to_string(),
			));
		}
		let contract = self.token.contract_address()?;
		if contract == Address::ZERO {
			return Err(ConfigError::Validation(
				"token.contract_address must not be the zero address".to_string(),
			));
		}
		Ok(())
	}
}

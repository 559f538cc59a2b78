use std::{
	fs::{create_dir_all, read_to_string, OpenOptions},
	io::Write,
	path::{Path, PathBuf},
};

use anyhow::{anyhow, Context};
use serde::Deserialize;
use stacks_transactions::{network::StacksNetwork, Network};
use tracing::debug;
use url::Url;

/// Template written by `stx init`
pub const GENERATED_CONFIG: &str = include_str!("../generated_config.toml");

/// Default location of the configuration file
pub fn default_config_path() -> anyhow::Result<PathBuf> {
	let home_path =
		dirs::home_dir().ok_or_else(|| anyhow!("Could not find home directory"))?;

	Ok(home_path.join(".config/stx/config.toml"))
}

/// Writes the template unless a configuration already exists
pub fn generate_config(config_path: &Path) -> anyhow::Result<bool> {
	if let Some(parent) = config_path.parent() {
		create_dir_all(parent)?;
	}

	if config_path.exists() {
		return Ok(false);
	}

	let mut config_file = OpenOptions::new()
		.create_new(true)
		.write(true)
		.open(config_path)
		.with_context(|| {
			format!("Could not create {}", config_path.display())
		})?;

	config_file.write_all(GENERATED_CONFIG.as_bytes())?;
	config_file.flush()?;

	Ok(true)
}

/// Reads the configuration, falling back to defaults when the file is absent
pub fn read_config(config_path: &Path) -> anyhow::Result<Config> {
	if !config_path.exists() {
		debug!(
			"No config file at {}, using defaults",
			config_path.display()
		);

		return Ok(Config::default());
	}

	let config_file = read_to_string(config_path)?;

	toml::from_str(&config_file)
		.with_context(|| format!("Invalid config file {}", config_path.display()))
}

/// Contents of the configuration file
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Config {
	/// Network the transactions are built for
	pub network: Network,
	/// Node to talk to, the public node of the network when absent
	#[serde(default)]
	pub node_url: Option<Url>,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			network: Network::Testnet,
			node_url: None,
		}
	}
}

impl Config {
	/// Applies command line overrides
	pub fn with_overrides(
		mut self,
		network: Option<Network>,
		node_url: Option<Url>,
	) -> Self {
		if let Some(network) = network {
			// a node of the configured network does not serve the other one
			if network != self.network {
				self.node_url = None;
			}
			self.network = network;
		}

		if node_url.is_some() {
			self.node_url = node_url;
		}

		self
	}

	/// Network descriptor
	pub fn stacks_network(&self) -> StacksNetwork {
		match (&self.node_url, self.network) {
			(Some(node_url), network) => {
				StacksNetwork::custom(network, node_url.clone())
			}
			(None, Network::Mainnet) => StacksNetwork::mainnet(),
			(None, Network::Testnet) => StacksNetwork::testnet(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn should_parse_generated_config() {
		let config: Config = toml::from_str(GENERATED_CONFIG).unwrap();

		assert_eq!(config, Config::default());
	}

	#[test]
	fn should_write_template_once() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("stx/config.toml");

		assert!(generate_config(&path).unwrap());
		assert!(!generate_config(&path).unwrap());
		assert_eq!(read_config(&path).unwrap(), Config::default());
	}

	#[test]
	fn should_default_missing_config() {
		let dir = tempfile::tempdir().unwrap();

		assert_eq!(
			read_config(&dir.path().join("missing.toml")).unwrap(),
			Config::default()
		);
	}

	#[test]
	fn should_apply_overrides() {
		let config: Config = toml::from_str(
			"network = \"mainnet\"\nnode_url = \"http://localhost:20443\"",
		)
		.unwrap();

		let local = config.clone().with_overrides(None, None);
		assert_eq!(
			local.stacks_network().node_url.as_str(),
			"http://localhost:20443/"
		);

		let testnet = config.with_overrides(Some(Network::Testnet), None);
		assert_eq!(testnet.stacks_network(), StacksNetwork::testnet());
	}
}

//! Process configuration read from the environment (and `.env` through `dotenvy` in the binary).

// std
use std::{net::SocketAddr, path::PathBuf, time::Duration as StdDuration};
// self
use crate::{
	_prelude::*, auth::TokenSecret, error::ConfigError, orders::snapshot::DEFAULT_SNAPSHOT_FILE,
	provider::ClientCredentials,
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const DEFAULT_BATCH_DELAY_MS: u64 = 300;
const DEFAULT_LOG_FILTER: &str = "info";

/// Marketplace served by this process.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ProviderKind {
	/// Mercado Libre (`APP_ID`, `APP_SECRET_KEY`, `REDIRECT_URI`).
	#[default]
	MercadoLibre,
	/// Shopee (`APP_ID_SHP`, `APP_SECRET_KEY_SHP`, `REDIRECT_URI_SHP`).
	Shopee,
}
impl ProviderKind {
	/// Value accepted by `LEDGER_PROVIDER`.
	pub const fn as_str(self) -> &'static str {
		match self {
			ProviderKind::MercadoLibre => "mercadolibre",
			ProviderKind::Shopee => "shopee",
		}
	}

	/// File name of the persisted credential.
	pub const fn credentials_file(self) -> &'static str {
		match self {
			ProviderKind::MercadoLibre => "auth_response.json",
			ProviderKind::Shopee => "auth_response-shpe.json",
		}
	}

	const fn client_vars(self) -> [&'static str; 3] {
		match self {
			ProviderKind::MercadoLibre => ["APP_ID", "APP_SECRET_KEY", "REDIRECT_URI"],
			ProviderKind::Shopee => ["APP_ID_SHP", "APP_SECRET_KEY_SHP", "REDIRECT_URI_SHP"],
		}
	}
}
impl FromStr for ProviderKind {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"mercadolibre" | "ml" => Ok(ProviderKind::MercadoLibre),
			"shopee" | "shp" => Ok(ProviderKind::Shopee),
			other => Err(ConfigError::InvalidEnvVar {
				name: "LEDGER_PROVIDER",
				reason: format!("unknown provider `{other}`"),
			}),
		}
	}
}
impl Display for ProviderKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Resolved process settings.
#[derive(Clone, Debug)]
pub struct Settings {
	/// Selected marketplace.
	pub provider: ProviderKind,
	/// Application credentials of the selected marketplace.
	pub client: ClientCredentials,
	/// HTTP listen address.
	pub bind_addr: SocketAddr,
	/// Directory holding the credential file.
	pub credentials_dir: PathBuf,
	/// Request timeout for every outbound call.
	pub http_timeout: StdDuration,
	/// Where the assembled Mercado Libre order set is written.
	pub snapshot_path: PathBuf,
	/// Pause between Shopee detail batches.
	pub shopee_batch_delay: StdDuration,
	/// Log filter used when `RUST_LOG` is unset.
	pub log_filter: String,
}
impl Settings {
	/// Reads settings from the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Reads settings through `lookup`; blank values count as unset.
	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
		let var = |name: &str| lookup(name).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());
		let provider = match var("LEDGER_PROVIDER") {
			Some(raw) => raw.parse()?,
			None => ProviderKind::default(),
		};
		let [id_var, secret_var, redirect_var] = provider.client_vars();
		let required = |name: &'static str| var(name).ok_or(ConfigError::MissingEnvVar(name));
		let client_id = required(id_var)?;
		let client_secret = TokenSecret::new(required(secret_var)?);
		let redirect_uri = Url::parse(&required(redirect_var)?).map_err(|e| {
			ConfigError::InvalidEnvVar { name: redirect_var, reason: e.to_string() }
		})?;
		let client = ClientCredentials { client_id, client_secret, redirect_uri };
		let bind_addr = var("LEDGER_BIND_ADDR")
			.unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned())
			.parse::<SocketAddr>()
			.map_err(|e| ConfigError::InvalidEnvVar {
				name: "LEDGER_BIND_ADDR",
				reason: e.to_string(),
			})?;
		let http_timeout = StdDuration::from_secs(parse_u64(
			var("LEDGER_HTTP_TIMEOUT_SECS"),
			"LEDGER_HTTP_TIMEOUT_SECS",
			DEFAULT_HTTP_TIMEOUT_SECS,
		)?);

		if http_timeout.is_zero() {
			return Err(ConfigError::InvalidEnvVar {
				name: "LEDGER_HTTP_TIMEOUT_SECS",
				reason: "timeout must be positive".into(),
			});
		}

		Ok(Self {
			provider,
			client,
			bind_addr,
			credentials_dir: var("LEDGER_CREDENTIALS_DIR")
				.map(PathBuf::from)
				.unwrap_or_else(|| PathBuf::from(".")),
			http_timeout,
			snapshot_path: var("LEDGER_SNAPSHOT_PATH")
				.map(PathBuf::from)
				.unwrap_or_else(|| PathBuf::from(DEFAULT_SNAPSHOT_FILE)),
			shopee_batch_delay: StdDuration::from_millis(parse_u64(
				var("LEDGER_SHOPEE_BATCH_DELAY_MS"),
				"LEDGER_SHOPEE_BATCH_DELAY_MS",
				DEFAULT_BATCH_DELAY_MS,
			)?),
			log_filter: var("LEDGER_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_owned()),
		})
	}

	/// Path of the credential file for the selected provider.
	pub fn credentials_path(&self) -> PathBuf {
		self.credentials_dir.join(self.provider.credentials_file())
	}
}

fn parse_u64(raw: Option<String>, name: &'static str, default: u64) -> Result<u64, ConfigError> {
	match raw {
		Some(raw) => raw
			.parse::<u64>()
			.map_err(|e| ConfigError::InvalidEnvVar { name, reason: e.to_string() }),
		None => Ok(default),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
		let map = pairs
			.iter()
			.map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
			.collect::<HashMap<_, _>>();

		move |name| map.get(name).cloned()
	}

	#[test]
	fn mercadolibre_defaults_apply() {
		let settings = Settings::from_lookup(lookup(&[
			("APP_ID", "123"),
			("APP_SECRET_KEY", "secret"),
			("REDIRECT_URI", "https://app.example.com/callback"),
		]))
		.expect("Minimal Mercado Libre settings should load.");

		assert_eq!(settings.provider, ProviderKind::MercadoLibre);
		assert_eq!(settings.bind_addr.to_string(), DEFAULT_BIND_ADDR);
		assert_eq!(settings.http_timeout, StdDuration::from_secs(30));
		assert_eq!(settings.shopee_batch_delay, StdDuration::from_millis(300));
		assert_eq!(settings.credentials_path(), PathBuf::from("./auth_response.json"));
		assert_eq!(settings.log_filter, "info");
		assert_eq!(settings.snapshot_path, PathBuf::from("all_orders.json"));
	}

	#[test]
	fn shopee_reads_its_own_variables() {
		let settings = Settings::from_lookup(lookup(&[
			("LEDGER_PROVIDER", "shopee"),
			("APP_ID_SHP", "2001887"),
			("APP_SECRET_KEY_SHP", "partner-key"),
			("REDIRECT_URI_SHP", "https://app.example.com/shopee"),
			("LEDGER_CREDENTIALS_DIR", "/var/lib/ledger"),
			("LEDGER_SHOPEE_BATCH_DELAY_MS", "0"),
			("LEDGER_SNAPSHOT_PATH", "/var/lib/ledger/orders.json"),
		]))
		.expect("Shopee settings should load.");

		assert_eq!(settings.client.client_id, "2001887");
		assert_eq!(
			settings.credentials_path(),
			PathBuf::from("/var/lib/ledger/auth_response-shpe.json")
		);
		assert!(settings.shopee_batch_delay.is_zero());
		assert_eq!(settings.snapshot_path, PathBuf::from("/var/lib/ledger/orders.json"));
	}

	#[test]
	fn missing_and_invalid_values_are_reported_by_name() {
		let missing = Settings::from_lookup(lookup(&[("APP_ID", "123"), ("APP_SECRET_KEY", " ")]))
			.expect_err("Blank secret must be rejected.");

		assert!(matches!(missing, ConfigError::MissingEnvVar("APP_SECRET_KEY")));

		let invalid = Settings::from_lookup(lookup(&[
			("APP_ID", "123"),
			("APP_SECRET_KEY", "secret"),
			("REDIRECT_URI", "https://app.example.com/callback"),
			("LEDGER_HTTP_TIMEOUT_SECS", "soon"),
		]))
		.expect_err("Non-numeric timeout must be rejected.");

		assert!(matches!(
			invalid,
			ConfigError::InvalidEnvVar { name: "LEDGER_HTTP_TIMEOUT_SECS", .. }
		));

		let provider = Settings::from_lookup(lookup(&[("LEDGER_PROVIDER", "amazon")]))
			.expect_err("Unknown provider must be rejected.");

		assert!(matches!(provider, ConfigError::InvalidEnvVar { name: "LEDGER_PROVIDER", .. }));
	}
}

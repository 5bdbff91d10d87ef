use serde::{Deserialize, Serialize};
use anyhow::Result;
use std::fs;
use std::env;
use std::path::PathBuf;
use regex::Regex;
use toml::map::Map;

const COMMON_CONFIG_PATH: &str = "configs/common.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AgentConfig {
    #[serde(default)]
    pub environment: Environment,
    pub network: NetworkSettings,
    #[serde(default)]
    pub account: AccountSettings,
    pub contracts: DeploymentSettings,
    #[serde(default)]
    pub top_up: TopUpSettings,
    #[serde(default)]
    pub monitoring: MonitoringSettings,
}

/// Deployment environment. Rate limiting is skipped in development.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Staging,
    #[default]
    Production,
}

impl Environment {
    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }
}

/// Node transport. Accepts `WebSocket`/`ws` and `HttpProvider`/`http` in any
/// case; anything else falls back to HTTP.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum TransportKind {
    WebSocket,
    #[default]
    Http,
}

impl From<String> for TransportKind {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "websocket" | "ws" => TransportKind::WebSocket,
            "http" | "httpprovider" => TransportKind::Http,
            other => {
                tracing::warn!(transport = other, "Unknown transport kind, using HTTP");
                TransportKind::Http
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkSettings {
    pub name: String,
    pub id: u64,
    #[serde(default)]
    pub transport: TransportKind,
    pub url: String,
    /// Appended to `url` for HTTP endpoints (e.g. an Infura project id).
    pub api_key: Option<String>,
    #[serde(default = "default_gas_price_gwei")]
    pub gas_price_gwei: u64,
    #[serde(default = "default_contract_gas_limit")]
    pub contract_gas_limit: u64,
    #[serde(default = "default_transfer_gas_limit")]
    pub transfer_gas_limit: u64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AccountSettings {
    pub private_key: Option<String>,
    pub mnemonic: Option<String>,
}

impl NetworkSettings {
    /// The API key, unless empty or left as an unset `${VAR}` placeholder.
    pub fn api_key(&self) -> Option<&str> {
        configured(self.api_key.as_deref())
    }
}

impl AccountSettings {
    pub fn private_key(&self) -> Option<&str> {
        configured(self.private_key.as_deref())
    }

    pub fn mnemonic(&self) -> Option<&str> {
        configured(self.mnemonic.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeploymentSettings {
    pub manifest_path: PathBuf,
    pub artifacts_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TopUpSettings {
    /// Target native balance after a top-up.
    pub balance_cap_gwei: u64,
    /// Minimum deficit, in basis points of the cap, worth a transfer.
    pub min_deficit_bps: u64,
}

impl Default for TopUpSettings {
    fn default() -> Self {
        Self {
            balance_cap_gwei: 1_000_000,
            min_deficit_bps: 7_500,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MonitoringSettings {
    pub transaction_timeout_seconds: u64,
    pub poll_interval_seconds: u64,
}

impl Default for MonitoringSettings {
    fn default() -> Self {
        Self {
            transaction_timeout_seconds: 300,
            poll_interval_seconds: 2,
        }
    }
}

fn default_gas_price_gwei() -> u64 {
    1
}

fn default_contract_gas_limit() -> u64 {
    500_000
}

fn default_transfer_gas_limit() -> u64 {
    100_000
}

// Empty values and placeholders left by a missing env var count as unset.
fn configured(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.starts_with("${"))
}

impl AgentConfig {
    pub fn load(path: &str) -> Result<Self> {
        dotenv::dotenv().ok();

        let common_content = Self::load_common_config()?;
        let specific_content = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path, e))?;

        let merged_content = Self::merge_configs(common_content, specific_content)?;
        Self::from_toml_str(&merged_content)
    }

    /// Parse a TOML document after `${VAR}` substitution.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let content = Self::substitute_env_vars(content.to_string())?;
        let config: AgentConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.top_up.min_deficit_bps == 0 || self.top_up.min_deficit_bps > 10_000 {
            return Err(anyhow::anyhow!(
                "top_up.min_deficit_bps must be between 1 and 10000, got {}",
                self.top_up.min_deficit_bps
            ));
        }
        if self.monitoring.poll_interval_seconds == 0 {
            return Err(anyhow::anyhow!("monitoring.poll_interval_seconds must be positive"));
        }
        Ok(())
    }

    fn load_common_config() -> Result<String> {
        // Missing common.toml is not an error
        Ok(fs::read_to_string(COMMON_CONFIG_PATH).unwrap_or_default())
    }

    fn merge_configs(common: String, specific: String) -> Result<String> {
        if common.is_empty() {
            return Ok(specific);
        }

        let common_toml: toml::Value = toml::from_str(&common)?;
        let specific_toml: toml::Value = toml::from_str(&specific)?;

        // Specific overrides common
        let merged = Self::merge_toml_values(common_toml, specific_toml);
        Ok(toml::to_string_pretty(&merged)?)
    }

    fn merge_toml_values(mut base: toml::Value, override_val: toml::Value) -> toml::Value {
        match (&mut base, override_val) {
            (toml::Value::Table(base_map), toml::Value::Table(override_map)) => {
                for (key, value) in override_map {
                    let existing = base_map
                        .get(&key)
                        .cloned()
                        .unwrap_or(toml::Value::Table(Map::new()));
                    base_map.insert(key, Self::merge_toml_values(existing, value));
                }
                base
            }
            (_, override_val) => override_val,
        }
    }

    fn substitute_env_vars(content: String) -> Result<String> {
        let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")?;
        let mut result = content.clone();

        for cap in re.captures_iter(&content) {
            if let Ok(value) = env::var(&cap[1]) {
                result = result.replace(&cap[0], &value);
            }
        }

        Ok(result)
    }
}

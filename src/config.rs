use crate::{Error, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use tracing::info;

pub const SUPPORTED_INTERVALS: &[&str] = &[
    "1m", "2m", "5m", "15m", "30m", "60m", "90m", "1h", "1d", "5d", "1wk", "1mo", "3mo",
];

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
}

#[derive(Clone, Debug)]
pub struct ProviderConfig {
    pub base_url: String,
    pub range: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ChartConfig {
    pub enabled: bool,
    pub path: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub symbols: Vec<String>,
    pub interval: String,
    pub fetch_interval: u64,
    pub database: DatabaseConfig,
    pub provider: ProviderConfig,
    pub chart: ChartConfig,
}

#[derive(Clone, Debug, Deserialize)]
struct DatabaseConfigFile {
    host: Option<String>,
    port: Option<u16>,
    user: Option<String>,
    password: Option<String>,
    name: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
struct ProviderConfigFile {
    base_url: Option<String>,
    range: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Clone, Debug, Deserialize)]
struct ChartConfigFile {
    enabled: Option<bool>,
    path: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
struct ConfigFile {
    symbols: Option<Vec<String>>,
    interval: Option<String>,
    fetch_interval: Option<u64>,
    database: Option<DatabaseConfigFile>,
    provider: Option<ProviderConfigFile>,
    chart: Option<ChartConfigFile>,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|err| Error::new(format!("failed to read config: {err}")))?;
        let file: ConfigFile = toml::from_str(&content)
            .map_err(|err| Error::new(format!("failed to parse config: {err}")))?;
        let mut config = Config::from_file(file)?;
        config.apply_env_overrides()?;
        config.validate()?;
        info!(symbols = ?config.symbols, "loaded configuration");
        Ok(config)
    }

    fn from_file(file: ConfigFile) -> Result<Self> {
        // symbols and interval have no defaults; a config without them
        // fails at startup.
        let symbols = file
            .symbols
            .ok_or_else(|| Error::new("config is missing required key: symbols"))?;
        let interval = file
            .interval
            .ok_or_else(|| Error::new("config is missing required key: interval"))?;

        let mut config = Config {
            symbols: dedup_symbols(symbols),
            interval,
            fetch_interval: file.fetch_interval.unwrap_or(60),
            database: DatabaseConfig {
                host: "localhost".to_string(),
                port: 8812,
                user: "admin".to_string(),
                password: "quest".to_string(),
                name: "qdb".to_string(),
            },
            provider: ProviderConfig {
                base_url: "https://query2.finance.yahoo.com".to_string(),
                range: "1d".to_string(),
                timeout_secs: 30,
            },
            chart: ChartConfig {
                enabled: true,
                path: "output/candles.svg".to_string(),
            },
        };

        if let Some(database) = file.database {
            if let Some(value) = database.host {
                config.database.host = value;
            }
            if let Some(value) = database.port {
                config.database.port = value;
            }
            if let Some(value) = database.user {
                config.database.user = value;
            }
            if let Some(value) = database.password {
                config.database.password = value;
            }
            if let Some(value) = database.name {
                config.database.name = value;
            }
        }

        if let Some(provider) = file.provider {
            if let Some(value) = provider.base_url {
                config.provider.base_url = value;
            }
            if let Some(value) = provider.range {
                config.provider.range = value;
            }
            if let Some(value) = provider.timeout_secs {
                config.provider.timeout_secs = value;
            }
        }

        if let Some(chart) = file.chart {
            if let Some(value) = chart.enabled {
                config.chart.enabled = value;
            }
            if let Some(value) = chart.path {
                config.chart.path = value;
            }
        }

        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(value) = read_string_env("STOCKPILE_SYMBOLS")? {
            let symbols: Vec<String> = value
                .split(',')
                .map(|symbol| symbol.trim().to_string())
                .filter(|symbol| !symbol.is_empty())
                .collect();
            self.symbols = dedup_symbols(symbols);
        }
        if let Some(value) = read_string_env("STOCKPILE_INTERVAL")? {
            self.interval = value;
        }
        if let Some(value) = read_u64_env("STOCKPILE_FETCH_INTERVAL")? {
            self.fetch_interval = value;
        }

        if let Some(value) = read_string_env("STOCKPILE_DB_HOST")? {
            self.database.host = value;
        }
        if let Some(value) = read_u16_env("STOCKPILE_DB_PORT")? {
            self.database.port = value;
        }
        if let Some(value) = read_string_env("STOCKPILE_DB_USER")? {
            self.database.user = value;
        }
        if let Some(value) = read_string_env("STOCKPILE_DB_PASSWORD")? {
            self.database.password = value;
        }
        if let Some(value) = read_string_env("STOCKPILE_DB_NAME")? {
            self.database.name = value;
        }

        if let Some(value) = read_string_env("STOCKPILE_PROVIDER_BASE_URL")? {
            self.provider.base_url = value;
        }
        if let Some(value) = read_string_env("STOCKPILE_PROVIDER_RANGE")? {
            self.provider.range = value;
        }
        if let Some(value) = read_u64_env("STOCKPILE_PROVIDER_TIMEOUT_SECS")? {
            self.provider.timeout_secs = value;
        }

        if let Some(value) = read_bool_env("STOCKPILE_CHART_ENABLED")? {
            self.chart.enabled = value;
        }
        if let Some(value) = read_string_env("STOCKPILE_CHART_PATH")? {
            self.chart.path = value;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.symbols.is_empty() {
            return Err(Error::new("symbols must contain at least one ticker"));
        }
        if self.symbols.iter().any(|symbol| symbol.trim().is_empty()) {
            return Err(Error::new("symbols must not contain blank entries"));
        }
        if !SUPPORTED_INTERVALS.contains(&self.interval.as_str()) {
            return Err(Error::new(format!(
                "interval '{}' is not supported (expected one of {})",
                self.interval,
                SUPPORTED_INTERVALS.join(", ")
            )));
        }
        if self.fetch_interval == 0 {
            return Err(Error::new("fetch_interval must be positive"));
        }

        if self.database.host.trim().is_empty() {
            return Err(Error::new("database.host must be set"));
        }
        if self.database.port == 0 {
            return Err(Error::new("database.port must be positive"));
        }
        if self.database.user.trim().is_empty() {
            return Err(Error::new("database.user must be set"));
        }
        if self.database.name.trim().is_empty() {
            return Err(Error::new("database.name must be set"));
        }

        if self.provider.base_url.trim().is_empty() {
            return Err(Error::new("provider.base_url must be set"));
        }
        if self.provider.range.trim().is_empty() {
            return Err(Error::new("provider.range must be set"));
        }
        if self.provider.timeout_secs == 0 {
            return Err(Error::new("provider.timeout_secs must be positive"));
        }

        if self.chart.enabled && self.chart.path.trim().is_empty() {
            return Err(Error::new("chart.path must be set when chart is enabled"));
        }

        Ok(())
    }
}

fn dedup_symbols(symbols: Vec<String>) -> Vec<String> {
    let mut seen = Vec::new();
    for symbol in symbols {
        if !seen.contains(&symbol) {
            seen.push(symbol);
        }
    }
    seen
}

fn read_string_env(key: &str) -> Result<Option<String>> {
    match env::var(key) {
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(err) => Err(Error::new(format!("failed to read {key}: {err}"))),
    }
}

fn read_bool_env(key: &str) -> Result<Option<bool>> {
    match env::var(key) {
        Ok(value) => match value.to_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(Some(true)),
            "false" | "0" | "no" => Ok(Some(false)),
            _ => Err(Error::new(format!("{key} must be a boolean"))),
        },
        Err(env::VarError::NotPresent) => Ok(None),
        Err(err) => Err(Error::new(format!("failed to read {key}: {err}"))),
    }
}

fn read_u16_env(key: &str) -> Result<Option<u16>> {
    match env::var(key) {
        Ok(value) => value
            .parse::<u16>()
            .map(Some)
            .map_err(|err| Error::new(format!("{key} must be u16: {err}"))),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(err) => Err(Error::new(format!("failed to read {key}: {err}"))),
    }
}

fn read_u64_env(key: &str) -> Result<Option<u64>> {
    match env::var(key) {
        Ok(value) => value
            .parse::<u64>()
            .map(Some)
            .map_err(|err| Error::new(format!("{key} must be u64: {err}"))),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(err) => Err(Error::new(format!("failed to read {key}: {err}"))),
    }
}

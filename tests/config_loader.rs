use std::env;
use std::fs;
use std::path::PathBuf;
use stockpile::config::{ChartConfig, Config, DatabaseConfig, ProviderConfig};

fn temp_config_path(name: &str) -> PathBuf {
    let mut path = env::temp_dir();
    path.push(format!("stockpile_{name}.toml"));
    path
}

fn write_config(name: &str, content: &str) -> PathBuf {
    let path = temp_config_path(name);
    fs::write(&path, content).expect("write temp config");
    path
}

fn valid_config() -> Config {
    Config {
        symbols: vec!["AAPL".to_string()],
        interval: "1m".to_string(),
        fetch_interval: 60,
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
    }
}

#[test]
fn loads_config_and_applies_env_overrides() {
    let path = write_config(
        "full",
        r#"
symbols = ["AAPL", "MSFT"]
interval = "1m"
fetch_interval = 120

[database]
host = "localhost"
port = 8812
user = "admin"
password = "quest"
name = "qdb"

[provider]
base_url = "https://query2.finance.yahoo.com"
range = "1d"
timeout_secs = 30

[chart]
enabled = true
path = "output/candles.svg"
"#,
    );

    env::set_var("STOCKPILE_SYMBOLS", "AAA,BBB,AAA");
    env::set_var("STOCKPILE_DB_HOST", "questdb.internal");

    let config = Config::load(path.to_str().expect("path")).expect("load config");

    // env wins over the file, duplicates collapse
    assert_eq!(config.symbols, vec!["AAA", "BBB"]);
    assert_eq!(config.database.host, "questdb.internal");
    assert_eq!(config.interval, "1m");
    assert_eq!(config.fetch_interval, 120);

    env::remove_var("STOCKPILE_SYMBOLS");
    env::remove_var("STOCKPILE_DB_HOST");
    let _ = fs::remove_file(&path);
}

#[test]
fn missing_symbols_is_fatal() {
    let path = write_config(
        "no_symbols",
        r#"
interval = "1m"
"#,
    );
    let err = Config::load(path.to_str().expect("path")).expect_err("should fail");
    assert!(err.message.contains("symbols"));
    let _ = fs::remove_file(&path);
}

#[test]
fn missing_interval_is_fatal() {
    let path = write_config(
        "no_interval",
        r#"
symbols = ["AAPL"]
"#,
    );
    let err = Config::load(path.to_str().expect("path")).expect_err("should fail");
    assert!(err.message.contains("interval"));
    let _ = fs::remove_file(&path);
}

#[test]
fn missing_file_is_fatal() {
    let err = Config::load("/nonexistent/stockpile.toml").expect_err("should fail");
    assert!(err.message.contains("failed to read config"));
}

#[test]
fn fetch_interval_defaults_to_sixty() {
    let path = write_config(
        "default_cadence",
        r#"
symbols = ["AAPL"]
interval = "1m"
"#,
    );
    let config = Config::load(path.to_str().expect("path")).expect("load config");
    assert_eq!(config.fetch_interval, 60);
    assert_eq!(config.database.port, 8812);
    assert_eq!(config.database.user, "admin");
    assert_eq!(config.database.name, "qdb");
    assert_eq!(config.provider.timeout_secs, 30);
    let _ = fs::remove_file(&path);
}

#[test]
fn validate_rejects_unsupported_interval() {
    let mut config = valid_config();
    config.interval = "7m".to_string();
    let err = config.validate().expect_err("should fail");
    assert!(err.message.contains("not supported"));
}

#[test]
fn validate_rejects_empty_symbols() {
    let mut config = valid_config();
    config.symbols.clear();
    let err = config.validate().expect_err("should fail");
    assert!(err.message.contains("at least one"));
}

#[test]
fn validate_rejects_zero_fetch_interval() {
    let mut config = valid_config();
    config.fetch_interval = 0;
    let err = config.validate().expect_err("should fail");
    assert!(err.message.contains("fetch_interval"));
}

#[test]
fn validate_rejects_blank_chart_path_when_enabled() {
    let mut config = valid_config();
    config.chart.path = "  ".to_string();
    let err = config.validate().expect_err("should fail");
    assert!(err.message.contains("chart.path"));
}

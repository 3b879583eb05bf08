use crate::app::metrics;
use crate::app::runner::{Runner, SystemClock};
use crate::config::Config;
use crate::provider::yahoo::YahooProvider;
use crate::storage::questdb::QuestDbSink;
use crate::{Error, Result};
use std::env;
use tracing::info;

pub fn run() -> Result<()> {
    metrics::init_start_time();
    let args: Vec<String> = env::args().collect();
    let cli = parse_args(&args)?;

    if cli.show_help {
        print_usage();
        return Ok(());
    }

    let config = Config::load(&cli.config_path)?;
    let provider = YahooProvider::new(&config.provider)?;

    let mut sink = QuestDbSink::connect(&config.database)?;
    sink.ensure_table()?;
    info!("database ready");

    let mut runner = Runner::new(config, provider, sink, SystemClock);
    if cli.once {
        let report = runner.run_cycle()?;
        info!(rows = report.rows_saved, "single cycle complete");
        metrics::write_if_configured()?;
        return Ok(());
    }

    runner.run_forever();
    Ok(())
}

struct CliArgs {
    config_path: String,
    once: bool,
    show_help: bool,
}

fn parse_args(args: &[String]) -> Result<CliArgs> {
    let mut config_path = "config.toml".to_string();
    let mut once = false;
    let mut show_help = false;

    let mut index = 1;
    while index < args.len() {
        match args[index].as_str() {
            "--help" | "-h" => {
                show_help = true;
                index += 1;
            }
            "--config" | "-c" => {
                let value = args
                    .get(index + 1)
                    .ok_or_else(|| Error::new("missing value for --config"))?;
                config_path = value.to_string();
                index += 2;
            }
            "--once" => {
                once = true;
                index += 1;
            }
            unknown => {
                return Err(Error::new(format!("unknown argument: {unknown}")));
            }
        }
    }

    Ok(CliArgs {
        config_path,
        once,
        show_help,
    })
}

fn print_usage() {
    println!("usage: stockpile [--config <path>] [--once]");
    println!("  -c, --config   Path to config.toml (default: config.toml)");
    println!("      --once     Run a single ingestion cycle, then exit");
    println!("  -h, --help     Show this help");
}

#[cfg(test)]
mod tests {
    use super::parse_args;

    #[test]
    fn parses_defaults() {
        let args = vec!["stockpile".to_string()];
        let parsed = parse_args(&args).expect("parse");
        assert_eq!(parsed.config_path, "config.toml");
        assert!(!parsed.once);
        assert!(!parsed.show_help);
    }

    #[test]
    fn parses_overrides() {
        let args = vec![
            "stockpile".to_string(),
            "--config".to_string(),
            "custom.toml".to_string(),
            "--once".to_string(),
        ];
        let parsed = parse_args(&args).expect("parse");
        assert_eq!(parsed.config_path, "custom.toml");
        assert!(parsed.once);
    }

    #[test]
    fn rejects_unknown_arguments() {
        let args = vec!["stockpile".to_string(), "--bogus".to_string()];
        assert!(parse_args(&args).is_err());
    }
}

use crate::app::{chart, metrics};
use crate::config::Config;
use crate::data::{combine, fetch_all, normalize, FetchOutcome};
use crate::provider::BarProvider;
use crate::storage::RecordSink;
use crate::Result;
use std::thread;
use std::time::Duration;
use tracing::{error, info, warn};

/// Delay before the next cycle after one fails, regardless of the
/// configured cadence.
pub const RETRY_BACKOFF_SECS: u64 = 10;

/// Sleep seam so tests can assert cadence and backoff without wall time.
pub trait Clock {
    fn sleep(&mut self, duration: Duration);
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn sleep(&mut self, duration: Duration) {
        thread::sleep(duration);
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CycleReport {
    pub symbols_ok: usize,
    pub symbols_empty: usize,
    pub symbols_failed: usize,
    pub rows_saved: usize,
}

/// The ingestion loop context: owns the provider, the sink (and through it
/// the process's single database connection), and the clock.
pub struct Runner<P, S, C> {
    config: Config,
    provider: P,
    sink: S,
    clock: C,
}

impl<P: BarProvider, S: RecordSink, C: Clock> Runner<P, S, C> {
    pub fn new(config: Config, provider: P, sink: S, clock: C) -> Self {
        Self {
            config,
            provider,
            sink,
            clock,
        }
    }

    /// One fetch -> normalize -> persist -> render pass. An empty fetch
    /// skips the downstream states without error; a normalization error
    /// fails the cycle and nothing is persisted.
    pub fn run_cycle(&mut self) -> Result<CycleReport> {
        let outcomes = fetch_all(
            &self.provider,
            &self.config.symbols,
            &self.config.provider.range,
            &self.config.interval,
        );

        let mut report = CycleReport::default();
        for fetch in &outcomes {
            match fetch.outcome {
                FetchOutcome::Bars(_) => report.symbols_ok += 1,
                FetchOutcome::Empty => report.symbols_empty += 1,
                FetchOutcome::Failed(_) => report.symbols_failed += 1,
            }
        }
        metrics::record_symbols(
            report.symbols_ok,
            report.symbols_empty,
            report.symbols_failed,
        );

        let Some(tagged) = combine(outcomes) else {
            warn!("no raw data fetched this cycle");
            return Ok(report);
        };

        let records = normalize(&tagged)?;
        report.rows_saved = self.sink.save(&records);

        if self.config.chart.enabled {
            if let Err(err) = chart::write_chart(&self.config.chart.path, &records) {
                warn!(error = %err.message, "chart render failed");
            }
        }

        Ok(report)
    }

    /// One cycle plus the sleep that follows it. Any error escaping the
    /// cycle is caught here, logged, and answered with the fixed backoff
    /// instead of the configured cadence.
    pub fn step(&mut self) {
        metrics::inc_cycle();
        let delay = match self.run_cycle() {
            Ok(report) => {
                info!(
                    rows = report.rows_saved,
                    symbols_ok = report.symbols_ok,
                    symbols_empty = report.symbols_empty,
                    symbols_failed = report.symbols_failed,
                    "cycle complete"
                );
                Duration::from_secs(self.config.fetch_interval)
            }
            Err(err) => {
                error!(error = %err.message, "cycle failed");
                metrics::inc_cycle_error();
                Duration::from_secs(RETRY_BACKOFF_SECS)
            }
        };
        if let Err(err) = metrics::write_if_configured() {
            warn!(error = %err.message, "metrics write failed");
        }
        self.clock.sleep(delay);
    }

    pub fn run_forever(&mut self) {
        info!(
            fetch_interval = self.config.fetch_interval,
            interval = %self.config.interval,
            "starting ingestion loop"
        );
        loop {
            self.step();
        }
    }
}

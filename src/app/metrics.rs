use crate::{Error, Result};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

static START_TIME: OnceLock<i64> = OnceLock::new();

static CYCLES_TOTAL: AtomicU64 = AtomicU64::new(0);
static CYCLE_ERRORS_TOTAL: AtomicU64 = AtomicU64::new(0);

static SYMBOLS_OK_TOTAL: AtomicU64 = AtomicU64::new(0);
static SYMBOLS_EMPTY_TOTAL: AtomicU64 = AtomicU64::new(0);
static SYMBOLS_FAILED_TOTAL: AtomicU64 = AtomicU64::new(0);

static ROWS_INSERTED_TOTAL: AtomicU64 = AtomicU64::new(0);
static BATCH_ROLLBACKS_TOTAL: AtomicU64 = AtomicU64::new(0);

static LAST_CYCLE_TIMESTAMP: AtomicU64 = AtomicU64::new(0);

pub fn init_start_time() {
    let _ = START_TIME.set(now_epoch());
}

pub fn inc_cycle() {
    CYCLES_TOTAL.fetch_add(1, Ordering::Relaxed);
    LAST_CYCLE_TIMESTAMP.store(now_epoch() as u64, Ordering::Relaxed);
}

pub fn inc_cycle_error() {
    CYCLE_ERRORS_TOTAL.fetch_add(1, Ordering::Relaxed);
}

pub fn record_symbols(ok: usize, empty: usize, failed: usize) {
    SYMBOLS_OK_TOTAL.fetch_add(ok as u64, Ordering::Relaxed);
    SYMBOLS_EMPTY_TOTAL.fetch_add(empty as u64, Ordering::Relaxed);
    SYMBOLS_FAILED_TOTAL.fetch_add(failed as u64, Ordering::Relaxed);
}

pub fn add_rows_inserted(rows: usize) {
    ROWS_INSERTED_TOTAL.fetch_add(rows as u64, Ordering::Relaxed);
}

pub fn inc_batch_rollback() {
    BATCH_ROLLBACKS_TOTAL.fetch_add(1, Ordering::Relaxed);
}

pub fn write_if_configured() -> Result<()> {
    let path = match std::env::var("STOCKPILE_METRICS_PATH") {
        Ok(value) if !value.trim().is_empty() => value,
        _ => return Ok(()),
    };
    write_metrics(&path)
}

pub fn write_metrics(path: &str) -> Result<()> {
    let content = render();
    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|err| Error::new(format!("metrics dir create failed: {err}")))?;
    }
    fs::write(path, content).map_err(|err| Error::new(format!("metrics write failed: {err}")))
}

pub fn render() -> String {
    let mut output = String::new();
    push_line(&mut output, "# HELP stockpile_up Stockpile process up");
    push_line(&mut output, "# TYPE stockpile_up gauge");
    push_line(&mut output, "stockpile_up 1");
    push_line(&mut output, "# HELP stockpile_uptime_seconds Process uptime in seconds");
    push_line(&mut output, "# TYPE stockpile_uptime_seconds gauge");
    push_line(
        &mut output,
        &format!("stockpile_uptime_seconds {}", uptime_seconds()),
    );
    push_line(&mut output, "# HELP stockpile_cycles_total Total ingestion cycles");
    push_line(&mut output, "# TYPE stockpile_cycles_total counter");
    push_line(
        &mut output,
        &format!("stockpile_cycles_total {}", CYCLES_TOTAL.load(Ordering::Relaxed)),
    );
    push_line(&mut output, "# HELP stockpile_cycle_errors_total Cycles that failed");
    push_line(&mut output, "# TYPE stockpile_cycle_errors_total counter");
    push_line(
        &mut output,
        &format!(
            "stockpile_cycle_errors_total {}",
            CYCLE_ERRORS_TOTAL.load(Ordering::Relaxed)
        ),
    );
    push_line(&mut output, "# HELP stockpile_symbols_ok_total Symbol fetches with data");
    push_line(&mut output, "# TYPE stockpile_symbols_ok_total counter");
    push_line(
        &mut output,
        &format!(
            "stockpile_symbols_ok_total {}",
            SYMBOLS_OK_TOTAL.load(Ordering::Relaxed)
        ),
    );
    push_line(&mut output, "# HELP stockpile_symbols_empty_total Symbol fetches with no data");
    push_line(&mut output, "# TYPE stockpile_symbols_empty_total counter");
    push_line(
        &mut output,
        &format!(
            "stockpile_symbols_empty_total {}",
            SYMBOLS_EMPTY_TOTAL.load(Ordering::Relaxed)
        ),
    );
    push_line(&mut output, "# HELP stockpile_symbols_failed_total Symbol fetches that errored");
    push_line(&mut output, "# TYPE stockpile_symbols_failed_total counter");
    push_line(
        &mut output,
        &format!(
            "stockpile_symbols_failed_total {}",
            SYMBOLS_FAILED_TOTAL.load(Ordering::Relaxed)
        ),
    );
    push_line(&mut output, "# HELP stockpile_rows_inserted_total Rows inserted into questdb");
    push_line(&mut output, "# TYPE stockpile_rows_inserted_total counter");
    push_line(
        &mut output,
        &format!(
            "stockpile_rows_inserted_total {}",
            ROWS_INSERTED_TOTAL.load(Ordering::Relaxed)
        ),
    );
    push_line(&mut output, "# HELP stockpile_batch_rollbacks_total Batches rolled back");
    push_line(&mut output, "# TYPE stockpile_batch_rollbacks_total counter");
    push_line(
        &mut output,
        &format!(
            "stockpile_batch_rollbacks_total {}",
            BATCH_ROLLBACKS_TOTAL.load(Ordering::Relaxed)
        ),
    );
    push_line(
        &mut output,
        "# HELP stockpile_last_cycle_timestamp Last cycle start (epoch seconds)",
    );
    push_line(&mut output, "# TYPE stockpile_last_cycle_timestamp gauge");
    push_line(
        &mut output,
        &format!(
            "stockpile_last_cycle_timestamp {}",
            LAST_CYCLE_TIMESTAMP.load(Ordering::Relaxed)
        ),
    );
    output
}

fn now_epoch() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_secs() as i64)
        .unwrap_or(0)
}

fn uptime_seconds() -> i64 {
    let start = START_TIME.get().copied().unwrap_or_else(now_epoch);
    now_epoch().saturating_sub(start)
}

fn push_line(target: &mut String, line: &str) {
    target.push_str(line);
    target.push('\n');
}

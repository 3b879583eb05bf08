use crate::app::metrics;
use crate::config::DatabaseConfig;
use crate::models::PriceRecord;
use crate::storage::RecordSink;
use crate::{Error, Result};
use postgres::types::ToSql;
use postgres::{Client, NoTls};
use tracing::{error, info};

const SCHEMA_SQL: &str = include_str!("../../DB_SCHEMA.sql");

/// QuestDB sink over the Postgres wire protocol. Holds the single
/// long-lived connection for the process; there is no reconnect logic, so
/// a dropped connection degrades every later save until restart.
pub struct QuestDbSink {
    client: Client,
}

impl QuestDbSink {
    pub fn connect(config: &DatabaseConfig) -> Result<Self> {
        let client = postgres::Config::new()
            .host(&config.host)
            .port(config.port)
            .user(&config.user)
            .password(&config.password)
            .dbname(&config.name)
            .connect(NoTls)
            .map_err(|err| Error::new(format!("questdb connect failed: {err}")))?;
        info!(
            host = %config.host,
            port = config.port,
            database = %config.name,
            "connected to questdb"
        );
        Ok(Self { client })
    }

    pub fn ensure_table(&mut self) -> Result<()> {
        for statement in split_statements(SCHEMA_SQL) {
            if statement.trim().is_empty() {
                continue;
            }
            self.client
                .batch_execute(&statement)
                .map_err(|err| Error::new(format!("schema execute failed: {err}")))?;
        }
        Ok(())
    }

    fn insert_batch(&mut self, records: &[PriceRecord]) -> Result<()> {
        let sql = build_insert_sql(records.len())
            .ok_or_else(|| Error::new("insert batch must be non-empty"))?;

        let mut params: Vec<&(dyn ToSql + Sync)> = Vec::with_capacity(records.len() * 7);
        for record in records {
            params.push(&record.timestamp);
            params.push(&record.symbol);
            params.push(&record.open);
            params.push(&record.high);
            params.push(&record.low);
            params.push(&record.close);
            params.push(&record.volume);
        }

        let mut tx = self
            .client
            .transaction()
            .map_err(|err| Error::new(format!("db transaction failed: {err}")))?;
        // A failed execute drops the transaction, rolling back the whole
        // batch; no partial insert survives.
        tx.execute(sql.as_str(), &params)
            .map_err(|err| Error::new(format!("insert stock_prices failed: {err}")))?;
        tx.commit()
            .map_err(|err| Error::new(format!("db commit failed: {err}")))?;
        Ok(())
    }
}

impl RecordSink for QuestDbSink {
    fn save(&mut self, records: &[PriceRecord]) -> usize {
        if records.is_empty() {
            return 0;
        }
        match self.insert_batch(records) {
            Ok(()) => {
                info!(rows = records.len(), "saved records to questdb");
                metrics::add_rows_inserted(records.len());
                records.len()
            }
            Err(err) => {
                error!(error = %err.message, "batch insert failed, rolled back");
                metrics::inc_batch_rollback();
                0
            }
        }
    }
}

/// One parameterized multi-row INSERT covering the whole batch, or `None`
/// for an empty batch.
pub fn build_insert_sql(rows: usize) -> Option<String> {
    if rows == 0 {
        return None;
    }
    let mut sql = String::from(
        "INSERT INTO stock_prices (timestamp, symbol, open, high, low, close, volume) VALUES ",
    );
    for row in 0..rows {
        if row > 0 {
            sql.push_str(", ");
        }
        let base = row * 7;
        sql.push('(');
        for column in 0..7 {
            if column > 0 {
                sql.push_str(", ");
            }
            sql.push_str(&format!("${}", base + column + 1));
        }
        sql.push(')');
    }
    Some(sql)
}

fn split_statements(sql: &str) -> Vec<String> {
    let mut cleaned = String::new();
    for line in sql.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("--") {
            continue;
        }
        cleaned.push_str(line);
        cleaned.push('\n');
    }
    cleaned
        .split(';')
        .map(|statement| statement.trim().to_string())
        .filter(|statement| !statement.is_empty())
        .collect()
}

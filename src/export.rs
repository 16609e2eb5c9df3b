use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat};
use csv::Writer;
use gas_core::AggregateResult;
use std::io::Cursor;

/// Render the per-transaction costs as CSV, newest first
pub fn transactions_csv(result: &AggregateResult) -> Result<String> {
    let mut wtr = Writer::from_writer(Cursor::new(Vec::new()));

    wtr.write_record([
        "hash",
        "timestamp_ms",
        "block_time",
        "gas_used",
        "gas_price",
        "cost_wei",
        "cost_native",
        "price",
        "cost_fiat",
        "fallback_price",
    ])
    .context("CSV header error")?;

    for cost in &result.transactions {
        let block_time = DateTime::from_timestamp_millis(cost.timestamp)
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
            .unwrap_or_default();

        wtr.write_record([
            cost.hash.clone(),
            cost.timestamp.to_string(),
            block_time,
            cost.gas_used.to_string(),
            cost.gas_price.to_string(),
            cost.cost_wei.to_string(),
            cost.cost_native.to_string(),
            cost.price.to_string(),
            cost.cost_fiat.to_string(),
            cost.used_fallback_price.to_string(),
        ])
        .with_context(|| format!("CSV write error for {}", cost.hash))?;
    }

    let data = wtr
        .into_inner()
        .map_err(|e| anyhow::anyhow!("CSV finalization error: {}", e))?
        .into_inner();

    String::from_utf8(data).context("CSV encoding error")
}

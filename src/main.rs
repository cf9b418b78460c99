use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use statsync::{DdlWorker, MemStore, StatsConfig, StatsHandle, TableInfo};

fn sample_table() -> TableInfo {
    TableInfo::new(5, "orders")
        .with_column(10, "id", "bigint")
        .with_column(11, "customer", "varchar")
        .with_index(20, "PRIMARY", &["id"], true)
}

fn load_table(path: &str) -> anyhow::Result<TableInfo> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path))?;
    serde_json::from_str(&text).with_context(|| format!("parsing table descriptor {}", path))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .context("building log filter")?;
    fmt().with_env_filter(filter).init();

    let config = StatsConfig::from_env()?;
    let table = match std::env::args().nth(1) {
        Some(path) => load_table(&path)?,
        None => sample_table(),
    };
    info!(
        target: "statsync",
        "starting: ddl_channel_capacity={} drain_on_shutdown={} table={}",
        config.ddl_channel_capacity, config.drain_on_shutdown, table.id
    );

    let store = MemStore::new();
    let (handle, ddl_rx) = StatsHandle::new(&config, Arc::new(store.clone()))?;
    let worker = DdlWorker::new(handle.clone(), ddl_rx, &config).spawn();

    let table_id = table.id;
    handle.create_table(table).await?;
    let report = worker.shutdown().await?;
    info!(target: "statsync", "worker report: {:?}", report);

    match store.stats_meta(table_id) {
        Some(meta) => println!(
            "stats_meta(table_id={}, version={}, row_count={})",
            meta.table_id, meta.version, meta.row_count
        ),
        None => println!("no stats_meta row for table {}", table_id),
    }
    for hist in store.stats_histograms(table_id) {
        println!(
            "stats_histograms(table_id={}, is_index={}, hist_id={}, distinct_count={}, version={})",
            hist.table_id, hist.is_index, hist.hist_id, hist.distinct_count, hist.version
        );
    }
    Ok(())
}

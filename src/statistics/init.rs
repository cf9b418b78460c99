use std::sync::Arc;

use tracing::{info, warn};

use crate::catalog::TableInfo;
use crate::error::Error;
use crate::executor::{Executor, Statement, Transaction};
use crate::types::Value;

pub const INSERT_STATS_META: &str =
    "insert into mysql.stats_meta (version, table_id) values (?, ?)";
pub const INSERT_STATS_HISTOGRAM: &str =
    "insert into mysql.stats_histograms (table_id, is_index, hist_id, distinct_count, version) values (?, ?, ?, ?, ?)";

/// Provisions the statistics rows of a newly created table
#[derive(Clone)]
pub struct TableInitializer {
    executor: Arc<dyn Executor>,
}

impl TableInitializer {
    pub fn new(executor: Arc<dyn Executor>) -> Self {
        Self { executor }
    }

    /// Insert the meta row and one empty histogram per column and per index
    /// in a single transaction, stamped with its start timestamp.
    ///
    /// On failure the transaction is rolled back and the statement error is
    /// returned; commit is only attempted once every insert succeeded.
    pub async fn initialize_table(&self, info: &TableInfo) -> Result<(), Error> {
        let mut txn = self.executor.begin().await?;
        let version = txn.start_ts();

        if let Err(err) = insert_bookkeeping(txn.as_mut(), info, version).await {
            if let Err(rollback_err) = txn.rollback().await {
                warn!(
                    target: "statsync::ddl",
                    "rollback after failed stats init of table {} failed: {}",
                    info.id, rollback_err
                );
            }
            return Err(err);
        }

        txn.commit().await?;
        info!(
            target: "statsync::ddl",
            "initialized stats for table {} ({}): {} histograms at version {}",
            info.id,
            info.name,
            info.histogram_count(),
            version
        );
        Ok(())
    }
}

async fn insert_bookkeeping(txn: &mut dyn Transaction, info: &TableInfo, version: u64) -> Result<(), Error> {
    txn.execute(&Statement::new(
        INSERT_STATS_META,
        vec![Value::Uint(version), Value::Int(info.id)],
    ))
    .await?;

    for col in &info.columns {
        txn.execute(&histogram_placeholder(info.id, false, col.id, version))
            .await?;
    }
    for idx in &info.indices {
        txn.execute(&histogram_placeholder(info.id, true, idx.id, version))
            .await?;
    }
    Ok(())
}

fn histogram_placeholder(table_id: i64, is_index: bool, hist_id: i64, version: u64) -> Statement {
    Statement::new(
        INSERT_STATS_HISTOGRAM,
        vec![
            Value::Int(table_id),
            Value::Bool(is_index),
            Value::Int(hist_id),
            Value::Int(0),
            Value::Uint(version),
        ],
    )
}

//! In-memory statistics store with snapshot isolation.
//!
//! Every transaction reads as of its start timestamp and buffers its writes
//! locally. Commit validates the buffered keys and installs all of them under
//! a single commit timestamp, so a transaction's rows become visible together
//! or not at all.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::error::Error;
use crate::executor::{Executor, QueryResult, Statement, Transaction};
use crate::types::Value;

pub mod oracle;
pub mod schema;
pub mod sql;

use oracle::TimestampOracle;
use schema::{TableDef, STATS_HISTOGRAMS, STATS_META};

/// A committed row together with the timestamp it became visible at
#[derive(Debug, Clone)]
struct Version {
    commit_ts: u64,
    row: Vec<Value>,
}

#[derive(Debug)]
struct TableData {
    rows: BTreeMap<Vec<Value>, Version>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub begun: u64,
    pub committed: u64,
    pub rolled_back: u64,
}

#[derive(Debug)]
struct StoreInner {
    oracle: TimestampOracle,
    tables: RwLock<HashMap<&'static str, TableData>>,
    stats: Mutex<StoreStats>,
}

/// Cheaply cloneable handle to a shared in-memory store
#[derive(Debug, Clone)]
pub struct MemStore {
    inner: Arc<StoreInner>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsMetaRow {
    pub table_id: i64,
    pub version: u64,
    pub row_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsHistogramRow {
    pub table_id: i64,
    pub is_index: bool,
    pub hist_id: i64,
    pub distinct_count: i64,
    pub version: u64,
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemStore {
    pub fn new() -> Self {
        let tables = schema::system_tables()
            .into_iter()
            .map(|def| {
                (
                    def.name,
                    TableData {
                        rows: BTreeMap::new(),
                    },
                )
            })
            .collect();

        Self {
            inner: Arc::new(StoreInner {
                oracle: TimestampOracle::new(),
                tables: RwLock::new(tables),
                stats: Mutex::new(StoreStats::default()),
            }),
        }
    }

    /// Timestamp at which a new reader sees everything committed so far
    pub fn snapshot_ts(&self) -> u64 {
        self.inner.oracle.current()
    }

    pub fn stats(&self) -> StoreStats {
        *self.inner.stats.lock()
    }

    pub fn stats_meta(&self, table_id: i64) -> Option<StatsMetaRow> {
        self.stats_meta_at(table_id, u64::MAX)
    }

    pub fn stats_meta_at(&self, table_id: i64, read_ts: u64) -> Option<StatsMetaRow> {
        self.scan_at(STATS_META, read_ts)
            .into_iter()
            .filter_map(|row| decode_meta(&row))
            .find(|meta| meta.table_id == table_id)
    }

    /// Histogram rows of a table, column histograms first, each group by id
    pub fn stats_histograms(&self, table_id: i64) -> Vec<StatsHistogramRow> {
        self.stats_histograms_at(table_id, u64::MAX)
    }

    pub fn stats_histograms_at(&self, table_id: i64, read_ts: u64) -> Vec<StatsHistogramRow> {
        self.scan_at(STATS_HISTOGRAMS, read_ts)
            .into_iter()
            .filter_map(|row| decode_histogram(&row))
            .filter(|hist| hist.table_id == table_id)
            .collect()
    }

    /// Number of committed rows in a system table
    pub fn table_row_count(&self, table: &str) -> usize {
        let tables = self.inner.tables.read();
        schema::lookup(table)
            .and_then(|def| tables.get(def.name))
            .map(|data| data.rows.len())
            .unwrap_or(0)
    }

    fn scan_at(&self, table: &str, read_ts: u64) -> Vec<Vec<Value>> {
        let tables = self.inner.tables.read();
        match tables.get(table) {
            Some(data) => data
                .rows
                .values()
                .filter(|v| v.commit_ts <= read_ts)
                .map(|v| v.row.clone())
                .collect(),
            None => Vec::new(),
        }
    }
}

#[async_trait]
impl Executor for MemStore {
    async fn begin(&self) -> Result<Box<dyn Transaction>, Error> {
        let start_ts = self.inner.oracle.next();
        self.inner.stats.lock().begun += 1;
        debug!(target: "statsync::store", "begin start_ts={}", start_ts);

        Ok(Box::new(MemTransaction {
            store: Arc::clone(&self.inner),
            start_ts,
            writes: Vec::new(),
            written_keys: HashSet::new(),
        }))
    }
}

/// Write set of an open transaction
struct MemTransaction {
    store: Arc<StoreInner>,
    start_ts: u64,
    writes: Vec<(&'static TableDef, Vec<Value>, Vec<Value>)>,
    written_keys: HashSet<(&'static str, Vec<Value>)>,
}

fn format_key(key: &[Value]) -> String {
    let parts: Vec<String> = key.iter().map(|v| v.to_string()).collect();
    format!("'{}'", parts.join("-"))
}

#[async_trait]
impl Transaction for MemTransaction {
    fn start_ts(&self) -> u64 {
        self.start_ts
    }

    async fn execute(&mut self, stmt: &Statement) -> Result<QueryResult, Error> {
        let insert = sql::parse_insert(stmt.sql)?;
        let def = schema::lookup(&insert.table)
            .ok_or_else(|| Error::Execution(format!("Table '{}' doesn't exist", insert.table)))?;
        let row = sql::bind(&insert, &stmt.params, def)?;
        let key = def.key_of(&row);

        if self.written_keys.contains(&(def.name, key.clone())) {
            return Err(Error::DuplicateKey {
                table: def.name.to_string(),
                key: format_key(&key),
            });
        }

        {
            let tables = self.store.tables.read();
            let visible = tables
                .get(def.name)
                .and_then(|data| data.rows.get(&key))
                .map(|v| v.commit_ts <= self.start_ts)
                .unwrap_or(false);
            if visible {
                return Err(Error::DuplicateKey {
                    table: def.name.to_string(),
                    key: format_key(&key),
                });
            }
        }

        debug!(target: "statsync::store", "start_ts={} {}", self.start_ts, stmt);
        self.written_keys.insert((def.name, key.clone()));
        self.writes.push((def, key, row));
        Ok(QueryResult::affected(1))
    }

    async fn commit(self: Box<Self>) -> Result<(), Error> {
        let MemTransaction { store, start_ts, writes, .. } = *self;
        let mut tables = store.tables.write();

        // Keys visible at start_ts were rejected by execute, so any key found
        // here was committed concurrently
        for (def, key, _) in &writes {
            if tables.get(def.name).is_some_and(|data| data.rows.contains_key(key)) {
                store.stats.lock().rolled_back += 1;
                return Err(Error::WriteConflict {
                    table: def.name.to_string(),
                    key: format_key(key),
                });
            }
        }

        // Allocated under the table lock so commit order matches timestamp order
        let commit_ts = store.oracle.next();
        let count = writes.len();
        for (def, key, row) in writes {
            let data = tables.get_mut(def.name).ok_or_else(|| {
                Error::Transaction(format!("Table '{}' vanished during commit", def.name))
            })?;
            data.rows.insert(key, Version { commit_ts, row });
        }
        drop(tables);

        store.stats.lock().committed += 1;
        debug!(
            target: "statsync::store",
            "commit start_ts={} commit_ts={} rows={}",
            start_ts, commit_ts, count
        );
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), Error> {
        self.store.stats.lock().rolled_back += 1;
        debug!(
            target: "statsync::store",
            "rollback start_ts={} discarded={}",
            self.start_ts,
            self.writes.len()
        );
        Ok(())
    }
}

fn decode_meta(row: &[Value]) -> Option<StatsMetaRow> {
    match row {
        [table_id, version, row_count] => Some(StatsMetaRow {
            table_id: table_id.as_i64()?,
            version: version.as_u64()?,
            row_count: row_count.as_i64()?,
        }),
        _ => None,
    }
}

fn decode_histogram(row: &[Value]) -> Option<StatsHistogramRow> {
    match row {
        [table_id, is_index, hist_id, distinct_count, version] => Some(StatsHistogramRow {
            table_id: table_id.as_i64()?,
            is_index: is_index.as_bool()?,
            hist_id: hist_id.as_i64()?,
            distinct_count: distinct_count.as_i64()?,
            version: version.as_u64()?,
        }),
        _ => None,
    }
}

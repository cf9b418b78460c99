// src/lib.rs
pub mod catalog;
pub mod config;
pub mod error;
pub mod executor;
pub mod statistics;
pub mod storage;
pub mod types;

pub use catalog::{ColumnInfo, IndexInfo, TableInfo};
pub use config::StatsConfig;
pub use error::Error;
pub use executor::{Executor, QueryResult, Statement, Transaction};
pub use statistics::{DdlKind, DdlTask, DdlWorker, StatsHandle, WorkerHandle, WorkerReport};
pub use storage::MemStore;
pub use types::Value;

use crate::error::Error;
use crate::types::Value;
use async_trait::async_trait;
use std::fmt;

/// Entry point to the transactional statistics store
#[async_trait]
pub trait Executor: Send + Sync {
    /// Start a transaction; its start timestamp is fixed at this point
    async fn begin(&self) -> Result<Box<dyn Transaction>, Error>;
}

/// An open transaction against the statistics store.
///
/// Statements executed through it are invisible to other readers until
/// `commit` succeeds. `commit` and `rollback` consume the transaction, so
/// nothing can run on it once either has been issued.
#[async_trait]
pub trait Transaction: Send + Sync {
    fn start_ts(&self) -> u64;

    async fn execute(&mut self, stmt: &Statement) -> Result<QueryResult, Error>;

    async fn commit(self: Box<Self>) -> Result<(), Error>;

    async fn rollback(self: Box<Self>) -> Result<(), Error>;
}

/// A prepared statement with positional `?` placeholders and its bound parameters
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: &'static str,
    pub params: Vec<Value>,
}

impl Statement {
    pub fn new(sql: &'static str, params: Vec<Value>) -> Self {
        Self { sql, params }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self.params.iter().map(|p| p.to_string()).collect();
        write!(f, "{} [{}]", self.sql, params.join(", "))
    }
}

/// Outcome of a write statement
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct QueryResult {
    pub affected_rows: u64,
}

impl QueryResult {
    pub fn affected(affected_rows: u64) -> Self {
        Self { affected_rows }
    }
}

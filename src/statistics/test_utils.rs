use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::catalog::TableInfo;
use crate::error::Error;
use crate::executor::{Executor, QueryResult, Statement, Transaction};

pub const FIXED_START_TS: u64 = 400;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Begin,
    Execute(Statement),
    Commit,
    Rollback,
}

/// Executor that records every call and can be told to fail at a given point
#[derive(Debug, Clone, Default)]
pub struct RecordingExecutor {
    calls: Arc<Mutex<Vec<Call>>>,
    /// 1-based index of the statement that fails
    fail_on_execute: Option<usize>,
    fail_commit: bool,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on_execute(n: usize) -> Self {
        Self {
            fail_on_execute: Some(n),
            ..Self::default()
        }
    }

    pub fn failing_commit() -> Self {
        Self {
            fail_commit: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn statements(&self) -> Vec<Statement> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Execute(stmt) => Some(stmt),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl Executor for RecordingExecutor {
    async fn begin(&self) -> Result<Box<dyn Transaction>, Error> {
        self.calls.lock().push(Call::Begin);
        Ok(Box::new(RecordingTransaction {
            executor: self.clone(),
            executed: 0,
        }))
    }
}

struct RecordingTransaction {
    executor: RecordingExecutor,
    executed: usize,
}

#[async_trait]
impl Transaction for RecordingTransaction {
    fn start_ts(&self) -> u64 {
        FIXED_START_TS
    }

    async fn execute(&mut self, stmt: &Statement) -> Result<QueryResult, Error> {
        self.executed += 1;
        self.executor.calls.lock().push(Call::Execute(stmt.clone()));
        if self.executor.fail_on_execute == Some(self.executed) {
            return Err(Error::Execution(format!("injected failure on statement {}", self.executed)));
        }
        Ok(QueryResult::affected(1))
    }

    async fn commit(self: Box<Self>) -> Result<(), Error> {
        self.executor.calls.lock().push(Call::Commit);
        if self.executor.fail_commit {
            return Err(Error::Transaction("injected commit failure".into()));
        }
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), Error> {
        self.executor.calls.lock().push(Call::Rollback);
        Ok(())
    }
}

/// table_id=5, columns 10 and 11, one index 20
pub fn sample_table() -> TableInfo {
    TableInfo::new(5, "t")
        .with_column(10, "a", "int")
        .with_column(11, "b", "varchar")
        .with_index(20, "idx_a", &["a"], false)
}

use std::sync::Arc;

use tracing::debug;

use crate::catalog::TableInfo;
use crate::config::StatsConfig;
use crate::error::Error;
use crate::executor::Executor;
use crate::statistics::init::TableInitializer;
use crate::statistics::queue::{self, DdlReceiver, DdlSender};
use crate::statistics::task::{DdlKind, DdlTask};

/// Statistics manager: accepts DDL notifications from producers and applies
/// them to the statistics store when the worker hands them back.
#[derive(Clone)]
pub struct StatsHandle {
    ddl_tx: DdlSender,
    initializer: TableInitializer,
}

impl StatsHandle {
    /// Build the handle and its task queue. The receiver is handed out once;
    /// give it to the single DDL worker.
    pub fn new(config: &StatsConfig, executor: Arc<dyn Executor>) -> Result<(Self, DdlReceiver), Error> {
        config.validate()?;
        let (ddl_tx, ddl_rx) = queue::channel(config.ddl_channel_capacity);
        let handle = Self {
            ddl_tx,
            initializer: TableInitializer::new(executor),
        };
        Ok((handle, ddl_rx))
    }

    pub fn ddl_sender(&self) -> DdlSender {
        self.ddl_tx.clone()
    }

    /// Report a created table. Returns once the task is queued; the rows are
    /// written later by the worker.
    pub async fn create_table(&self, info: impl Into<Arc<TableInfo>>) -> Result<(), Error> {
        self.enqueue(DdlKind::CreateTable, info.into()).await
    }

    pub async fn drop_table(&self, info: impl Into<Arc<TableInfo>>) -> Result<(), Error> {
        self.enqueue(DdlKind::DropTable, info.into()).await
    }

    pub async fn add_column(&self, info: impl Into<Arc<TableInfo>>) -> Result<(), Error> {
        self.enqueue(DdlKind::AddColumn, info.into()).await
    }

    pub async fn drop_column(&self, info: impl Into<Arc<TableInfo>>) -> Result<(), Error> {
        self.enqueue(DdlKind::DropColumn, info.into()).await
    }

    async fn enqueue(&self, kind: DdlKind, info: Arc<TableInfo>) -> Result<(), Error> {
        debug!(target: "statsync::ddl", "queue {} task for table {}", kind, info.id);
        self.ddl_tx.enqueue(DdlTask::new(kind, info)).await
    }

    /// Apply one task to the statistics store
    pub async fn handle_ddl_task(&self, task: &DdlTask) -> Result<(), Error> {
        match task.kind() {
            DdlKind::CreateTable => self.initializer.initialize_table(task.table_info()).await,
            // Stats rows of dropped tables and columns are not reclaimed yet
            DdlKind::DropTable => self.skip(task),
            DdlKind::AddColumn => self.skip(task),
            DdlKind::DropColumn => self.skip(task),
        }
    }

    fn skip(&self, task: &DdlTask) -> Result<(), Error> {
        debug!(
            target: "statsync::ddl",
            "no stats bookkeeping for {} on table {}",
            task.kind(),
            task.table_id()
        );
        Ok(())
    }
}

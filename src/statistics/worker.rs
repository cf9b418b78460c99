use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::config::StatsConfig;
use crate::error::Error;
use crate::statistics::handle::StatsHandle;
use crate::statistics::queue::DdlReceiver;
use crate::statistics::task::DdlTask;

/// Outcome counters of a worker's lifetime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerReport {
    pub handled: u64,
    pub failed: u64,
    /// Tasks still queued at shutdown and never applied
    pub discarded: u64,
}

/// The single consumer of the DDL task queue
pub struct DdlWorker {
    handle: StatsHandle,
    rx: DdlReceiver,
    drain_on_shutdown: bool,
    report: WorkerReport,
}

/// Owner's side of a spawned worker. Dropping it detaches the worker, which
/// then keeps consuming the queue for the rest of the process.
#[must_use = "dropping the handle detaches the worker; call `shutdown` to stop it"]
pub struct WorkerHandle {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<WorkerReport>,
}

impl DdlWorker {
    pub fn new(handle: StatsHandle, rx: DdlReceiver, config: &StatsConfig) -> Self {
        Self {
            handle,
            rx,
            drain_on_shutdown: config.drain_on_shutdown,
            report: WorkerReport::default(),
        }
    }

    /// Run the worker on the tokio runtime until shutdown is requested
    pub fn spawn(self) -> WorkerHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let join = tokio::spawn(self.run(shutdown_rx));
        WorkerHandle { shutdown_tx, join }
    }

    /// Apply the next queued task, waiting for one if necessary.
    /// Returns `None` when the queue is closed and empty.
    pub async fn process_next(&mut self) -> Option<Result<(), Error>> {
        let task = self.rx.recv().await?;
        Some(self.apply(task).await)
    }

    pub fn report(&self) -> WorkerReport {
        self.report
    }

    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> WorkerReport {
        info!(target: "statsync::worker", "DDL worker started");

        let mut watching = true;
        loop {
            tokio::select! {
                biased;
                changed = shutdown.changed(), if watching => {
                    match changed {
                        Ok(()) if *shutdown.borrow() => break,
                        Ok(()) => {}
                        // Owner detached: nobody can stop us, keep serving the queue
                        Err(_) => watching = false,
                    }
                }
                task = self.rx.recv() => match task {
                    Some(task) => {
                        let _ = self.apply(task).await;
                    }
                    None => break,
                },
            }
        }

        self.rx.close();
        if self.drain_on_shutdown {
            while let Some(task) = self.rx.recv().await {
                let _ = self.apply(task).await;
            }
        } else {
            while let Some(task) = self.rx.try_recv() {
                self.report.discarded += 1;
                warn!(
                    target: "statsync::worker",
                    "discarding {} task for table {} at shutdown",
                    task.kind(),
                    task.table_id()
                );
            }
        }

        info!(
            target: "statsync::worker",
            "DDL worker stopped: handled={} failed={} discarded={}",
            self.report.handled, self.report.failed, self.report.discarded
        );
        self.report
    }

    async fn apply(&mut self, task: DdlTask) -> Result<(), Error> {
        let result = self.handle.handle_ddl_task(&task).await;
        match &result {
            Ok(()) => self.report.handled += 1,
            Err(err) => {
                // No retry: the table stays without bookkeeping until repaired
                self.report.failed += 1;
                error!(
                    target: "statsync::worker",
                    "dropping {} task for table {}: {}",
                    task.kind(),
                    task.table_id(),
                    err
                );
            }
        }
        result
    }
}

impl WorkerHandle {
    /// Stop the worker and wait for it to finish
    pub async fn shutdown(self) -> Result<WorkerReport, Error> {
        // Fails only if the worker already exited on its own
        let _ = self.shutdown_tx.send(true);
        self.join
            .await
            .map_err(|e| Error::Execution(format!("DDL worker terminated abnormally: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TableInfo;
    use crate::statistics::test_utils::sample_table;
    use crate::storage::MemStore;
    use std::sync::Arc;
    use std::time::Duration;

    fn setup(drain_on_shutdown: bool) -> (MemStore, StatsHandle, DdlWorker) {
        let config = StatsConfig {
            drain_on_shutdown,
            ..StatsConfig::default()
        };
        let store = MemStore::new();
        let (handle, rx) = StatsHandle::new(&config, Arc::new(store.clone())).unwrap();
        let worker = DdlWorker::new(handle.clone(), rx, &config);
        (store, handle, worker)
    }

    fn table(id: i64) -> TableInfo {
        TableInfo::new(id, format!("t{}", id))
            .with_column(1, "a", "int")
            .with_index(1, "PRIMARY", &["a"], true)
    }

    #[tokio::test]
    async fn test_process_next_in_enqueue_order() -> Result<(), Error> {
        let (store, handle, mut worker) = setup(true);
        handle.create_table(table(1)).await?;
        handle.create_table(table(2)).await?;

        worker.process_next().await.unwrap()?;
        assert!(store.stats_meta(1).is_some());
        assert!(store.stats_meta(2).is_none());

        worker.process_next().await.unwrap()?;
        assert_eq!(worker.report().handled, 2);
        let (v1, v2) = (store.stats_meta(1).unwrap().version, store.stats_meta(2).unwrap().version);
        assert!(v1 < v2);
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_task_is_dropped_and_worker_continues() -> Result<(), Error> {
        let (store, handle, worker) = setup(true);
        let running = worker.spawn();

        handle.create_table(table(1)).await?;
        handle.create_table(table(1)).await?;
        handle.drop_table(table(1)).await?;
        handle.create_table(sample_table()).await?;

        let report = running.shutdown().await?;
        assert_eq!(report, WorkerReport { handled: 3, failed: 1, discarded: 0 });
        assert_eq!(store.stats_histograms(1).len(), 2);
        assert_eq!(store.stats_histograms(5).len(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_shutdown_drains_queue() -> Result<(), Error> {
        let (store, handle, worker) = setup(true);
        for id in 1..=3 {
            handle.create_table(table(id)).await?;
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        shutdown_tx.send(true).unwrap();
        let report = worker.run(shutdown_rx).await;

        assert_eq!(report.handled, 3);
        for id in 1..=3 {
            assert!(store.stats_meta(id).is_some());
        }
        assert_eq!(handle.create_table(table(4)).await, Err(Error::QueueClosed));
        Ok(())
    }

    #[tokio::test]
    async fn test_shutdown_without_drain_discards() -> Result<(), Error> {
        let (store, handle, worker) = setup(false);
        for id in 1..=3 {
            handle.create_table(table(id)).await?;
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        shutdown_tx.send(true).unwrap();
        let report = worker.run(shutdown_rx).await;

        assert_eq!(report, WorkerReport { handled: 0, failed: 0, discarded: 3 });
        assert_eq!(store.stats().begun, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_spawned_worker_applies_backlog_on_shutdown() -> Result<(), Error> {
        let (store, handle, worker) = setup(true);
        handle.create_table(table(7)).await?;
        drop(handle);

        // the worker keeps its own handle clone, so the queue stays open
        let running = worker.spawn();
        let report = running.shutdown().await?;
        assert_eq!(report.handled, 1);
        assert!(store.stats_meta(7).is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_detached_worker_keeps_serving_queue() -> Result<(), Error> {
        let (store, handle, worker) = setup(true);
        drop(worker.spawn());
        tokio::time::sleep(Duration::from_millis(20)).await;

        handle.create_table(sample_table()).await?;

        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while store.stats_meta(5).is_none() {
            assert!(tokio::time::Instant::now() < deadline, "task never applied");
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(store.stats_histograms(5).len(), 3);
        assert!(!handle.ddl_sender().is_closed());
        Ok(())
    }
}

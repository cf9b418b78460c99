//! Bounded FIFO hand-off between DDL producers and the statistics worker.

use tokio::sync::mpsc::{self, error::TrySendError};

use crate::error::Error;
use crate::statistics::task::DdlTask;

/// Create a queue holding at most `capacity` pending tasks
pub fn channel(capacity: usize) -> (DdlSender, DdlReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (DdlSender { tx }, DdlReceiver { rx })
}

/// Producer side; clone it for every component that reports DDL
#[derive(Debug, Clone)]
pub struct DdlSender {
    tx: mpsc::Sender<DdlTask>,
}

impl DdlSender {
    /// Append a task, waiting for room while the queue is full
    pub async fn enqueue(&self, task: DdlTask) -> Result<(), Error> {
        self.tx.send(task).await.map_err(|_| Error::QueueClosed)
    }

    /// Append a task without waiting
    pub fn try_enqueue(&self, task: DdlTask) -> Result<(), Error> {
        match self.tx.try_send(task) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(Error::QueueFull),
            Err(TrySendError::Closed(_)) => Err(Error::QueueClosed),
        }
    }

    /// Tasks currently waiting in the queue
    pub fn len(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.tx.max_capacity()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Receive-only view of the queue, owned by the single worker
#[derive(Debug)]
pub struct DdlReceiver {
    rx: mpsc::Receiver<DdlTask>,
}

impl DdlReceiver {
    /// Next task in enqueue order; `None` once closed and drained
    pub async fn recv(&mut self) -> Option<DdlTask> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<DdlTask> {
        self.rx.try_recv().ok()
    }

    /// Refuse further tasks. Already queued tasks can still be received.
    pub fn close(&mut self) {
        self.rx.close();
    }
}

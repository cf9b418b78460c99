//! Keeps the statistics system tables in step with the schema catalog.
//!
//! DDL execution reports each finished catalog change through a
//! [`StatsHandle`]. The change travels as a [`DdlTask`] through a bounded
//! queue to the single [`DdlWorker`], which hands it back to the handle for
//! dispatch. Only table creation currently writes anything: a `stats_meta`
//! row and one empty `stats_histograms` row per column and per index, all in
//! one transaction.

pub mod handle;
pub mod init;
pub mod queue;
pub mod task;
pub mod worker;

#[cfg(test)]
pub(crate) mod test_utils;

pub use handle::StatsHandle;
pub use init::TableInitializer;
pub use queue::{DdlReceiver, DdlSender};
pub use task::{DdlKind, DdlTask};
pub use worker::{DdlWorker, WorkerHandle, WorkerReport};

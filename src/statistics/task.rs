use std::fmt;
use std::sync::Arc;

use crate::catalog::TableInfo;

/// Kind of catalog change a task reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DdlKind {
    CreateTable,
    DropTable,
    AddColumn,
    DropColumn,
}

impl fmt::Display for DdlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DdlKind::CreateTable => "create table",
            DdlKind::DropTable => "drop table",
            DdlKind::AddColumn => "add column",
            DdlKind::DropColumn => "drop column",
        };
        f.write_str(name)
    }
}

/// A finished DDL operation whose statistics bookkeeping is still pending.
///
/// Tasks are immutable once built; the table snapshot is shared, so cloning a
/// task is cheap.
#[derive(Debug, Clone)]
pub struct DdlTask {
    kind: DdlKind,
    table_info: Arc<TableInfo>,
}

impl DdlTask {
    pub fn new(kind: DdlKind, table_info: impl Into<Arc<TableInfo>>) -> Self {
        Self {
            kind,
            table_info: table_info.into(),
        }
    }

    pub fn kind(&self) -> DdlKind {
        self.kind
    }

    pub fn table_info(&self) -> &TableInfo {
        &self.table_info
    }

    pub fn table_id(&self) -> i64 {
        self.table_info.id
    }
}

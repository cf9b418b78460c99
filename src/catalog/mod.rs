use serde::{Deserialize, Serialize};

/// Snapshot of a table definition as produced by the DDL executor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableInfo {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub columns: Vec<ColumnInfo>,
    #[serde(default)]
    pub indices: Vec<IndexInfo>,
}

/// Column definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub type_name: String,
}

/// Index definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexInfo {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub unique: bool,
}

impl TableInfo {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            columns: Vec::new(),
            indices: Vec::new(),
        }
    }

    pub fn with_column(mut self, id: i64, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.columns.push(ColumnInfo {
            id,
            name: name.into(),
            type_name: type_name.into(),
        });
        self
    }

    pub fn with_index(mut self, id: i64, name: impl Into<String>, columns: &[&str], unique: bool) -> Self {
        self.indices.push(IndexInfo {
            id,
            name: name.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            unique,
        });
        self
    }

    /// Number of histograms the table needs: one per column plus one per index
    pub fn histogram_count(&self) -> usize {
        self.columns.len() + self.indices.len()
    }
}

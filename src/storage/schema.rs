//! Definitions of the system tables holding statistics bookkeeping.

use crate::types::{Type, Value};

pub const STATS_META: &str = "mysql.stats_meta";
pub const STATS_HISTOGRAMS: &str = "mysql.stats_histograms";

#[derive(Debug)]
pub struct ColumnDef {
    pub name: &'static str,
    pub type_: Type,
    /// Value used when an insert leaves the column out; `None` makes it required
    pub default: Option<Value>,
}

#[derive(Debug)]
pub struct TableDef {
    pub name: &'static str,
    pub columns: &'static [ColumnDef],
    pub primary_key: &'static [&'static str],
}

static STATS_META_DEF: TableDef = TableDef {
    name: STATS_META,
    columns: &[
        ColumnDef { name: "table_id", type_: Type::Int, default: None },
        ColumnDef { name: "version", type_: Type::Uint, default: None },
        ColumnDef { name: "row_count", type_: Type::Int, default: Some(Value::Int(0)) },
    ],
    primary_key: &["table_id"],
};

static STATS_HISTOGRAMS_DEF: TableDef = TableDef {
    name: STATS_HISTOGRAMS,
    columns: &[
        ColumnDef { name: "table_id", type_: Type::Int, default: None },
        ColumnDef { name: "is_index", type_: Type::Bool, default: None },
        ColumnDef { name: "hist_id", type_: Type::Int, default: None },
        ColumnDef { name: "distinct_count", type_: Type::Int, default: Some(Value::Int(0)) },
        ColumnDef { name: "version", type_: Type::Uint, default: None },
    ],
    primary_key: &["table_id", "is_index", "hist_id"],
};

pub fn system_tables() -> [&'static TableDef; 2] {
    [&STATS_META_DEF, &STATS_HISTOGRAMS_DEF]
}

pub fn lookup(name: &str) -> Option<&'static TableDef> {
    system_tables()
        .into_iter()
        .find(|def| def.name.eq_ignore_ascii_case(name))
}

impl TableDef {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Extract the primary key from a full row laid out in column order
    pub fn key_of(&self, row: &[Value]) -> Vec<Value> {
        self.primary_key
            .iter()
            .filter_map(|pk| self.column_index(pk))
            .map(|i| row[i].clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(lookup("MYSQL.STATS_META").unwrap().name, STATS_META);
        assert_eq!(lookup(STATS_HISTOGRAMS).unwrap().columns.len(), 5);
        assert!(lookup("mysql.user").is_none());
    }

    #[test]
    fn test_key_of() {
        let def = lookup(STATS_HISTOGRAMS).unwrap();
        let row = vec![
            Value::Int(5),
            Value::Bool(true),
            Value::Int(20),
            Value::Int(0),
            Value::Uint(99),
        ];
        assert_eq!(
            def.key_of(&row),
            vec![Value::Int(5), Value::Bool(true), Value::Int(20)]
        );
    }

    #[test]
    fn test_primary_keys_name_real_columns() {
        for def in system_tables() {
            for pk in def.primary_key {
                assert!(def.column_index(pk).is_some(), "{} missing {}", def.name, pk);
            }
        }
    }
}

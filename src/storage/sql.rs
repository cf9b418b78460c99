use regex::Regex;
use std::sync::OnceLock;

use crate::error::Error;
use crate::storage::schema::TableDef;
use crate::types::Value;

/// An `insert into <table> (<columns>) values (?, ...)` statement
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedInsert {
    pub table: String,
    pub columns: Vec<String>,
    pub placeholders: usize,
}

fn insert_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?is)^\s*insert\s+into\s+([a-z_][a-z0-9_]*(?:\.[a-z_][a-z0-9_]*)?)\s*\(([^)]*)\)\s*values\s*\(([^)]*)\)\s*;?\s*$",
        )
        .expect("insert pattern is valid")
    })
}

pub fn parse_insert(sql: &str) -> Result<ParsedInsert, Error> {
    let caps = insert_pattern()
        .captures(sql)
        .ok_or_else(|| Error::Syntax(format!("Unsupported statement: {}", sql.trim())))?;

    let table = caps[1].to_lowercase();

    let columns: Vec<String> = caps[2]
        .split(',')
        .map(|c| c.trim().to_lowercase())
        .collect();
    if columns.iter().any(|c| c.is_empty()) {
        return Err(Error::Syntax(format!("Empty column name in: {}", sql.trim())));
    }

    let values: Vec<&str> = caps[3].split(',').map(str::trim).collect();
    if let Some(literal) = values.iter().find(|v| **v != "?") {
        return Err(Error::Syntax(format!(
            "Expected placeholder, found '{}'; bind values as parameters",
            literal
        )));
    }

    if values.len() != columns.len() {
        return Err(Error::Syntax(format!(
            "Column count ({}) doesn't match value count ({})",
            columns.len(),
            values.len()
        )));
    }

    Ok(ParsedInsert {
        table,
        columns,
        placeholders: values.len(),
    })
}

/// Bind parameters to a parsed insert, producing a full row in table column order
pub fn bind(insert: &ParsedInsert, params: &[Value], def: &TableDef) -> Result<Vec<Value>, Error> {
    if params.len() != insert.placeholders {
        return Err(Error::Execution(format!(
            "Statement expects {} parameters, got {}",
            insert.placeholders,
            params.len()
        )));
    }

    let mut row: Vec<Option<Value>> = vec![None; def.columns.len()];
    for (name, param) in insert.columns.iter().zip(params) {
        let idx = def.column_index(name).ok_or_else(|| {
            Error::Execution(format!("Unknown column '{}' in '{}'", name, def.name))
        })?;
        if row[idx].is_some() {
            return Err(Error::Execution(format!("Column '{}' specified twice", name)));
        }
        row[idx] = Some(param.clone().coerce(def.columns[idx].type_)?);
    }

    let mut full = Vec::with_capacity(def.columns.len());
    for (slot, column) in row.into_iter().zip(def.columns) {
        let value = match slot {
            Some(v) => v,
            None => column.default.clone().ok_or_else(|| {
                Error::Execution(format!("Field '{}' doesn't have a default value", column.name))
            })?,
        };
        full.push(value);
    }

    for pk in def.primary_key {
        if let Some(idx) = def.column_index(pk) {
            if full[idx].is_null() {
                return Err(Error::Execution(format!("Column '{}' cannot be null", pk)));
            }
        }
    }

    Ok(full)
}

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("SQL syntax error: {0}")]
    Syntax(String),

    #[error("Type error: {0}")]
    Type(String),

    #[error("Execution error: {0}")]
    Execution(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Duplicate entry {key} for table {table}")]
    DuplicateKey { table: String, key: String },

    #[error("Write conflict on {table} key {key}")]
    WriteConflict { table: String, key: String },

    #[error("DDL task queue is closed")]
    QueueClosed,

    #[error("DDL task queue is full")]
    QueueFull,

    #[error("Configuration error: {0}")]
    Config(String),
}

//! Storage adapters for census datasets.
//!
//! Every adapter flattens relationships to id strings on write and hands
//! them back as raw ids on read. Loaded records are never re-linked into a
//! [`census_core::Dataset`].

pub mod csv;
pub mod error;
pub mod json;
pub mod rows;
pub mod sql;
pub mod store;
pub mod xlsx;

pub use crate::csv::{CsvOptions, CsvStore};
pub use error::{StoreError, StoreResult};
pub use json::{JsonOptions, JsonStore};
pub use sql::{Backend, SqlOptions, SqlStore, SqlTables};
pub use store::{FileNames, RecordStore};
pub use xlsx::{SheetNames, XlsxOptions, XlsxStore};

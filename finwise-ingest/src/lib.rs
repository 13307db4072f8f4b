//! finwise-ingest: CSV statement parsing and column mapping.

pub mod parsers;
pub mod types;

pub use parsers::{map_records, parse_amount, parse_csv};
pub use types::{ColumnMapping, CsvTable, MappedColumns, MappedRecord};

use finwise_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Header row plus records of a delimited file, all fields trimmed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    /// Position of a header, matched exactly after trimming
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.headers.iter().position(|h| h == name)
    }

    pub fn resolve(&self, mapping: &ColumnMapping) -> Result<MappedColumns> {
        let find = |name: &str| {
            self.column_index(name)
                .ok_or_else(|| Error::MissingColumn(name.to_string()))
        };
        Ok(MappedColumns {
            date: find(&mapping.date)?,
            description: find(&mapping.description)?,
            amount: find(&mapping.amount)?,
        })
    }
}

/// Which header names hold the date, description and amount
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub date: String,
    pub description: String,
    pub amount: String,
}

impl ColumnMapping {
    pub fn new(
        date: impl Into<String>,
        description: impl Into<String>,
        amount: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            description: description.into(),
            amount: amount.into(),
        }
    }
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self::new("date", "description", "amount")
    }
}

/// Column mapping resolved to indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappedColumns {
    pub date: usize,
    pub description: usize,
    pub amount: usize,
}

impl MappedColumns {
    /// Minimum field count a row needs to be usable
    pub fn required_len(&self) -> usize {
        self.date.max(self.description).max(self.amount) + 1
    }
}

/// A row that survived filtering, amount still carrying its original sign
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappedRecord {
    pub date: String,
    pub description: String,
    pub signed_amount: f64,
}

impl MappedRecord {
    pub fn amount(&self) -> f64 {
        self.signed_amount.abs()
    }
}

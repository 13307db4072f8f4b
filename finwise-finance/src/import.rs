//! Two-phase CSV import: propose classified rows for review, then commit them.

use chrono::NaiveDate;
use finwise_core::time::parse_loose_date;
use finwise_core::{Category, Error, NewTransaction, Result, Session, Transaction, TransactionStore, TransactionType};
use finwise_ingest::{ColumnMapping, map_records, parse_csv};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::category_rules::{Classification, classify};

/// One imported row awaiting review. Never stored in this shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedImportRow {
    /// Raw date text from the file
    pub date: String,
    pub description: String,
    /// Absolute value
    pub amount: f64,
    pub transaction_type: TransactionType,
    pub category: Category,
}

impl ParsedImportRow {
    /// Reviewer override; the type follows the new category
    pub fn set_category(&mut self, category: Category) {
        let c = Classification::from_category(category);
        self.category = c.category;
        self.transaction_type = c.transaction_type;
    }

    /// Build the insert payload, dating the row `today` when its date cannot be read
    pub fn to_new_transaction(&self, today: NaiveDate) -> NewTransaction {
        let date = parse_loose_date(&self.date).unwrap_or_else(|| {
            warn!(raw = %self.date, %today, "unreadable import date, using today");
            today
        });
        NewTransaction::new(self.amount, self.description.clone(), self.category, date)
    }
}

/// Rows ready for review plus how many were dropped
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportProposal {
    pub headers: Vec<String>,
    pub rows: Vec<ParsedImportRow>,
    pub dropped: usize,
}

impl ImportProposal {
    pub fn set_category(&mut self, index: usize, category: Category) -> Result<()> {
        let len = self.rows.len();
        let row = self
            .rows
            .get_mut(index)
            .ok_or_else(|| Error::InvalidData(format!("row {index} out of range (0..{len})")))?;
        row.set_category(category);
        Ok(())
    }

    pub fn total_income(&self) -> f64 {
        self.rows
            .iter()
            .filter(|r| r.transaction_type == TransactionType::Income)
            .map(|r| r.amount)
            .sum()
    }

    pub fn total_expenses(&self) -> f64 {
        self.rows
            .iter()
            .filter(|r| r.transaction_type == TransactionType::Expense)
            .map(|r| r.amount)
            .sum()
    }
}

/// Parse and classify a CSV file without touching any store.
pub fn propose_import(text: &str, mapping: &ColumnMapping) -> Result<ImportProposal> {
    let table = parse_csv(text);
    let records = map_records(&table, mapping)?;
    let dropped = table.rows.len() - records.len();

    let rows = records
        .into_iter()
        .map(|r| {
            let c = classify(&r.description, r.signed_amount);
            ParsedImportRow {
                amount: r.amount(),
                date: r.date,
                description: r.description,
                transaction_type: c.transaction_type,
                category: c.category,
            }
        })
        .collect();

    Ok(ImportProposal {
        headers: table.headers,
        rows,
        dropped,
    })
}

/// Insert reviewed rows in one batch.
pub async fn commit_import(
    session: &Session,
    store: &dyn TransactionStore,
    rows: &[ParsedImportRow],
    today: NaiveDate,
) -> Result<Vec<Transaction>> {
    let user = session.user_id()?;
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let txns = rows.iter().map(|r| r.to_new_transaction(today)).collect();
    let stored = store.insert_transactions(user, txns).await?;
    info!(user = %user, count = stored.len(), "imported transactions");
    Ok(stored)
}

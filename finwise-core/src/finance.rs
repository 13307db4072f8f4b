//! Ledger record types: transactions and their category tags

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Direction of a transaction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The 15 category tags. The first four are income tags, the rest expense tags.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Salary,
    Freelance,
    Investments,
    OtherIncome,
    Food,
    Transport,
    Entertainment,
    Bills,
    Shopping,
    Healthcare,
    Education,
    Travel,
    Subscriptions,
    Rent,
    OtherExpense,
}

impl Category {
    pub const INCOME: [Category; 4] = [
        Category::Salary,
        Category::Freelance,
        Category::Investments,
        Category::OtherIncome,
    ];

    pub const EXPENSE: [Category; 11] = [
        Category::Food,
        Category::Transport,
        Category::Entertainment,
        Category::Bills,
        Category::Shopping,
        Category::Healthcare,
        Category::Education,
        Category::Travel,
        Category::Subscriptions,
        Category::Rent,
        Category::OtherExpense,
    ];

    /// Which side of the tag partition this category sits on
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            Category::Salary | Category::Freelance | Category::Investments | Category::OtherIncome => {
                TransactionType::Income
            }
            _ => TransactionType::Expense,
        }
    }

    pub fn is_income(&self) -> bool {
        self.transaction_type() == TransactionType::Income
    }

    /// Storage tag, e.g. `other_income`
    pub fn tag(&self) -> &'static str {
        match self {
            Category::Salary => "salary",
            Category::Freelance => "freelance",
            Category::Investments => "investments",
            Category::OtherIncome => "other_income",
            Category::Food => "food",
            Category::Transport => "transport",
            Category::Entertainment => "entertainment",
            Category::Bills => "bills",
            Category::Shopping => "shopping",
            Category::Healthcare => "healthcare",
            Category::Education => "education",
            Category::Travel => "travel",
            Category::Subscriptions => "subscriptions",
            Category::Rent => "rent",
            Category::OtherExpense => "other_expense",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Category::Salary => "Salary",
            Category::Freelance => "Freelance",
            Category::Investments => "Investments",
            Category::OtherIncome => "Other Income",
            Category::Food => "Food & Dining",
            Category::Transport => "Transport",
            Category::Entertainment => "Entertainment",
            Category::Bills => "Bills & Utilities",
            Category::Shopping => "Shopping",
            Category::Healthcare => "Healthcare",
            Category::Education => "Education",
            Category::Travel => "Travel",
            Category::Subscriptions => "Subscriptions",
            Category::Rent => "Rent",
            Category::OtherExpense => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_lowercase();
        Category::INCOME
            .iter()
            .chain(Category::EXPENSE.iter())
            .find(|c| c.tag() == tag)
            .copied()
            .ok_or_else(|| Error::InvalidData(format!("unknown category tag: {s}")))
    }
}

/// A stored ledger entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: String,
    /// Always non-negative; direction comes from `transaction_type`
    pub amount: f64,
    pub description: String,
    pub category: Category,
    pub transaction_type: TransactionType,
    pub transaction_date: NaiveDate,
    pub is_recurring: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    pub fn is_income(&self) -> bool {
        self.transaction_type == TransactionType::Income
    }

    pub fn is_expense(&self) -> bool {
        self.transaction_type == TransactionType::Expense
    }

    /// Apply an edit. Changing the category re-derives the type.
    pub fn apply(&mut self, update: TransactionUpdate, now: DateTime<Utc>) {
        if let Some(amount) = update.amount {
            self.amount = amount.abs();
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(category) = update.category {
            self.category = category;
            self.transaction_type = category.transaction_type();
        }
        if let Some(date) = update.transaction_date {
            self.transaction_date = date;
        }
        if let Some(recurring) = update.is_recurring {
            self.is_recurring = recurring;
        }
        if let Some(notes) = update.notes {
            self.notes = notes;
        }
        self.updated_at = now;
    }
}

/// Insert payload for a transaction. The type always follows the category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewTransaction {
    pub amount: f64,
    pub description: String,
    pub category: Category,
    pub transaction_type: TransactionType,
    pub transaction_date: NaiveDate,
    pub is_recurring: bool,
    pub notes: Option<String>,
}

impl NewTransaction {
    pub fn new(
        amount: f64,
        description: impl Into<String>,
        category: Category,
        transaction_date: NaiveDate,
    ) -> Self {
        Self {
            amount: amount.abs(),
            description: description.into(),
            category,
            transaction_type: category.transaction_type(),
            transaction_date,
            is_recurring: false,
            notes: None,
        }
    }

    pub fn recurring(mut self, is_recurring: bool) -> Self {
        self.is_recurring = is_recurring;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn into_transaction(self, id: impl Into<String>, now: DateTime<Utc>) -> Transaction {
        Transaction {
            id: id.into(),
            amount: self.amount,
            description: self.description,
            category: self.category,
            transaction_type: self.category.transaction_type(),
            transaction_date: self.transaction_date,
            is_recurring: self.is_recurring,
            notes: self.notes,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial edit of a transaction; `None` leaves a field unchanged.
/// `notes: Some(None)` clears the notes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionUpdate {
    pub amount: Option<f64>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub transaction_date: Option<NaiveDate>,
    pub is_recurring: Option<bool>,
    pub notes: Option<Option<String>>,
}

impl TransactionUpdate {
    pub fn is_empty(&self) -> bool {
        *self == TransactionUpdate::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_partition_sizes() {
        assert_eq!(Category::INCOME.len(), 4);
        assert_eq!(Category::EXPENSE.len(), 11);
        assert!(Category::INCOME.iter().all(|c| c.is_income()));
        assert!(Category::EXPENSE.iter().all(|c| !c.is_income()));
    }

    #[test]
    fn test_category_tag_round_trip() {
        for c in Category::INCOME.iter().chain(Category::EXPENSE.iter()) {
            assert_eq!(c.tag().parse::<Category>().unwrap(), *c);
        }
        assert!("groceries".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_serde_uses_snake_case_tags() {
        let json = serde_json::to_string(&Category::OtherExpense).unwrap();
        assert_eq!(json, "\"other_expense\"");
        let t: TransactionType = serde_json::from_str("\"income\"").unwrap();
        assert_eq!(t, TransactionType::Income);
    }

    #[test]
    fn test_new_transaction_derives_type_and_abs_amount() {
        let t = NewTransaction::new(-42.5, "Groceries", Category::Food, date(2026, 3, 1));
        assert_eq!(t.amount, 42.5);
        assert_eq!(t.transaction_type, TransactionType::Expense);
    }

    #[test]
    fn test_update_category_rederives_type() {
        let now = Utc::now();
        let mut txn = NewTransaction::new(100.0, "Side gig", Category::OtherExpense, date(2026, 3, 1))
            .into_transaction("txn-1", now);
        txn.apply(
            TransactionUpdate {
                category: Some(Category::Freelance),
                notes: Some(Some("invoice #4".into())),
                ..Default::default()
            },
            now,
        );
        assert_eq!(txn.transaction_type, TransactionType::Income);
        assert_eq!(txn.notes.as_deref(), Some("invoice #4"));
    }
}

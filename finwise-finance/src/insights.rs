//! Dashboard views over the ledger: spending breakdown, monthly trend, health label.

use chrono::NaiveDate;
use finwise_core::time::{same_month, trailing_months};
use finwise_core::{Category, Transaction};
use serde::Serialize;
use std::collections::HashMap;

/// Categories shown in the spending breakdown
pub const TOP_CATEGORIES: usize = 6;

/// Months shown in the trend view
pub const TREND_MONTHS: u32 = 6;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySpend {
    pub category: Category,
    pub amount: f64,
}

/// Expense totals per category, largest first, at most `TOP_CATEGORIES` entries
pub fn spending_by_category(transactions: &[Transaction]) -> Vec<CategorySpend> {
    let mut totals: HashMap<Category, f64> = HashMap::new();
    for t in transactions.iter().filter(|t| t.is_expense()) {
        *totals.entry(t.category).or_insert(0.0) += t.amount;
    }

    let mut out: Vec<CategorySpend> = totals
        .into_iter()
        .map(|(category, amount)| CategorySpend { category, amount })
        .collect();
    // tie-break on the tag so output does not depend on hash order
    out.sort_by(|a, b| {
        b.amount
            .total_cmp(&a.amount)
            .then_with(|| a.category.cmp(&b.category))
    });
    out.truncate(TOP_CATEGORIES);
    out
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthSummary {
    /// First day of the month
    pub month: NaiveDate,
    pub income: f64,
    pub expenses: f64,
    pub savings: f64,
}

/// Income, expenses and savings for each of the last `months` calendar months
/// ending with the month of `as_of`, oldest first.
pub fn monthly_trend(transactions: &[Transaction], as_of: NaiveDate, months: u32) -> Vec<MonthSummary> {
    trailing_months(as_of, months)
        .into_iter()
        .map(|month| {
            let (income, expenses) = transactions
                .iter()
                .filter(|t| same_month(t.transaction_date, month))
                .fold((0.0, 0.0), |(inc, exp), t| {
                    if t.is_income() {
                        (inc + t.amount, exp)
                    } else {
                        (inc, exp + t.amount)
                    }
                });
            MonthSummary {
                month,
                income,
                expenses,
                savings: income - expenses,
            }
        })
        .collect()
}

/// Word shown next to a 0-100 score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HealthLabel {
    Excellent,
    Good,
    Fair,
    NeedsWork,
}

impl HealthLabel {
    pub fn from_score(score: u8) -> Self {
        match score {
            75.. => HealthLabel::Excellent,
            50..=74 => HealthLabel::Good,
            25..=49 => HealthLabel::Fair,
            _ => HealthLabel::NeedsWork,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthLabel::Excellent => "Excellent",
            HealthLabel::Good => "Good",
            HealthLabel::Fair => "Fair",
            HealthLabel::NeedsWork => "Needs Work",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use finwise_core::NewTransaction;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn txn(amount: f64, category: Category, on: NaiveDate) -> Transaction {
        NewTransaction::new(amount, "t", category, on).into_transaction("t", Utc::now())
    }

    #[test]
    fn test_spending_by_category_sorted_and_capped() {
        let d = date(2026, 3, 1);
        let mut txns = vec![txn(5000.0, Category::Salary, d)];
        for (i, c) in Category::EXPENSE.iter().enumerate() {
            txns.push(txn(10.0 * (i as f64 + 1.0), *c, d));
        }
        txns.push(txn(100.0, Category::Food, d));

        let spend = spending_by_category(&txns);
        assert_eq!(spend.len(), TOP_CATEGORIES);
        assert_eq!(spend[0].category, Category::Food);
        assert_eq!(spend[0].amount, 110.0);
        assert_eq!(spend[1].category, Category::OtherExpense);
        assert!(spend.iter().all(|s| s.category != Category::Salary));
    }

    #[test]
    fn test_monthly_trend() {
        let txns = vec![
            txn(1000.0, Category::Salary, date(2026, 2, 3)),
            txn(400.0, Category::Rent, date(2026, 2, 28)),
            txn(50.0, Category::Food, date(2026, 3, 31)),
            txn(999.0, Category::Food, date(2025, 12, 31)),
        ];
        let trend = monthly_trend(&txns, date(2026, 3, 10), 3);
        assert_eq!(trend.len(), 3);
        assert_eq!(trend[0].month, date(2026, 1, 1));
        assert_eq!(trend[0].expenses, 0.0);
        assert_eq!(trend[1].income, 1000.0);
        assert_eq!(trend[1].savings, 600.0);
        assert_eq!(trend[2].expenses, 50.0);
        assert_eq!(trend[2].savings, -50.0);
    }

    #[test]
    fn test_health_labels() {
        assert_eq!(HealthLabel::from_score(100), HealthLabel::Excellent);
        assert_eq!(HealthLabel::from_score(75), HealthLabel::Excellent);
        assert_eq!(HealthLabel::from_score(74), HealthLabel::Good);
        assert_eq!(HealthLabel::from_score(25), HealthLabel::Fair);
        assert_eq!(HealthLabel::from_score(24).as_str(), "Needs Work");
    }
}

//! Deterministic keyword rules mapping an imported description to a
//! transaction type and category.
//!
//! Rules are checked top to bottom and the first hit wins, so their order is
//! part of the behaviour ("uber eats" must be seen before "uber").

use finwise_core::{Category, TransactionType};

/// Result of classifying one description
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub transaction_type: TransactionType,
    pub category: Category,
}

impl Classification {
    /// Classification for a category picked by hand; the type follows the tag partition
    pub fn from_category(category: Category) -> Self {
        Self {
            transaction_type: category.transaction_type(),
            category,
        }
    }
}

const RULES: &[(&[&str], Category)] = &[
    (&["salary", "payroll", "direct deposit"], Category::Salary),
    (&["freelance", "consulting"], Category::Freelance),
    (&["dividend", "interest"], Category::Investments),
    (&["restaurant", "uber eats", "doordash", "grubhub"], Category::Food),
    (&["uber", "lyft", "gas", "fuel"], Category::Transport),
    (&["netflix", "spotify", "hulu", "disney"], Category::Subscriptions),
    (&["amazon", "walmart", "target"], Category::Shopping),
    (&["rent", "mortgage"], Category::Rent),
    (&["electric", "water", "internet", "utility"], Category::Bills),
];

/// Guess the type and category of an unlabeled row.
///
/// `signed_amount` must carry the sign from the source file; it only matters
/// when no keyword matches.
pub fn classify(description: &str, signed_amount: f64) -> Classification {
    let desc = description.to_lowercase();

    if let Some((_, category)) = RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| desc.contains(k)))
    {
        return Classification::from_category(*category);
    }

    if signed_amount >= 0.0 {
        Classification::from_category(Category::OtherIncome)
    } else {
        Classification::from_category(Category::OtherExpense)
    }
}

//! Action-item generator: turns a scored profile into prioritized recommendations.

use finwise_core::{
    ActionItem, ActionItemStore, FinancialProfile, NewActionItem, Result, RiskLevel, Session,
};
use tracing::info;

/// Months of expenses the emergency-fund item asks for
pub const EMERGENCY_FUND_MONTHS: u32 = 3;

const SAVINGS_TARGET: f64 = 10.0;
const DISCIPLINE_TARGET: u8 = 60;
const READINESS_FOR_INVESTING: u8 = 50;

/// Evaluate every rule against `profile`, in order. Several may fire; when
/// none do, a single "maintain" item is returned.
pub fn plan(profile: &FinancialProfile) -> Vec<NewActionItem> {
    let mut items = Vec::new();

    if profile.savings_rate < SAVINGS_TARGET {
        items.push(
            NewActionItem::new(
                1,
                "Increase Your Savings Rate",
                "Your current savings rate is below the recommended 10%. Try to reduce \
                 non-essential expenses and aim for at least 10% savings.",
            )
            .with_target(SAVINGS_TARGET)
            .with_progress(profile.savings_rate.max(0.0)),
        );
    }

    if profile.spending_discipline_score < DISCIPLINE_TARGET {
        items.push(
            NewActionItem::new(
                2,
                "Improve Spending Habits",
                "Create a monthly budget and track your expenses more closely. Consider \
                 using the 50/30/20 rule for budgeting.",
            )
            .with_target(f64::from(DISCIPLINE_TARGET))
            .with_progress(f64::from(profile.spending_discipline_score)),
        );
    }

    if profile.monthly_burn_rate > 0.0 && profile.total_income > 0.0 {
        let target = profile.monthly_burn_rate * f64::from(EMERGENCY_FUND_MONTHS);
        items.push(
            NewActionItem::new(
                3,
                "Build Emergency Fund",
                format!(
                    "Save at least {EMERGENCY_FUND_MONTHS} months of expenses (${}) for \
                     unexpected situations.",
                    format_amount(target)
                ),
            )
            .with_target(target),
        );
    }

    if profile.investment_readiness_score >= READINESS_FOR_INVESTING
        && profile.savings_rate >= SAVINGS_TARGET
    {
        items.push(NewActionItem::new(
            4,
            "Start Investing",
            investing_advice(profile.risk_level),
        ));
    }

    if items.is_empty() {
        items.push(NewActionItem::new(
            1,
            "Maintain Your Financial Health",
            "Great job! Keep tracking your expenses and reviewing your finances regularly.",
        ));
    }

    // stable: equal priorities keep generation order
    items.sort_by_key(|i| i.priority);
    items
}

fn investing_advice(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Aggressive => {
            "Consider a diversified portfolio with stocks and growth investments."
        }
        RiskLevel::Moderate => "Look into balanced funds with a mix of stocks and bonds.",
        RiskLevel::Conservative => {
            "Start with low-risk investments like bonds or money market funds."
        }
    }
}

/// Replace the user's action items with a fresh set generated from `profile`.
///
/// Completion flags do not survive: the old set is deleted before the new one
/// is inserted.
pub async fn regenerate(
    session: &Session,
    store: &dyn ActionItemStore,
    profile: &FinancialProfile,
) -> Result<Vec<ActionItem>> {
    let user = session.user_id()?;
    let items = plan(profile);

    store.delete_action_items(user).await?;
    let stored = store.insert_action_items(user, items).await?;
    info!(user = %user, count = stored.len(), "regenerated action items");
    Ok(stored)
}

/// Toggle one item's completion. Does not regenerate anything.
pub async fn set_completed(
    session: &Session,
    store: &dyn ActionItemStore,
    id: &str,
    is_completed: bool,
) -> Result<ActionItem> {
    let user = session.user_id()?;
    store.set_action_item_completed(user, id, is_completed).await
}

/// `1234.5` -> `1,234.50`, whole amounts drop the cents
pub fn format_amount(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let frac = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    if frac == 0 {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finwise_core::{Error, MemoryStore, UserId};

    fn profile(savings_rate: f64, discipline: u8, readiness: u8, burn: f64, income: f64) -> FinancialProfile {
        let mut p = FinancialProfile::empty("u");
        p.savings_rate = savings_rate;
        p.spending_discipline_score = discipline;
        p.investment_readiness_score = readiness;
        p.monthly_burn_rate = burn;
        p.total_income = income;
        p
    }

    fn titles(items: &[NewActionItem]) -> Vec<&str> {
        items.iter().map(|i| i.title.as_str()).collect()
    }

    #[test]
    fn test_struggling_profile_gets_three_items() {
        let items = plan(&profile(-5.0, 20, 20, 1000.0, 2000.0));
        assert_eq!(
            titles(&items),
            ["Increase Your Savings Rate", "Improve Spending Habits", "Build Emergency Fund"]
        );
        assert_eq!(items[0].current_progress, 0.0);
        assert_eq!(items[0].target_amount, Some(10.0));
        assert_eq!(items[1].current_progress, 20.0);
        assert_eq!(items[2].target_amount, Some(3000.0));
        assert!(items[2].description.contains("($3,000)"));
    }

    #[test]
    fn test_healthy_profile_starts_investing() {
        let mut p = profile(25.0, 100, 100, 0.0, 0.0);
        p.risk_level = RiskLevel::Aggressive;
        let items = plan(&p);
        assert_eq!(titles(&items), ["Start Investing"]);
        assert_eq!(items[0].priority, 4);
        assert_eq!(items[0].target_amount, None);
        assert!(items[0].description.contains("growth"));

        p.risk_level = RiskLevel::Conservative;
        assert!(plan(&p)[0].description.contains("low-risk"));
    }

    #[test]
    fn test_fallback_when_nothing_fires() {
        // rate >= 10, discipline >= 60, no burn, readiness < 50
        let items = plan(&profile(12.0, 70, 40, 0.0, 0.0));
        assert_eq!(titles(&items), ["Maintain Your Financial Health"]);
        assert_eq!(items[0].priority, 1);
        assert_eq!(items[0].target_amount, None);
    }

    #[test]
    fn test_emergency_fund_needs_income() {
        let items = plan(&profile(12.0, 70, 40, 500.0, 0.0));
        assert_eq!(titles(&items), ["Maintain Your Financial Health"]);
    }

    #[test]
    fn test_empty_profile() {
        let items = plan(&FinancialProfile::empty("u"));
        assert_eq!(titles(&items), ["Increase Your Savings Rate", "Improve Spending Habits"]);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(3000.0), "3,000");
        assert_eq!(format_amount(1234567.891), "1,234,567.89");
        assert_eq!(format_amount(999.5), "999.50");
        assert_eq!(format_amount(0.0), "0");
    }

    #[tokio::test]
    async fn test_regenerate_resets_completion() {
        let store = MemoryStore::new();
        let session = Session::for_user(UserId::new("u"));
        let p = profile(5.0, 40, 20, 800.0, 3000.0);

        let first = regenerate(&session, &store, &p).await.unwrap();
        set_completed(&session, &store, &first[0].id, true).await.unwrap();

        let second = regenerate(&session, &store, &p).await.unwrap();
        let listed = store.list_action_items(&UserId::new("u")).await.unwrap();
        assert_eq!(listed.len(), first.len());
        assert!(listed.iter().all(|i| !i.is_completed));
        let key = |items: &[ActionItem]| {
            items
                .iter()
                .map(|i| (i.title.clone(), i.priority))
                .collect::<Vec<_>>()
        };
        assert_eq!(key(&first), key(&second));
    }

    #[tokio::test]
    async fn test_regenerate_requires_user() {
        let store = MemoryStore::new();
        let err = regenerate(&Session::anonymous(), &store, &FinancialProfile::empty("u"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AuthRequired));
    }

    #[tokio::test]
    async fn test_toggle_unknown_item() {
        let store = MemoryStore::new();
        let session = Session::for_user(UserId::new("u"));
        let err = set_completed(&session, &store, "act-000042", true).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}

//! Scoring engine: trailing-window totals, sub-scores, health score and risk tier.

use chrono::{DateTime, NaiveDate, Utc};
use finwise_core::time::window_start;
use finwise_core::{FinancialProfile, ProfileScores, ProfileStore, Result, RiskLevel, Session, Transaction};
use tracing::{debug, info};

/// Length of the trailing window, in calendar months
pub const WINDOW_MONTHS: u32 = 3;

/// Score `transactions` as of `as_of`.
///
/// Only transactions dated on or after the first day of the month
/// `WINDOW_MONTHS` before `as_of` are counted.
pub fn score(transactions: &[Transaction], as_of: NaiveDate) -> ProfileScores {
    let start = window_start(as_of, WINDOW_MONTHS);
    let recent = transactions.iter().filter(|t| t.transaction_date >= start);

    let (total_income, total_expenses) = recent.fold((0.0, 0.0), |(inc, exp), t| {
        if t.is_income() {
            (inc + t.amount, exp)
        } else {
            (inc, exp + t.amount)
        }
    });

    let months = f64::from(WINDOW_MONTHS);
    let monthly_income = total_income / months;
    let monthly_expenses = total_expenses / months;
    // thresholds below compare this unrounded value
    let savings_rate = if monthly_income > 0.0 {
        (monthly_income - monthly_expenses) / monthly_income * 100.0
    } else {
        0.0
    };

    let spending = spending_discipline(savings_rate);
    let stability = financial_stability(savings_rate);
    // reads the stability computed just above
    let readiness = investment_readiness(savings_rate, stability);
    let overall = overall_health(spending, stability, readiness);
    let risk_level = derive_risk_level(overall, savings_rate);

    debug!(
        %start,
        total_income,
        total_expenses,
        savings_rate,
        spending,
        stability,
        readiness,
        overall,
        risk = %risk_level,
        "scored ledger"
    );

    ProfileScores {
        spending_discipline_score: spending,
        financial_stability_score: stability,
        investment_readiness_score: readiness,
        overall_health_score: overall,
        risk_level,
        total_income,
        total_expenses,
        savings_rate: round_cents(savings_rate),
        monthly_burn_rate: monthly_expenses,
    }
}

/// Score the snapshot and persist the result with one write.
///
/// Fails with `AuthRequired` before computing anything when there is no user.
pub async fn recompute(
    session: &Session,
    store: &dyn ProfileStore,
    transactions: &[Transaction],
    now: DateTime<Utc>,
) -> Result<FinancialProfile> {
    recompute_as_of(session, store, transactions, now.date_naive(), now).await
}

/// Like [`recompute`], with the window anchored on a caller-chosen calendar
/// day (usually the user's local date) while `now` is only the stamp.
pub async fn recompute_as_of(
    session: &Session,
    store: &dyn ProfileStore,
    transactions: &[Transaction],
    as_of: NaiveDate,
    now: DateTime<Utc>,
) -> Result<FinancialProfile> {
    let user = session.user_id()?;
    let scores = score(transactions, as_of);
    let profile = store.update_scores(user, &scores, now).await?;
    info!(
        user = %user,
        health = profile.overall_health_score,
        risk = %profile.risk_level,
        "recomputed financial profile"
    );
    Ok(profile)
}

pub fn spending_discipline(savings_rate: f64) -> u8 {
    let score = if savings_rate >= 20.0 {
        100
    } else if savings_rate >= 10.0 {
        70
    } else if savings_rate >= 0.0 {
        40
    } else {
        20
    };
    clamp_score(score)
}

pub fn financial_stability(savings_rate: f64) -> u8 {
    let score = if savings_rate >= 30.0 {
        100
    } else if savings_rate >= 15.0 {
        75
    } else if savings_rate >= 5.0 {
        50
    } else {
        25
    };
    clamp_score(score)
}

pub fn investment_readiness(savings_rate: f64, financial_stability: u8) -> u8 {
    let score = if savings_rate >= 25.0 && financial_stability >= 75 {
        100
    } else if savings_rate >= 15.0 && financial_stability >= 50 {
        70
    } else if savings_rate >= 10.0 {
        40
    } else {
        20
    };
    clamp_score(score)
}

/// Rounded mean of the three sub-scores
pub fn overall_health(spending: u8, stability: u8, readiness: u8) -> u8 {
    let sum = u32::from(spending) + u32::from(stability) + u32::from(readiness);
    let mean = (f64::from(sum) / 3.0).round() as i64;
    clamp_score(mean)
}

pub fn derive_risk_level(overall_health: u8, savings_rate: f64) -> RiskLevel {
    if overall_health >= 75 && savings_rate >= 20.0 {
        RiskLevel::Aggressive
    } else if overall_health >= 50 && savings_rate >= 10.0 {
        RiskLevel::Moderate
    } else {
        RiskLevel::Conservative
    }
}

fn clamp_score(score: i64) -> u8 {
    score.clamp(0, 100) as u8
}

/// Round to 2 decimal places, halves toward positive infinity
fn round_cents(value: f64) -> f64 {
    (value * 100.0 + 0.5).floor() / 100.0
}

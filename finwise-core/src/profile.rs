//! Derived per-user financial profile

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Coarse investment-risk classification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    #[default]
    Conservative,
    Moderate,
    Aggressive,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Conservative => "conservative",
            RiskLevel::Moderate => "moderate",
            RiskLevel::Aggressive => "aggressive",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            RiskLevel::Conservative => "Conservative Investor",
            RiskLevel::Moderate => "Balanced Investor",
            RiskLevel::Aggressive => "Aggressive Investor",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            RiskLevel::Conservative => {
                "You prioritize capital preservation over high returns and prefer stable, low-risk investments."
            }
            RiskLevel::Moderate => {
                "You seek a balance between growth and safety and can tolerate some market fluctuation."
            }
            RiskLevel::Aggressive => {
                "You focus on maximizing returns and are comfortable with significant market volatility."
            }
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "conservative" => Ok(RiskLevel::Conservative),
            "moderate" => Ok(RiskLevel::Moderate),
            "aggressive" => Ok(RiskLevel::Aggressive),
            other => Err(Error::InvalidData(format!("unknown risk level: {other}"))),
        }
    }
}

/// Output of one scoring pass, before it is written to the profile
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ProfileScores {
    pub spending_discipline_score: u8,
    pub financial_stability_score: u8,
    pub investment_readiness_score: u8,
    pub overall_health_score: u8,
    pub risk_level: RiskLevel,
    pub total_income: f64,
    pub total_expenses: f64,
    /// Percent, rounded to 2 decimal places; negative when spending exceeds income
    pub savings_rate: f64,
    /// Average monthly expenses over the window
    pub monthly_burn_rate: f64,
}

/// One per user. Recomputed from the ledger; only `risk_level` is ever set directly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FinancialProfile {
    pub user_id: String,
    pub spending_discipline_score: u8,
    pub financial_stability_score: u8,
    pub investment_readiness_score: u8,
    pub overall_health_score: u8,
    pub risk_level: RiskLevel,
    pub total_income: f64,
    pub total_expenses: f64,
    pub savings_rate: f64,
    pub monthly_burn_rate: f64,
    pub last_calculated_at: Option<DateTime<Utc>>,
}

impl FinancialProfile {
    /// Empty profile created on first access
    pub fn empty(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            spending_discipline_score: 0,
            financial_stability_score: 0,
            investment_readiness_score: 0,
            overall_health_score: 0,
            risk_level: RiskLevel::default(),
            total_income: 0.0,
            total_expenses: 0.0,
            savings_rate: 0.0,
            monthly_burn_rate: 0.0,
            last_calculated_at: None,
        }
    }

    /// Overwrite every derived field. `risk_level` is included: a recompute
    /// replaces any earlier quiz result.
    pub fn apply_scores(&mut self, scores: &ProfileScores, calculated_at: DateTime<Utc>) {
        self.spending_discipline_score = scores.spending_discipline_score;
        self.financial_stability_score = scores.financial_stability_score;
        self.investment_readiness_score = scores.investment_readiness_score;
        self.overall_health_score = scores.overall_health_score;
        self.risk_level = scores.risk_level;
        self.total_income = scores.total_income;
        self.total_expenses = scores.total_expenses;
        self.savings_rate = scores.savings_rate;
        self.monthly_burn_rate = scores.monthly_burn_rate;
        self.last_calculated_at = Some(calculated_at);
    }

    pub fn scores(&self) -> ProfileScores {
        ProfileScores {
            spending_discipline_score: self.spending_discipline_score,
            financial_stability_score: self.financial_stability_score,
            investment_readiness_score: self.investment_readiness_score,
            overall_health_score: self.overall_health_score,
            risk_level: self.risk_level,
            total_income: self.total_income,
            total_expenses: self.total_expenses,
            savings_rate: self.savings_rate,
            monthly_burn_rate: self.monthly_burn_rate,
        }
    }
}

//! finwise-finance: categorization, CSV import, scoring, risk quiz, action items,
//! dashboard insights and chat context

pub mod action_items;
pub mod category_rules;
pub mod chat;
pub mod import;
pub mod insights;
pub mod risk_quiz;
pub mod scoring;

pub use action_items::{plan, regenerate, set_completed};
pub use category_rules::{Classification, classify};
pub use chat::{FinancialContext, StreamDecoder, StreamEvent, system_prompt};
pub use import::{ImportProposal, ParsedImportRow, commit_import, propose_import};
pub use insights::{CategorySpend, HealthLabel, MonthSummary, monthly_trend, spending_by_category};
pub use risk_quiz::{QuizAnswer, QuizState, RiskQuiz, save_risk_level, score_answers};
pub use scoring::{recompute, recompute_as_of, score};

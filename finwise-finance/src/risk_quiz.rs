//! Risk tolerance quiz: a fixed run of three-option questions scored 1..=3.
//!
//! The question text lives with the presentation layer; this module only
//! knows question ids, the cursor, and the scoring rule.

use finwise_core::{Error, FinancialProfile, ProfileStore, Result, RiskLevel, Session};
use std::collections::BTreeMap;
use tracing::info;

/// Number of questions in the quiz
pub const RISK_QUIZ_LENGTH: usize = 8;

/// Averages at or below this are conservative
const CONSERVATIVE_MAX_AVG: f64 = 1.5;
/// Averages at or below this (and above the conservative band) are moderate
const MODERATE_MAX_AVG: f64 = 2.3;

/// One of the three options every question offers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum QuizAnswer {
    Conservative = 1,
    Moderate = 2,
    Aggressive = 3,
}

impl QuizAnswer {
    pub fn score(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for QuizAnswer {
    type Error = Error;

    fn try_from(score: u8) -> Result<Self> {
        match score {
            1 => Ok(QuizAnswer::Conservative),
            2 => Ok(QuizAnswer::Moderate),
            3 => Ok(QuizAnswer::Aggressive),
            other => Err(Error::InvalidData(format!("quiz answers score 1-3, got {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum QuizState {
    InProgress,
    Completed(RiskLevel),
}

/// Quiz session: a cursor over question ids plus the answers recorded so far
#[derive(Debug, Clone)]
pub struct RiskQuiz {
    question_ids: Vec<u32>,
    current: usize,
    answers: BTreeMap<u32, QuizAnswer>,
    state: QuizState,
}

impl Default for RiskQuiz {
    fn default() -> Self {
        Self::new()
    }
}

impl RiskQuiz {
    /// Standard quiz with question ids `1..=RISK_QUIZ_LENGTH`
    pub fn new() -> Self {
        Self::with_questions((1..=RISK_QUIZ_LENGTH as u32).collect())
    }

    pub fn with_questions(question_ids: Vec<u32>) -> Self {
        Self {
            question_ids,
            current: 0,
            answers: BTreeMap::new(),
            state: QuizState::InProgress,
        }
    }

    pub fn len(&self) -> usize {
        self.question_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.question_ids.is_empty()
    }

    pub fn state(&self) -> &QuizState {
        &self.state
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_question_id(&self) -> Option<u32> {
        self.question_ids.get(self.current).copied()
    }

    /// Percent through the quiz, counting the current question
    pub fn progress(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        (self.current + 1) as f64 / self.len() as f64 * 100.0
    }

    pub fn answer(&self, question_id: u32) -> Option<QuizAnswer> {
        self.answers.get(&question_id).copied()
    }

    pub fn answered(&self) -> usize {
        self.answers.len()
    }

    /// Record or overwrite an answer. The cursor does not move.
    pub fn select_answer(&mut self, question_id: u32, answer: QuizAnswer) -> Result<()> {
        if !self.question_ids.contains(&question_id) {
            return Err(Error::InvalidData(format!("unknown quiz question {question_id}")));
        }
        self.answers.insert(question_id, answer);
        Ok(())
    }

    pub fn is_current_answered(&self) -> bool {
        self.current_question_id()
            .is_some_and(|id| self.answers.contains_key(&id))
    }

    pub fn go_to_next(&mut self) {
        if self.current + 1 < self.len() {
            self.current += 1;
        }
    }

    pub fn go_to_previous(&mut self) {
        if self.current > 0 {
            self.current -= 1;
        }
    }

    pub fn can_submit(&self) -> bool {
        !self.is_empty() && self.answers.len() == self.len()
    }

    /// Score the answers and move to `Completed`.
    pub fn submit(&mut self) -> Result<RiskLevel> {
        if !self.can_submit() {
            return Err(Error::IncompleteAnswers {
                answered: self.answers.len(),
                required: self.len(),
            });
        }
        let total: u32 = self.answers.values().map(|a| u32::from(a.score())).sum();
        let level = level_for_total(total, self.len());
        self.state = QuizState::Completed(level);
        Ok(level)
    }

    pub fn reset(&mut self) {
        self.current = 0;
        self.answers.clear();
        self.state = QuizState::InProgress;
    }
}

/// Map a quiz total to a tier using the average over `question_count` questions
pub fn level_for_total(total: u32, question_count: usize) -> RiskLevel {
    let avg = f64::from(total) / question_count.max(1) as f64;
    if avg <= CONSERVATIVE_MAX_AVG {
        RiskLevel::Conservative
    } else if avg <= MODERATE_MAX_AVG {
        RiskLevel::Moderate
    } else {
        RiskLevel::Aggressive
    }
}

/// Score a complete answer list (one `1..=3` score per question, in order).
pub fn score_answers(scores: &[u8]) -> Result<RiskLevel> {
    if scores.len() != RISK_QUIZ_LENGTH {
        return Err(Error::IncompleteAnswers {
            answered: scores.len().min(RISK_QUIZ_LENGTH),
            required: RISK_QUIZ_LENGTH,
        });
    }
    let mut quiz = RiskQuiz::new();
    for (i, score) in scores.iter().enumerate() {
        quiz.select_answer(i as u32 + 1, QuizAnswer::try_from(*score)?)?;
    }
    quiz.submit()
}

/// Store a quiz result. Only `risk_level` changes; scores are left alone.
pub async fn save_risk_level(
    session: &Session,
    store: &dyn ProfileStore,
    level: RiskLevel,
) -> Result<FinancialProfile> {
    let user = session.user_id()?;
    let profile = store.update_risk_level(user, level).await?;
    info!(user = %user, risk = %level, "saved quiz risk level");
    Ok(profile)
}

//! Recommended actions generated from a financial profile

use serde::{Deserialize, Serialize};

/// Targets at or below this value are percentage-style goals, larger ones are currency.
pub const PERCENT_TARGET_CEILING: f64 = 100.0;

/// A stored recommendation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionItem {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Lower is more urgent
    pub priority: u8,
    pub is_completed: bool,
    pub target_amount: Option<f64>,
    pub current_progress: f64,
}

impl ActionItem {
    pub fn progress_display(&self) -> ProgressDisplay {
        ProgressDisplay::for_target(self.target_amount, self.current_progress)
    }
}

/// Insert payload produced by the generator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewActionItem {
    pub title: String,
    pub description: String,
    pub priority: u8,
    pub target_amount: Option<f64>,
    pub current_progress: f64,
}

impl NewActionItem {
    pub fn new(priority: u8, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            priority,
            target_amount: None,
            current_progress: 0.0,
        }
    }

    pub fn with_target(mut self, target: f64) -> Self {
        self.target_amount = Some(target);
        self
    }

    pub fn with_progress(mut self, progress: f64) -> Self {
        self.current_progress = progress;
        self
    }

    /// Stored items always start incomplete
    pub fn into_item(self, id: impl Into<String>) -> ActionItem {
        ActionItem {
            id: id.into(),
            title: self.title,
            description: self.description,
            priority: self.priority,
            is_completed: false,
            target_amount: self.target_amount,
            current_progress: self.current_progress,
        }
    }
}

/// How a display layer should render an item's progress
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProgressDisplay {
    None,
    /// `percent` is progress/target × 100, capped at 100
    Percentage { current: f64, target: f64, percent: f64 },
    Currency { current: f64, target: f64, percent: f64 },
}

impl ProgressDisplay {
    pub fn for_target(target: Option<f64>, current: f64) -> Self {
        let Some(target) = target else {
            return ProgressDisplay::None;
        };
        let percent = if target > 0.0 {
            (current / target * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };
        if target <= PERCENT_TARGET_CEILING {
            ProgressDisplay::Percentage { current, target, percent }
        } else {
            ProgressDisplay::Currency { current, target, percent }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_target_is_percentage() {
        match ProgressDisplay::for_target(Some(10.0), 5.0) {
            ProgressDisplay::Percentage { percent, .. } => assert_eq!(percent, 50.0),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_boundary_100_is_percentage_and_above_is_currency() {
        assert!(matches!(
            ProgressDisplay::for_target(Some(100.0), 0.0),
            ProgressDisplay::Percentage { .. }
        ));
        assert!(matches!(
            ProgressDisplay::for_target(Some(100.01), 0.0),
            ProgressDisplay::Currency { .. }
        ));
        assert_eq!(ProgressDisplay::for_target(None, 3.0), ProgressDisplay::None);
    }

    #[test]
    fn test_new_item_starts_incomplete() {
        let item = NewActionItem::new(2, "t", "d").with_target(60.0).into_item("a-1");
        assert!(!item.is_completed);
        assert_eq!(item.target_amount, Some(60.0));
    }
}

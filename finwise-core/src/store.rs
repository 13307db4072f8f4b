//! Store ports for the external persistence service.
//!
//! Adapters implement these traits; the engine only ever talks to them through
//! a `&dyn` reference and never retries a failed call.

use async_trait::async_trait;

use crate::action_item::{ActionItem, NewActionItem};
use crate::error::Result;
use crate::finance::{NewTransaction, Transaction, TransactionUpdate};
use crate::profile::{FinancialProfile, ProfileScores, RiskLevel};
use crate::session::UserId;

#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// All transactions for the user, newest `transaction_date` first
    async fn list_transactions(&self, user: &UserId) -> Result<Vec<Transaction>>;

    async fn insert_transaction(&self, user: &UserId, txn: NewTransaction) -> Result<Transaction>;

    /// Insert a batch; either every row is stored or none is
    async fn insert_transactions(
        &self,
        user: &UserId,
        txns: Vec<NewTransaction>,
    ) -> Result<Vec<Transaction>>;

    async fn update_transaction(
        &self,
        user: &UserId,
        id: &str,
        update: TransactionUpdate,
    ) -> Result<Transaction>;

    async fn delete_transaction(&self, user: &UserId, id: &str) -> Result<()>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Read the profile, creating an empty one on first access
    async fn get_or_create_profile(&self, user: &UserId) -> Result<FinancialProfile>;

    /// Overwrite all derived fields and stamp `last_calculated_at`
    async fn update_scores(
        &self,
        user: &UserId,
        scores: &ProfileScores,
        calculated_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<FinancialProfile>;

    /// Overwrite only the risk level
    async fn update_risk_level(&self, user: &UserId, level: RiskLevel) -> Result<FinancialProfile>;
}

#[async_trait]
pub trait ActionItemStore: Send + Sync {
    /// Items ordered by priority, ties in insertion order
    async fn list_action_items(&self, user: &UserId) -> Result<Vec<ActionItem>>;

    async fn delete_action_items(&self, user: &UserId) -> Result<()>;

    async fn insert_action_items(
        &self,
        user: &UserId,
        items: Vec<NewActionItem>,
    ) -> Result<Vec<ActionItem>>;

    async fn set_action_item_completed(
        &self,
        user: &UserId,
        id: &str,
        is_completed: bool,
    ) -> Result<ActionItem>;
}

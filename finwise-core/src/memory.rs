//! In-memory adapter for all three store ports.
//!
//! State can be exported as a [`LedgerSnapshot`] and restored later, which is
//! how the CLI persists it between runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use crate::action_item::{ActionItem, NewActionItem};
use crate::error::{Error, Result};
use crate::finance::{NewTransaction, Transaction, TransactionUpdate};
use crate::profile::{FinancialProfile, ProfileScores, RiskLevel};
use crate::session::UserId;
use crate::store::{ActionItemStore, ProfileStore, TransactionStore};

/// Everything one user owns
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserLedger {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub profile: Option<FinancialProfile>,
    #[serde(default)]
    pub action_items: Vec<ActionItem>,
}

/// Serializable state of a [`MemoryStore`]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LedgerSnapshot {
    #[serde(default)]
    pub next_id: u64,
    #[serde(default)]
    pub users: BTreeMap<String, UserLedger>,
}

impl LedgerSnapshot {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{:06}", self.next_id)
    }

    fn ledger_mut(&mut self, user: &UserId) -> &mut UserLedger {
        self.users.entry(user.as_str().to_string()).or_default()
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<LedgerSnapshot>,
    reject_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Self {
        Self {
            state: RwLock::new(snapshot),
            reject_writes: AtomicBool::new(false),
        }
    }

    pub async fn snapshot(&self) -> LedgerSnapshot {
        self.state.read().await.clone()
    }

    /// Make every subsequent write fail with [`Error::Store`]
    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<()> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(Error::Store("write rejected: store is read-only".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl TransactionStore for MemoryStore {
    async fn list_transactions(&self, user: &UserId) -> Result<Vec<Transaction>> {
        let state = self.state.read().await;
        let mut txns = state
            .users
            .get(user.as_str())
            .map(|l| l.transactions.clone())
            .unwrap_or_default();
        txns.sort_by_key(|t| Reverse(t.transaction_date));
        Ok(txns)
    }

    async fn insert_transaction(&self, user: &UserId, txn: NewTransaction) -> Result<Transaction> {
        let mut stored = self.insert_transactions(user, vec![txn]).await?;
        stored
            .pop()
            .ok_or_else(|| Error::Store("insert returned no rows".to_string()))
    }

    async fn insert_transactions(
        &self,
        user: &UserId,
        txns: Vec<NewTransaction>,
    ) -> Result<Vec<Transaction>> {
        self.check_writable()?;
        let now = Utc::now();
        let mut state = self.state.write().await;
        let stored: Vec<Transaction> = txns
            .into_iter()
            .map(|t| {
                let id = state.next_id("txn");
                t.into_transaction(id, now)
            })
            .collect();
        state.ledger_mut(user).transactions.extend(stored.iter().cloned());
        Ok(stored)
    }

    async fn update_transaction(
        &self,
        user: &UserId,
        id: &str,
        update: TransactionUpdate,
    ) -> Result<Transaction> {
        self.check_writable()?;
        let mut state = self.state.write().await;
        let txn = state
            .users
            .get_mut(user.as_str())
            .and_then(|l| l.transactions.iter_mut().find(|t| t.id == id))
            .ok_or_else(|| Error::NotFound(format!("transaction {id}")))?;
        txn.apply(update, Utc::now());
        Ok(txn.clone())
    }

    async fn delete_transaction(&self, user: &UserId, id: &str) -> Result<()> {
        self.check_writable()?;
        let mut state = self.state.write().await;
        let txns = state
            .users
            .get_mut(user.as_str())
            .map(|l| &mut l.transactions)
            .ok_or_else(|| Error::NotFound(format!("transaction {id}")))?;
        let before = txns.len();
        txns.retain(|t| t.id != id);
        if txns.len() == before {
            return Err(Error::NotFound(format!("transaction {id}")));
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn get_or_create_profile(&self, user: &UserId) -> Result<FinancialProfile> {
        if let Some(profile) = self
            .state
            .read()
            .await
            .users
            .get(user.as_str())
            .and_then(|l| l.profile.clone())
        {
            return Ok(profile);
        }
        self.check_writable()?;
        let mut state = self.state.write().await;
        let ledger = state.ledger_mut(user);
        Ok(ledger
            .profile
            .get_or_insert_with(|| FinancialProfile::empty(user.as_str()))
            .clone())
    }

    async fn update_scores(
        &self,
        user: &UserId,
        scores: &ProfileScores,
        calculated_at: DateTime<Utc>,
    ) -> Result<FinancialProfile> {
        self.check_writable()?;
        let mut state = self.state.write().await;
        let profile = state
            .ledger_mut(user)
            .profile
            .get_or_insert_with(|| FinancialProfile::empty(user.as_str()));
        profile.apply_scores(scores, calculated_at);
        Ok(profile.clone())
    }

    async fn update_risk_level(&self, user: &UserId, level: RiskLevel) -> Result<FinancialProfile> {
        self.check_writable()?;
        let mut state = self.state.write().await;
        let profile = state
            .ledger_mut(user)
            .profile
            .get_or_insert_with(|| FinancialProfile::empty(user.as_str()));
        profile.risk_level = level;
        Ok(profile.clone())
    }
}

#[async_trait]
impl ActionItemStore for MemoryStore {
    async fn list_action_items(&self, user: &UserId) -> Result<Vec<ActionItem>> {
        let state = self.state.read().await;
        let mut items = state
            .users
            .get(user.as_str())
            .map(|l| l.action_items.clone())
            .unwrap_or_default();
        items.sort_by_key(|i| i.priority);
        Ok(items)
    }

    async fn delete_action_items(&self, user: &UserId) -> Result<()> {
        self.check_writable()?;
        let mut state = self.state.write().await;
        if let Some(ledger) = state.users.get_mut(user.as_str()) {
            ledger.action_items.clear();
        }
        Ok(())
    }

    async fn insert_action_items(
        &self,
        user: &UserId,
        items: Vec<NewActionItem>,
    ) -> Result<Vec<ActionItem>> {
        self.check_writable()?;
        let mut state = self.state.write().await;
        let stored: Vec<ActionItem> = items
            .into_iter()
            .map(|i| {
                let id = state.next_id("act");
                i.into_item(id)
            })
            .collect();
        state.ledger_mut(user).action_items.extend(stored.iter().cloned());
        Ok(stored)
    }

    async fn set_action_item_completed(
        &self,
        user: &UserId,
        id: &str,
        is_completed: bool,
    ) -> Result<ActionItem> {
        self.check_writable()?;
        let mut state = self.state.write().await;
        let item = state
            .users
            .get_mut(user.as_str())
            .and_then(|l| l.action_items.iter_mut().find(|i| i.id == id))
            .ok_or_else(|| Error::NotFound(format!("action item {id}")))?;
        item.is_completed = is_completed;
        Ok(item.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finance::Category;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_transactions_listed_newest_first_and_scoped_per_user() {
        let store = MemoryStore::new();
        let alice = UserId::new("alice");
        let bob = UserId::new("bob");

        store
            .insert_transactions(
                &alice,
                vec![
                    NewTransaction::new(10.0, "old", Category::Food, date(2026, 1, 1)),
                    NewTransaction::new(20.0, "new", Category::Food, date(2026, 3, 1)),
                ],
            )
            .await
            .unwrap();
        store
            .insert_transaction(&bob, NewTransaction::new(5.0, "bob", Category::Food, date(2026, 2, 1)))
            .await
            .unwrap();

        let txns = store.list_transactions(&alice).await.unwrap();
        assert_eq!(txns.len(), 2);
        assert_eq!(txns[0].description, "new");
        assert_eq!(store.list_transactions(&bob).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_and_delete_unknown_id() {
        let store = MemoryStore::new();
        let user = UserId::new("u");
        let err = store.delete_transaction(&user, "txn-999999").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        let err = store
            .update_transaction(&user, "nope", TransactionUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        let err = store
            .set_action_item_completed(&user, "act-000001", true)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        store.delete_action_items(&user).await.unwrap();
        // misses leave no trace of the user behind
        assert!(store.snapshot().await.users.is_empty());
    }

    #[tokio::test]
    async fn test_profile_created_on_first_access() {
        let store = MemoryStore::new();
        let user = UserId::new("u");
        let p = store.get_or_create_profile(&user).await.unwrap();
        assert_eq!(p.user_id, "u");
        let p = store.update_risk_level(&user, RiskLevel::Aggressive).await.unwrap();
        assert_eq!(p.risk_level, RiskLevel::Aggressive);
        assert_eq!(store.get_or_create_profile(&user).await.unwrap().risk_level, RiskLevel::Aggressive);
    }

    #[tokio::test]
    async fn test_rejected_writes_surface_store_error() {
        let store = MemoryStore::new();
        store.set_reject_writes(true);
        let err = store
            .insert_transaction(
                &UserId::new("u"),
                NewTransaction::new(1.0, "x", Category::Food, date(2026, 1, 1)),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Store(_)));
    }

    #[tokio::test]
    async fn test_snapshot_round_trip_through_json() {
        let store = MemoryStore::new();
        let user = UserId::new("u");
        store
            .insert_action_items(&user, vec![NewActionItem::new(3, "b", ""), NewActionItem::new(1, "a", "")])
            .await
            .unwrap();

        let json = serde_json::to_string(&store.snapshot().await).unwrap();
        let restored = MemoryStore::from_snapshot(serde_json::from_str(&json).unwrap());
        let items = restored.list_action_items(&user).await.unwrap();
        assert_eq!(items.iter().map(|i| i.title.as_str()).collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(restored.snapshot().await.next_id, 2);
    }
}

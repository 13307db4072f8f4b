//! finwise-core: domain types, errors, and store ports for the FinWise engine

pub mod action_item;
pub mod error;
pub mod finance;
pub mod memory;
pub mod profile;
pub mod session;
pub mod store;
pub mod time;

pub use action_item::{ActionItem, NewActionItem, ProgressDisplay};
pub use error::{Error, Result};
pub use finance::{Category, NewTransaction, Transaction, TransactionType, TransactionUpdate};
pub use memory::{LedgerSnapshot, MemoryStore};
pub use profile::{FinancialProfile, ProfileScores, RiskLevel};
pub use session::{Session, UserId};
pub use store::{ActionItemStore, ProfileStore, TransactionStore};

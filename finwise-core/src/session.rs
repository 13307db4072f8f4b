//! Caller identity. Every store operation is scoped to one user.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who is calling. Anonymous sessions fail every operation that reads or writes user data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    user: Option<UserId>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self { user: None }
    }

    pub fn for_user(user: UserId) -> Self {
        Self { user: Some(user) }
    }

    /// Build from a possibly blank id; blank means anonymous
    pub fn from_id(id: &str) -> Self {
        let id = id.trim();
        if id.is_empty() {
            Self::anonymous()
        } else {
            Self::for_user(UserId::new(id))
        }
    }

    pub fn user_id(&self) -> Result<&UserId> {
        self.user.as_ref().ok_or(Error::AuthRequired)
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

//! Caller identity and contact lookup
//!
//! Identity is established by the authentication collaborator and passed
//! explicitly into every application call.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::DomainResult;

/// Caller role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Traveler,
}

/// Authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: String,
    pub role: Role,
}

impl Actor {
    pub fn traveler(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role: Role::Traveler,
        }
    }

    pub fn admin(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role: Role::Admin,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Owner of the resource, or an administrator
    pub fn may_act_for(&self, owner_id: &str) -> bool {
        self.is_admin() || self.user_id == owner_id
    }
}

/// Where notifications for a user are sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    pub email: String,
    pub name: Option<String>,
}

/// Read-only view of the identity collaborator's profile data
#[async_trait]
pub trait ContactDirectory: Send + Sync {
    async fn find_contact(&self, user_id: &str) -> DomainResult<Option<Contact>>;
}

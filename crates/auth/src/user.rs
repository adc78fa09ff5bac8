//! Account holder records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use rogerbank_core::UserId;

use crate::credentials::Email;

/// A persisted account holder.
///
/// # Invariants
/// - `email` is unique across users.
/// - `balance` is never negative and only changes through ledger postings.
/// - `password_hash` is a PHC string and never leaves the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub password_hash: String,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// A freshly registered user starts with a zero balance.
    pub fn register(new_user: NewUser, created_at: DateTime<Utc>) -> Self {
        Self {
            id: UserId::new(),
            name: new_user.name,
            email: new_user.email,
            password_hash: new_user.password_hash,
            balance: Decimal::ZERO,
            created_at,
        }
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.to_string(),
            balance: self.balance,
        }
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            name: self.name.clone(),
            email: self.email.to_string(),
        }
    }
}

/// Validated registration input, password already hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: Email,
    pub password_hash: String,
}

/// Public view of a user (no credentials). Serialized as-is by the user
/// listing routes; the balance goes out as a JSON number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
}

/// Identity returned alongside a login token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

//! Persistence boundary for users and their ledgers.
//!
//! Two stores share these traits: [`InMemoryBankStore`] (dev/test) and
//! [`PostgresBankStore`] (production).
//!
//! ## Atomic postings
//!
//! [`LedgerStore::post`] reads the balance, runs the pure posting rule
//! ([`rogerbank_ledger::Account::handle`]), writes the new balance and appends
//! the transaction as **one unit of work**. Either both writes land or
//! neither does, and concurrent postings for the same user are serialized.

pub mod in_memory;
pub mod postgres;
mod schema;

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use rogerbank_auth::{Email, User};
use rogerbank_core::UserId;
use rogerbank_ledger::{LedgerError, PostTransaction, Posting, Transaction};

pub use in_memory::InMemoryBankStore;
pub use postgres::PostgresBankStore;

/// Store operation error.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("user not found")]
    NotFound,

    /// Uniqueness violation (e.g. an email that is already registered).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The posting rule rejected the command; nothing was written.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// A stored row could not be mapped back into domain types.
    #[error("corrupt record: {0}")]
    Corrupt(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Account holder persistence.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn email_exists(&self, email: &Email) -> Result<bool, StoreError>;

    /// Insert a new user. Fails with [`StoreError::Conflict`] when the email is taken.
    async fn insert_user(&self, user: &User) -> Result<(), StoreError>;

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;

    /// All users, oldest registration first.
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;
}

/// Balance + transaction log persistence.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Current balance. [`StoreError::NotFound`] for unknown users.
    async fn balance(&self, user_id: UserId) -> Result<Decimal, StoreError>;

    /// Atomically apply a posting (see module docs).
    async fn post(&self, user_id: UserId, cmd: PostTransaction) -> Result<Posting, StoreError>;

    /// Full history for a user, newest first. Unknown users have no history.
    async fn transactions(&self, user_id: UserId) -> Result<Vec<Transaction>, StoreError>;
}

/// Everything the application needs from storage.
pub trait BankStore: UserStore + LedgerStore {}

impl<S> BankStore for S where S: UserStore + LedgerStore {}

#[async_trait]
impl<S> UserStore for Arc<S>
where
    S: UserStore + ?Sized,
{
    async fn email_exists(&self, email: &Email) -> Result<bool, StoreError> {
        (**self).email_exists(email).await
    }

    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        (**self).insert_user(user).await
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, StoreError> {
        (**self).find_by_email(email).await
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        (**self).find_by_id(id).await
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        (**self).list_users().await
    }
}

#[async_trait]
impl<S> LedgerStore for Arc<S>
where
    S: LedgerStore + ?Sized,
{
    async fn balance(&self, user_id: UserId) -> Result<Decimal, StoreError> {
        (**self).balance(user_id).await
    }

    async fn post(&self, user_id: UserId, cmd: PostTransaction) -> Result<Posting, StoreError> {
        (**self).post(user_id, cmd).await
    }

    async fn transactions(&self, user_id: UserId) -> Result<Vec<Transaction>, StoreError> {
        (**self).transactions(user_id).await
    }
}

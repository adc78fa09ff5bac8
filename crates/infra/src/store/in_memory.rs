use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;

use rogerbank_auth::{Email, User};
use rogerbank_core::UserId;
use rogerbank_ledger::{Account, PostTransaction, Posting, Transaction};

use super::{LedgerStore, StoreError, UserStore};

#[derive(Debug, Default)]
struct State {
    users: HashMap<UserId, User>,
    by_email: HashMap<Email, UserId>,
    /// Per-user log in insertion order (oldest first).
    transactions: HashMap<UserId, Vec<Transaction>>,
}

/// In-memory store for tests/dev.
///
/// A single `RwLock` covers users and logs, so a posting's balance write and
/// log append happen under one write guard. The guard is never held across
/// an `.await`.
#[derive(Debug, Default)]
pub struct InMemoryBankStore {
    inner: RwLock<State>,
}

impl InMemoryBankStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::Backend("in-memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::Backend("in-memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl UserStore for InMemoryBankStore {
    async fn email_exists(&self, email: &Email) -> Result<bool, StoreError> {
        Ok(self.read()?.by_email.contains_key(email))
    }

    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        let mut state = self.write()?;
        if state.by_email.contains_key(&user.email) {
            return Err(StoreError::Conflict(format!(
                "email '{}' is already registered",
                user.email
            )));
        }
        state.by_email.insert(user.email.clone(), user.id);
        state.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, StoreError> {
        let state = self.read()?;
        Ok(state
            .by_email
            .get(email)
            .and_then(|id| state.users.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let mut users: Vec<User> = self.read()?.users.values().cloned().collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(users)
    }
}

#[async_trait]
impl LedgerStore for InMemoryBankStore {
    async fn balance(&self, user_id: UserId) -> Result<Decimal, StoreError> {
        self.read()?
            .users
            .get(&user_id)
            .map(|u| u.balance)
            .ok_or(StoreError::NotFound)
    }

    async fn post(&self, user_id: UserId, cmd: PostTransaction) -> Result<Posting, StoreError> {
        let mut state = self.write()?;

        let user = state.users.get_mut(&user_id).ok_or(StoreError::NotFound)?;
        // Stamped under the write lock so log order and timestamps agree.
        let posting = Account::new(user_id, user.balance).handle(&cmd, Utc::now())?;
        user.balance = posting.new_balance;

        state
            .transactions
            .entry(user_id)
            .or_default()
            .push(posting.transaction.clone());

        Ok(posting)
    }

    async fn transactions(&self, user_id: UserId) -> Result<Vec<Transaction>, StoreError> {
        let state = self.read()?;
        Ok(state
            .transactions
            .get(&user_id)
            .map(|log| log.iter().rev().cloned().collect())
            .unwrap_or_default())
    }
}

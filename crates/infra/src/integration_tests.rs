//! Postgres store tests.
//!
//! These run only when `DATABASE_URL` points at a disposable database; without
//! it they return early. Each test registers its own uniquely-emailed user.

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use rogerbank_auth::{Email, NewUser, User};
    use rogerbank_core::{Amount, UserId};
    use rogerbank_ledger::{LedgerError, PostTransaction, TransactionKind, replay_balance};

    use crate::store::{LedgerStore, PostgresBankStore, StoreError, UserStore};

    async fn store() -> Option<PostgresBankStore> {
        let url = std::env::var("DATABASE_URL").ok()?;
        Some(
            PostgresBankStore::init(&url, 4)
                .await
                .expect("failed to connect/migrate test database"),
        )
    }

    fn new_user() -> User {
        User::register(
            NewUser {
                name: "Ana".to_string(),
                email: Email::parse(&format!("ana+{}@x.com", UserId::new())).unwrap(),
                password_hash: "hash".to_string(),
            },
            Utc::now(),
        )
    }

    fn amount(s: &str) -> Amount {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn postgres_rejects_duplicate_email() {
        let Some(store) = store().await else { return };
        let user = new_user();
        store.insert_user(&user).await.unwrap();

        let twin = User {
            id: UserId::new(),
            ..user.clone()
        };
        assert!(matches!(
            store.insert_user(&twin).await,
            Err(StoreError::Conflict(_))
        ));

        let found = store.find_by_email(&user.email).await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(found.balance, Decimal::ZERO);
    }

    #[tokio::test]
    async fn postgres_posting_is_atomic_and_ordered() {
        let Some(store) = store().await else { return };
        let user = new_user();
        store.insert_user(&user).await.unwrap();

        store
            .post(user.id, PostTransaction::deposit(amount("100")))
            .await
            .unwrap();
        store
            .post(user.id, PostTransaction::withdraw(amount("30")))
            .await
            .unwrap();

        let rejected = store
            .post(user.id, PostTransaction::withdraw(amount("1000")))
            .await;
        assert!(matches!(
            rejected,
            Err(StoreError::Ledger(LedgerError::InsufficientFunds { .. }))
        ));

        let balance = store.balance(user.id).await.unwrap();
        assert_eq!(balance, Decimal::from(70));

        let log = store.transactions(user.id).await.unwrap();
        let kinds: Vec<_> = log.iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![TransactionKind::Withdraw, TransactionKind::Deposit]);
        assert_eq!(replay_balance(&log), balance);
    }

    #[tokio::test]
    async fn postgres_unknown_user_is_not_found() {
        let Some(store) = store().await else { return };
        let ghost = UserId::new();

        assert!(matches!(store.balance(ghost).await, Err(StoreError::NotFound)));
        assert!(matches!(
            store
                .post(ghost, PostTransaction::deposit(amount("1")))
                .await,
            Err(StoreError::NotFound)
        ));
        assert!(store.find_by_id(ghost).await.unwrap().is_none());
    }
}

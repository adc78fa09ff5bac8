//! Postgres-backed bank store.
//!
//! ## Error Mapping
//!
//! | SQLx error | PostgreSQL code | StoreError |
//! |------------|-----------------|------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (other) | any other | `Backend` |
//! | PoolClosed / Io / other | N/A | `Backend` |
//!
//! ## Atomic postings
//!
//! `post()` runs in one SQL transaction: the user row is locked with
//! `SELECT ... FOR UPDATE`, the posting rule runs against the locked balance,
//! then the balance update and the transaction insert are committed together.
//! Concurrent postings for the same user queue on the row lock.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use rogerbank_auth::{Email, User};
use rogerbank_core::{Amount, TransactionId, UserId};
use rogerbank_ledger::{Account, PostTransaction, Posting, Transaction};

use super::schema::SCHEMA;
use super::{LedgerStore, StoreError, UserStore};

const USER_COLUMNS: &str = "id, name, email, password_hash, balance, created_at";

/// Postgres-backed store.
///
/// `PgPool` is internally reference counted, so cloning the store is cheap.
#[derive(Debug, Clone)]
pub struct PostgresBankStore {
    pool: PgPool,
}

impl PostgresBankStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect a pool of at most `max_connections`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create tables and indexes if they do not exist yet.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("migrate", e))?;
        }
        Ok(())
    }

    /// Connect + migrate.
    pub async fn init(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let store = Self::connect(database_url, max_connections).await?;
        store.migrate().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserStore for PostgresBankStore {
    #[instrument(skip(self), fields(email = %email), err)]
    async fn email_exists(&self, email: &Email) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT EXISTS (SELECT 1 FROM users WHERE email = $1) AS present")
            .bind(email.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("email_exists", e))?;

        row.try_get("present")
            .map_err(|e| map_sqlx_error("email_exists", e))
    }

    #[instrument(skip(self, user), fields(user_id = %user.id), err)]
    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, balance, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.name)
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .bind(user.balance)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_user", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(email = %email), err)]
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_by_email", e))?;

        row.as_ref().map(user_from_row).transpose()
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_by_id", e))?;

        row.as_ref().map(user_from_row).transpose()
    }

    #[instrument(skip(self), err)]
    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_users", e))?;

        rows.iter().map(user_from_row).collect()
    }
}

#[async_trait]
impl LedgerStore for PostgresBankStore {
    #[instrument(skip(self), fields(user_id = %user_id), err)]
    async fn balance(&self, user_id: UserId) -> Result<Decimal, StoreError> {
        let row = sqlx::query("SELECT balance FROM users WHERE id = $1")
            .bind(user_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("balance", e))?
            .ok_or(StoreError::NotFound)?;

        row.try_get("balance")
            .map_err(|e| map_sqlx_error("balance", e))
    }

    #[instrument(
        skip(self, cmd),
        fields(user_id = %user_id, kind = %cmd.kind, amount = %cmd.amount),
        err
    )]
    async fn post(&self, user_id: UserId, cmd: PostTransaction) -> Result<Posting, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let row = sqlx::query("SELECT balance FROM users WHERE id = $1 FOR UPDATE")
            .bind(user_id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("lock_user", e))?;

        let Some(row) = row else {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(StoreError::NotFound);
        };
        let balance: Decimal = row
            .try_get("balance")
            .map_err(|e| map_sqlx_error("lock_user", e))?;

        // The row lock is held from here until commit.
        let posting = match Account::new(user_id, balance).handle(&cmd, Utc::now()) {
            Ok(posting) => posting,
            Err(rule) => {
                tx.rollback()
                    .await
                    .map_err(|e| map_sqlx_error("rollback", e))?;
                return Err(StoreError::Ledger(rule));
            }
        };

        sqlx::query("UPDATE users SET balance = $2 WHERE id = $1")
            .bind(user_id.as_uuid())
            .bind(posting.new_balance)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("update_balance", e))?;

        let record = &posting.transaction;
        sqlx::query(
            r#"
            INSERT INTO transactions (id, user_id, kind, amount, occurred_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(user_id.as_uuid())
        .bind(record.kind.as_str())
        .bind(record.amount.value())
        .bind(record.occurred_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_transaction", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Ok(posting)
    }

    #[instrument(skip(self), fields(user_id = %user_id), err)]
    async fn transactions(&self, user_id: UserId) -> Result<Vec<Transaction>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, kind, amount, occurred_at
            FROM transactions
            WHERE user_id = $1
            ORDER BY occurred_at DESC, seq DESC
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("transactions", e))?;

        rows.iter().map(transaction_from_row).collect()
    }
}

fn user_from_row(row: &PgRow) -> Result<User, StoreError> {
    let id: Uuid = row.try_get("id").map_err(|e| map_sqlx_error("decode_user", e))?;
    let email: String = row
        .try_get("email")
        .map_err(|e| map_sqlx_error("decode_user", e))?;
    let created_at: DateTime<Utc> = row
        .try_get("created_at")
        .map_err(|e| map_sqlx_error("decode_user", e))?;

    Ok(User {
        id: UserId::from_uuid(id),
        name: row
            .try_get("name")
            .map_err(|e| map_sqlx_error("decode_user", e))?,
        email: Email::parse(&email)
            .map_err(|e| StoreError::Corrupt(format!("user {id}: {e}")))?,
        password_hash: row
            .try_get("password_hash")
            .map_err(|e| map_sqlx_error("decode_user", e))?,
        balance: row
            .try_get("balance")
            .map_err(|e| map_sqlx_error("decode_user", e))?,
        created_at,
    })
}

fn transaction_from_row(row: &PgRow) -> Result<Transaction, StoreError> {
    let id: Uuid = row
        .try_get("id")
        .map_err(|e| map_sqlx_error("decode_transaction", e))?;
    let user_id: Uuid = row
        .try_get("user_id")
        .map_err(|e| map_sqlx_error("decode_transaction", e))?;
    let kind: String = row
        .try_get("kind")
        .map_err(|e| map_sqlx_error("decode_transaction", e))?;
    let amount: Decimal = row
        .try_get("amount")
        .map_err(|e| map_sqlx_error("decode_transaction", e))?;
    let occurred_at: DateTime<Utc> = row
        .try_get("occurred_at")
        .map_err(|e| map_sqlx_error("decode_transaction", e))?;

    Ok(Transaction {
        id: TransactionId::from_uuid(id),
        user_id: UserId::from_uuid(user_id),
        kind: kind
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("transaction {id}: {e}")))?,
        amount: Amount::new(amount)
            .map_err(|e| StoreError::Corrupt(format!("transaction {id}: {e}")))?,
        occurred_at,
    })
}

/// Map SQLx errors to `StoreError`.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code() {
                Some(code) if code.as_ref() == "23505" => StoreError::Conflict(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {}", operation))
        }
        _ => StoreError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;
    use std::fmt;

    use sqlx::error::{DatabaseError, ErrorKind};

    use super::*;

    #[derive(Debug)]
    struct PgCode(&'static str);

    impl fmt::Display for PgCode {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "pg error {}", self.0)
        }
    }

    impl std::error::Error for PgCode {}

    impl DatabaseError for PgCode {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed(self.0))
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    #[test]
    fn unique_violation_maps_to_conflict() {
        let err = map_sqlx_error("insert_user", sqlx::Error::Database(Box::new(PgCode("23505"))));
        assert!(matches!(err, StoreError::Conflict(msg) if msg.contains("insert_user")));
    }

    #[test]
    fn other_database_errors_are_backend_failures() {
        let err = map_sqlx_error("insert_user", sqlx::Error::Database(Box::new(PgCode("23502"))));
        assert!(matches!(err, StoreError::Backend(_)));
        assert!(matches!(
            map_sqlx_error("lock_user", sqlx::Error::PoolClosed),
            StoreError::Backend(_)
        ));
    }
}

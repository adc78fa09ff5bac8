use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use thiserror::Error;

use rogerbank_auth::{
    Email, Hs256Jwt, NewUser, PasswordError, TokenError, User, UserSummary, hash_password,
    validate_name, validate_password, verify_password,
};
use rogerbank_core::{Amount, DomainError, UserId};
use rogerbank_infra::{
    BankStore, InMemoryBankStore, LedgerStore, PostgresBankStore, StoreError, UserStore,
};
use rogerbank_ledger::{LedgerError, PostTransaction, Posting, Transaction};
use rogerbank_statement::{Locale, Statement, StatementData, StatementError};

use crate::config::AppConfig;

/// Application-level failure, mapped to HTTP by `errors::service_error_to_response`.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("no user registered with that email")]
    UnknownLogin,

    #[error("{0}")]
    InsufficientFunds(String),

    #[error("user not found")]
    NotFound,

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ServiceError::NotFound,
            StoreError::Conflict(msg) => ServiceError::Conflict(msg),
            StoreError::Ledger(rule @ LedgerError::InsufficientFunds { .. }) => {
                ServiceError::InsufficientFunds(rule.to_string())
            }
            StoreError::Ledger(rule @ LedgerError::Overflow) => {
                ServiceError::Validation(rule.to_string())
            }
            StoreError::Corrupt(msg) | StoreError::Backend(msg) => ServiceError::Internal(msg),
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        ServiceError::Validation(err.message().to_string())
    }
}

impl From<PasswordError> for ServiceError {
    fn from(err: PasswordError) -> Self {
        ServiceError::Internal(err.to_string())
    }
}

impl From<TokenError> for ServiceError {
    fn from(err: TokenError) -> Self {
        ServiceError::Internal(err.to_string())
    }
}

impl From<StatementError> for ServiceError {
    fn from(err: StatementError) -> Self {
        ServiceError::Internal(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ServiceError {
    fn from(err: tokio::task::JoinError) -> Self {
        ServiceError::Internal(format!("blocking task failed: {err}"))
    }
}

/// Successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub user: UserSummary,
}

/// Shared, immutable service layer.
#[derive(Clone)]
pub struct AppServices {
    store: Arc<dyn BankStore>,
    jwt: Arc<Hs256Jwt>,
    statement_locale: Locale,
}

/// Pick the store from configuration: Postgres when `DATABASE_URL` is set,
/// in-memory otherwise.
pub async fn build_services(config: &AppConfig, jwt: Arc<Hs256Jwt>) -> anyhow::Result<AppServices> {
    let store: Arc<dyn BankStore> = match &config.database_url {
        Some(url) => {
            let store = PostgresBankStore::init(url, config.db_max_connections).await?;
            tracing::info!("using postgres store");
            Arc::new(store)
        }
        None => {
            tracing::info!("DATABASE_URL not set; using in-memory store");
            Arc::new(InMemoryBankStore::new())
        }
    };

    Ok(AppServices::new(store, jwt, config.statement_locale))
}

impl AppServices {
    pub fn new(store: Arc<dyn BankStore>, jwt: Arc<Hs256Jwt>, statement_locale: Locale) -> Self {
        Self {
            store,
            jwt,
            statement_locale,
        }
    }

    // -------------------------
    // Accounts
    // -------------------------

    /// A malformed email cannot belong to anyone, so it is simply absent.
    pub async fn email_exists(&self, email: &str) -> Result<bool, ServiceError> {
        let Ok(email) = Email::parse(email) else {
            return Ok(false);
        };
        Ok(self.store.email_exists(&email).await?)
    }

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, ServiceError> {
        let name = validate_name(name)?;
        let email = Email::parse(email)?;
        validate_password(password)?;

        if self.store.email_exists(&email).await? {
            return Err(ServiceError::Conflict("Usuário já existe!".to_string()));
        }

        let password = password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password)).await??;

        let user = User::register(
            NewUser {
                name,
                email,
                password_hash,
            },
            Utc::now(),
        );

        // Another registration may have won the race since the check above.
        self.store.insert_user(&user).await.map_err(|e| match e {
            StoreError::Conflict(_) => ServiceError::Conflict("Usuário já existe!".to_string()),
            other => other.into(),
        })?;

        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, ServiceError> {
        // A malformed email cannot belong to anyone.
        let Ok(email) = Email::parse(email) else {
            return Err(ServiceError::UnknownLogin);
        };
        let user = self
            .store
            .find_by_email(&email)
            .await?
            .ok_or(ServiceError::UnknownLogin)?;

        let password = password.to_string();
        let stored_hash = user.password_hash.clone();
        let matches =
            tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash)).await??;
        if !matches {
            return Err(ServiceError::InvalidCredentials);
        }

        let token = self.jwt.issue(user.id, Utc::now())?;
        tracing::info!(user_id = %user.id, "login succeeded");

        Ok(LoginOutcome {
            token,
            user: user.summary(),
        })
    }

    pub async fn list_users(&self) -> Result<Vec<User>, ServiceError> {
        Ok(self.store.list_users().await?)
    }

    /// Look a user up by a raw path id. Unparsable ids are simply not found.
    pub async fn get_user(&self, raw_id: &str) -> Result<User, ServiceError> {
        let id: UserId = raw_id.parse().map_err(|_| ServiceError::NotFound)?;
        self.store
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound)
    }

    // -------------------------
    // Ledger
    // -------------------------

    pub async fn balance(&self, user_id: UserId) -> Result<Decimal, ServiceError> {
        Ok(self.store.balance(user_id).await?)
    }

    pub async fn deposit(&self, user_id: UserId, amount: Amount) -> Result<Posting, ServiceError> {
        self.post(user_id, PostTransaction::deposit(amount))
            .await
    }

    pub async fn withdraw(&self, user_id: UserId, amount: Amount) -> Result<Posting, ServiceError> {
        self.post(user_id, PostTransaction::withdraw(amount))
            .await
    }

    async fn post(&self, user_id: UserId, cmd: PostTransaction) -> Result<Posting, ServiceError> {
        let posting = self.store.post(user_id, cmd).await?;

        tracing::info!(
            user_id = %user_id,
            kind = %posting.transaction.kind,
            amount = %posting.transaction.amount,
            new_balance = %posting.new_balance,
            "posting applied"
        );
        Ok(posting)
    }

    pub async fn transactions(&self, user_id: UserId) -> Result<Vec<Transaction>, ServiceError> {
        Ok(self.store.transactions(user_id).await?)
    }

    // -------------------------
    // Statements
    // -------------------------

    pub async fn statement(&self, user_id: UserId) -> Result<Statement, ServiceError> {
        let user = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or(ServiceError::NotFound)?;
        let transactions = self.store.transactions(user_id).await?;

        let data = StatementData {
            name: user.name,
            email: user.email.to_string(),
            balance: user.balance,
            transactions,
        };
        let locale = self.statement_locale;

        let statement = tokio::task::spawn_blocking(move || {
            rogerbank_statement::generate(&data, locale, Utc::now())
        })
        .await??;

        tracing::info!(user_id = %user_id, filename = %statement.filename, "statement generated");
        Ok(statement)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn services() -> AppServices {
        AppServices::new(
            Arc::new(InMemoryBankStore::new()),
            Arc::new(Hs256Jwt::new("test-secret", Duration::hours(1))),
            Locale::PtBr,
        )
    }

    fn amount(s: &str) -> Amount {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn register_then_login() {
        let svc = services();
        let user = svc.register("Ana", " Ana@X.com ", "pw123").await.unwrap();
        assert_eq!(user.email.as_str(), "ana@x.com");
        assert!(svc.email_exists("ana@x.com").await.unwrap());
        assert!(!svc.email_exists("not-an-email").await.unwrap());
        assert!(!svc.email_exists("").await.unwrap());

        let outcome = svc.login("ana@x.com", "pw123").await.unwrap();
        assert_eq!(outcome.user.id, user.id);
        assert!(!outcome.token.is_empty());
    }

    #[tokio::test]
    async fn duplicate_registration_is_a_conflict() {
        let svc = services();
        svc.register("Ana", "ana@x.com", "pw123").await.unwrap();
        let err = svc.register("Ana 2", "ANA@x.com", "other").await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
        assert_eq!(svc.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn login_failures_are_distinguished() {
        let svc = services();
        svc.register("Ana", "ana@x.com", "pw123").await.unwrap();

        assert!(matches!(
            svc.login("ana@x.com", "wrong").await,
            Err(ServiceError::InvalidCredentials)
        ));
        assert!(matches!(
            svc.login("bob@x.com", "pw123").await,
            Err(ServiceError::UnknownLogin)
        ));
        assert!(matches!(
            svc.login("not-an-email", "pw123").await,
            Err(ServiceError::UnknownLogin)
        ));
    }

    #[tokio::test]
    async fn registration_validates_input() {
        let svc = services();
        assert!(matches!(
            svc.register("  ", "ana@x.com", "pw").await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            svc.register("Ana", "ana", "pw").await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            svc.register("Ana", "ana@x.com", "").await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn deposit_withdraw_scenario() {
        let svc = services();
        let user = svc.register("Ana", "ana@x.com", "pw123").await.unwrap();

        let posting = svc.deposit(user.id, amount("100")).await.unwrap();
        assert_eq!(posting.new_balance, Decimal::from(100));

        let posting = svc.withdraw(user.id, amount("30")).await.unwrap();
        assert_eq!(posting.new_balance, Decimal::from(70));

        let err = svc.withdraw(user.id, amount("1000")).await.unwrap_err();
        assert!(matches!(err, ServiceError::InsufficientFunds(_)));
        assert_eq!(svc.balance(user.id).await.unwrap(), Decimal::from(70));
        assert_eq!(svc.transactions(user.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unknown_users_are_not_found() {
        let svc = services();
        let ghost = UserId::new();
        assert!(matches!(svc.balance(ghost).await, Err(ServiceError::NotFound)));
        assert!(matches!(
            svc.deposit(ghost, amount("1")).await,
            Err(ServiceError::NotFound)
        ));
        assert!(matches!(svc.statement(ghost).await, Err(ServiceError::NotFound)));
        assert!(matches!(
            svc.get_user("not-a-uuid").await,
            Err(ServiceError::NotFound)
        ));
    }

    #[tokio::test]
    async fn statement_is_a_pdf_named_after_the_user() {
        let svc = services();
        let user = svc.register("Ana Maria", "ana@x.com", "pw123").await.unwrap();
        svc.deposit(user.id, amount("100")).await.unwrap();

        let statement = svc.statement(user.id).await.unwrap();
        assert!(statement.bytes.starts_with(b"%PDF"));
        assert!(statement.filename.starts_with("extrato_Ana_Maria_"));
        assert!(statement.filename.ends_with(".pdf"));
    }
}

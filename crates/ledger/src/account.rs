use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use rogerbank_core::{Amount, MAX_AMOUNT, TransactionId, UserId, format_money};

use crate::transaction::{Transaction, TransactionKind};

/// Largest balance an account may hold.
pub const MAX_BALANCE: Decimal = MAX_AMOUNT;

/// Ledger rule violations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("insufficient funds: balance {}, requested {}", format_money(*balance), format_money(*requested))]
    InsufficientFunds { balance: Decimal, requested: Decimal },

    #[error("balance would exceed the maximum of {}", format_money(MAX_BALANCE))]
    Overflow,
}

/// Command: move `amount` into or out of an account.
///
/// Carries no timestamp; the store stamps the posting while it holds the
/// account lock, so timestamps follow commit order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostTransaction {
    pub kind: TransactionKind,
    pub amount: Amount,
}

impl PostTransaction {
    pub fn deposit(amount: Amount) -> Self {
        Self {
            kind: TransactionKind::Deposit,
            amount,
        }
    }

    pub fn withdraw(amount: Amount) -> Self {
        Self {
            kind: TransactionKind::Withdraw,
            amount,
        }
    }
}

/// Outcome of a successful post: the record to append and the balance to store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posting {
    pub transaction: Transaction,
    pub new_balance: Decimal,
}

/// A user's ledger view: identity + current balance.
///
/// # Invariants
/// - The balance is never negative.
/// - Every balance change is described by exactly one [`Posting`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    user_id: UserId,
    balance: Decimal,
}

impl Account {
    pub fn new(user_id: UserId, balance: Decimal) -> Self {
        Self { user_id, balance }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    /// Decide the posting for a command recorded at `occurred_at`. Does not
    /// mutate the account.
    pub fn handle(
        &self,
        cmd: &PostTransaction,
        occurred_at: DateTime<Utc>,
    ) -> Result<Posting, LedgerError> {
        let requested = cmd.amount.value();
        let new_balance = match cmd.kind {
            TransactionKind::Deposit => self
                .balance
                .checked_add(requested)
                .filter(|b| *b <= MAX_BALANCE)
                .ok_or(LedgerError::Overflow)?,
            TransactionKind::Withdraw => {
                if requested > self.balance {
                    return Err(LedgerError::InsufficientFunds {
                        balance: self.balance,
                        requested,
                    });
                }
                self.balance - requested
            }
        };

        Ok(Posting {
            transaction: Transaction {
                id: TransactionId::new(),
                user_id: self.user_id,
                kind: cmd.kind,
                amount: cmd.amount,
                occurred_at,
            },
            new_balance,
        })
    }

    /// Evolve the account with a posting produced by [`Account::handle`].
    pub fn apply(&mut self, posting: &Posting) {
        self.balance = posting.new_balance;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::replay_balance;
    use proptest::prelude::*;

    fn amount(s: &str) -> Amount {
        s.parse().unwrap()
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn deposit_increments_balance_and_records_transaction() {
        let user_id = UserId::new();
        let account = Account::new(user_id, Decimal::ZERO);

        let posting = account
            .handle(&PostTransaction::deposit(amount("100")), Utc::now())
            .unwrap();

        assert_eq!(posting.new_balance, dec("100"));
        assert_eq!(posting.transaction.user_id, user_id);
        assert_eq!(posting.transaction.kind, TransactionKind::Deposit);
        assert_eq!(posting.transaction.amount, amount("100"));
        // Deciding does not mutate.
        assert_eq!(account.balance(), Decimal::ZERO);
    }

    #[test]
    fn withdraw_within_balance_decrements_exactly() {
        let mut account = Account::new(UserId::new(), dec("100"));
        let posting = account
            .handle(&PostTransaction::withdraw(amount("30")), Utc::now())
            .unwrap();
        account.apply(&posting);

        assert_eq!(account.balance(), dec("70"));
        assert_eq!(posting.transaction.kind, TransactionKind::Withdraw);
    }

    #[test]
    fn withdraw_of_entire_balance_is_allowed() {
        let account = Account::new(UserId::new(), dec("70"));
        let posting = account
            .handle(&PostTransaction::withdraw(amount("70")), Utc::now())
            .unwrap();
        assert_eq!(posting.new_balance, Decimal::ZERO);
    }

    #[test]
    fn withdraw_more_than_balance_is_rejected() {
        let account = Account::new(UserId::new(), dec("70"));
        let err = account
            .handle(&PostTransaction::withdraw(amount("1000")), Utc::now())
            .unwrap_err();

        assert_eq!(
            err,
            LedgerError::InsufficientFunds {
                balance: dec("70"),
                requested: dec("1000"),
            }
        );
        assert_eq!(err.to_string(), "insufficient funds: balance 70.00, requested 1000.00");
        assert_eq!(account.balance(), dec("70"));
    }

    #[test]
    fn deposit_overflow_is_reported() {
        let account = Account::new(UserId::new(), Decimal::MAX);
        let err = account
            .handle(&PostTransaction::deposit(amount("1")), Utc::now())
            .unwrap_err();
        assert_eq!(err, LedgerError::Overflow);
    }

    #[test]
    fn balance_is_capped_at_max() {
        let account = Account::new(UserId::new(), MAX_BALANCE - dec("1"));
        let posting = account
            .handle(&PostTransaction::deposit(amount("1")), Utc::now())
            .unwrap();
        assert_eq!(posting.new_balance, MAX_BALANCE);

        let full = Account::new(UserId::new(), MAX_BALANCE);
        let err = full
            .handle(&PostTransaction::deposit(amount("0.01")), Utc::now())
            .unwrap_err();
        assert_eq!(err, LedgerError::Overflow);
        assert_eq!(full.balance(), MAX_BALANCE);
    }

    #[test]
    fn posting_carries_the_given_timestamp() {
        let at = Utc::now() - chrono::Duration::seconds(5);
        let posting = Account::new(UserId::new(), Decimal::ZERO)
            .handle(&PostTransaction::deposit(amount("1")), at)
            .unwrap();
        assert_eq!(posting.transaction.occurred_at, at);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: after any sequence of deposits/withdrawals (rejected ones
        /// included), the balance is non-negative and equals the replay of the
        /// recorded transactions.
        #[test]
        fn balance_always_matches_replayed_log(
            ops in prop::collection::vec((any::<bool>(), 1i64..1_000_000i64), 1..40)
        ) {
            let mut account = Account::new(UserId::new(), Decimal::ZERO);
            let mut log: Vec<Transaction> = Vec::new();

            for (is_deposit, cents) in ops {
                let amount = Amount::new(Decimal::new(cents, 2)).unwrap();
                let cmd = if is_deposit {
                    PostTransaction::deposit(amount)
                } else {
                    PostTransaction::withdraw(amount)
                };

                let before = account.balance();
                match account.handle(&cmd, Utc::now()) {
                    Ok(posting) => {
                        account.apply(&posting);
                        log.push(posting.transaction);
                    }
                    Err(LedgerError::InsufficientFunds { .. }) => {
                        prop_assert!(!is_deposit);
                        prop_assert!(amount.value() > before);
                        prop_assert_eq!(account.balance(), before);
                    }
                    Err(other) => prop_assert!(false, "unexpected error: {other}"),
                }

                prop_assert!(account.balance() >= Decimal::ZERO);
            }

            prop_assert_eq!(replay_balance(&log), account.balance());
        }
    }
}

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use rogerbank_core::{Amount, DomainError, TransactionId, UserId};

/// Direction of a ledger movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Deposit,
    Withdraw,
}

impl TransactionKind {
    /// Stable wire/storage name (`"deposit"` / `"withdraw"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "deposit",
            TransactionKind::Withdraw => "withdraw",
        }
    }

    /// Apply the kind's sign to an amount.
    pub fn signed(&self, amount: Amount) -> Decimal {
        match self {
            TransactionKind::Deposit => amount.value(),
            TransactionKind::Withdraw => -amount.value(),
        }
    }
}

impl core::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for TransactionKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deposit" => Ok(TransactionKind::Deposit),
            "withdraw" => Ok(TransactionKind::Withdraw),
            other => Err(DomainError::validation(format!(
                "unknown transaction kind '{other}'"
            ))),
        }
    }
}

/// One immutable ledger record. References its owner, never owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub user_id: UserId,
    pub kind: TransactionKind,
    pub amount: Amount,
    pub occurred_at: DateTime<Utc>,
}

impl Transaction {
    pub fn signed_amount(&self) -> Decimal {
        self.kind.signed(self.amount)
    }
}

/// Rebuild a balance from zero by summing signed transaction amounts.
///
/// Order does not matter. Used to audit a stored balance against its log.
pub fn replay_balance<'a, I>(transactions: I) -> Decimal
where
    I: IntoIterator<Item = &'a Transaction>,
{
    transactions
        .into_iter()
        .fold(Decimal::ZERO, |acc, tx| acc + tx.signed_amount())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(kind: TransactionKind, amount: &str) -> Transaction {
        Transaction {
            id: TransactionId::new(),
            user_id: UserId::new(),
            kind,
            amount: amount.parse().unwrap(),
            occurred_at: Utc::now(),
        }
    }

    #[test]
    fn kind_round_trips_through_its_name() {
        for kind in [TransactionKind::Deposit, TransactionKind::Withdraw] {
            assert_eq!(kind.as_str().parse::<TransactionKind>().unwrap(), kind);
        }
        assert!("transfer".parse::<TransactionKind>().is_err());
    }

    #[test]
    fn replay_sums_signed_amounts() {
        let log = vec![
            tx(TransactionKind::Withdraw, "30"),
            tx(TransactionKind::Deposit, "100"),
        ];
        assert_eq!(replay_balance(&log), Decimal::from(70));
        assert_eq!(replay_balance(&[]), Decimal::ZERO);
    }
}

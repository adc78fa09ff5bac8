use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use rogerbank_auth::UserSummary;
use rogerbank_core::{TransactionId, UserId};
use rogerbank_ledger::{Transaction, TransactionKind};

// -------------------------
// Request DTOs
// -------------------------
//
// Fields default to empty so a missing field surfaces as a validation error
// from the service layer rather than a body rejection.

#[derive(Debug, Deserialize)]
pub struct EmailCheckRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// `amount` may be a JSON number or a numeric string.
#[derive(Debug, Deserialize)]
pub struct AmountRequest {
    #[serde(default)]
    pub amount: serde_json::Value,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct EmailCheckResponse {
    #[serde(rename = "emailExiste")]
    pub email_exists: bool,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub msg: &'static str,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub msg: &'static str,
    pub token: String,
    pub user: UserSummaryResponse,
}

#[derive(Debug, Serialize)]
pub struct UserSummaryResponse {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

impl From<UserSummary> for UserSummaryResponse {
    fn from(s: UserSummary) -> Self {
        Self {
            id: s.id,
            name: s.name,
            email: s.email,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
}

#[derive(Debug, Serialize)]
pub struct PostingResponse {
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
    pub msg: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub id: TransactionId,
    pub user_id: UserId,
    pub kind: TransactionKind,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl From<Transaction> for TransactionResponse {
    fn from(t: Transaction) -> Self {
        Self {
            id: t.id,
            user_id: t.user_id,
            kind: t.kind,
            amount: t.amount.value(),
            timestamp: t.occurred_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    #[test]
    fn transaction_json_shape() {
        let user_id = UserId::new();
        let id = TransactionId::new();
        let at = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let dto = TransactionResponse::from(Transaction {
            id,
            user_id,
            kind: TransactionKind::Withdraw,
            amount: "30".parse().unwrap(),
            occurred_at: at,
        });

        let value = serde_json::to_value(&dto).unwrap();
        assert_eq!(value["id"], json!(id.to_string()));
        assert_eq!(value["userId"], json!(user_id.to_string()));
        assert_eq!(value["kind"], json!("withdraw"));
        assert_eq!(value["amount"], json!(30.0));
        assert_eq!(value["timestamp"], json!("2025-01-02T03:04:05Z"));
    }

    #[test]
    fn missing_amount_is_null() {
        let req: AmountRequest = serde_json::from_str("{}").unwrap();
        assert!(req.amount.is_null());
    }

    #[test]
    fn email_check_uses_wire_name() {
        let value = serde_json::to_value(EmailCheckResponse { email_exists: true }).unwrap();
        assert_eq!(value, json!({ "emailExiste": true }));
    }
}

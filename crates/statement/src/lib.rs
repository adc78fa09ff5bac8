//! Account statements as PDF documents.
//!
//! [`layout`] turns a user's profile and history into positioned lines (pure,
//! testable); [`render`] draws those lines with `printpdf`.

pub mod layout;
pub mod locale;
pub mod render;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use rogerbank_ledger::Transaction;

pub use layout::{Line, LineStyle, StatementLayout, paginate};
pub use locale::Locale;

#[derive(Debug, Error)]
pub enum StatementError {
    #[error("pdf rendering failed: {0}")]
    Render(String),
}

/// Everything a statement shows.
#[derive(Debug, Clone)]
pub struct StatementData {
    pub name: String,
    pub email: String,
    pub balance: Decimal,
    /// Newest first.
    pub transactions: Vec<Transaction>,
}

/// A rendered statement ready to be sent as an attachment.
#[derive(Debug, Clone)]
pub struct Statement {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Lay out and render `data` as a PDF.
///
/// CPU-bound; async callers should run it on a blocking thread.
pub fn generate(
    data: &StatementData,
    locale: Locale,
    generated_at: DateTime<Utc>,
) -> Result<Statement, StatementError> {
    let layout = StatementLayout::build(data, locale);
    let bytes = render::to_pdf(&layout)?;

    tracing::debug!(
        transactions = data.transactions.len(),
        bytes = bytes.len(),
        "statement rendered"
    );

    Ok(Statement {
        filename: statement_filename(&data.name, generated_at),
        bytes,
    })
}

/// `extrato_<name>_<unix millis>.pdf`, with the name reduced to `[A-Za-z0-9_-]`.
pub fn statement_filename(name: &str, at: DateTime<Utc>) -> String {
    let safe: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("extrato_{}_{}.pdf", safe, at.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rogerbank_core::{TransactionId, UserId};
    use rogerbank_ledger::TransactionKind;

    #[test]
    fn filename_is_header_safe() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(
            statement_filename("Ana Maria", at),
            "extrato_Ana_Maria_1700000000123.pdf"
        );
        assert_eq!(
            statement_filename("João\"; x", at),
            "extrato_Jo_o___x_1700000000123.pdf"
        );
    }

    #[test]
    fn generates_a_pdf_document() {
        let user_id = UserId::new();
        let data = StatementData {
            name: "Ana".to_string(),
            email: "ana@x.com".to_string(),
            balance: Decimal::from(70),
            transactions: vec![Transaction {
                id: TransactionId::new(),
                user_id,
                kind: TransactionKind::Deposit,
                amount: "70".parse().unwrap(),
                occurred_at: Utc::now(),
            }],
        };

        let statement = generate(&data, Locale::PtBr, Utc::now()).unwrap();
        assert!(statement.bytes.starts_with(b"%PDF"));
        assert!(statement.filename.starts_with("extrato_Ana_"));
    }
}

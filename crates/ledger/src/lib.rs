//! Ledger module (per-user balance + append-only transaction log).
//!
//! Pure domain logic only: no IO, no HTTP, no persistence concerns. Stores call
//! [`Account::handle`] inside their own unit of work so the balance update and
//! the transaction record are committed together.

pub mod account;
pub mod transaction;

pub use account::{Account, LedgerError, PostTransaction, Posting};
pub use transaction::{Transaction, TransactionKind, replay_balance};

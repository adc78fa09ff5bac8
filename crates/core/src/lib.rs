//! Domain primitives shared by every rogerbank crate.
//!
//! Identifiers and money. No I/O lives here.

pub mod error;
pub mod id;
pub mod money;

pub use error::{DomainError, DomainResult};
pub use id::{TransactionId, UserId};
pub use money::{Amount, MAX_AMOUNT, format_money};

//! Infrastructure layer: user/transaction persistence.

pub mod store;

mod integration_tests;

pub use store::{
    BankStore, InMemoryBankStore, LedgerStore, PostgresBankStore, StoreError, UserStore,
};

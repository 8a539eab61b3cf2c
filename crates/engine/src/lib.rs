//! Money transfers between accounts.
//!
//! The engine owns three tables: `accounts`, `entries` and `transfers`.
//! [`Engine::transfer_tx`] is the only operation that changes balances: in one
//! database transaction it records a [`Transfer`], a debit and a credit
//! [`Entry`], and applies both balance changes in [`lock_order`].
//!
//! [`Engine::exec_tx`] is the transaction primitive behind it and can run any
//! other multi-statement unit of work through [`Queries`].

pub use accounts::{Account, AddAccountBalanceParams, CreateAccountParams};
pub use currency::Currency;
pub use entries::{CreateEntryParams, Entry};
pub use error::{EngineError, ErrorKind};
pub use ops::{Engine, EngineBuilder, TransferTxParams, TransferTxResult, TxFuture};
pub use queries::{Page, Queries};
pub use transfers::{CreateTransferParams, Transfer, TransferFilter};

mod accounts;
mod currency;
mod entries;
mod error;
pub mod lock_order;
mod ops;
mod queries;
mod transfers;

pub type ResultEngine<T> = Result<T, EngineError>;

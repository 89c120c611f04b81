//! Errors the engine can return.
//!
//! Validation failures are terminal for the request that caused them and
//! never change state. [`Database`] and [`Storage`] wrap the persistence
//! backends; when they occur the operation is reported as failed and the
//! in-memory state is left untouched.
//!
//! [`Database`]: EngineError::Database
//! [`Storage`]: EngineError::Storage

use sea_orm::DbErr;
use thiserror::Error;

use crate::Money;

/// Engine custom errors.
///
/// Display messages are user-facing and kept in the wire language of the API.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("cuenta {0} no encontrada")]
    AccountNotFound(String),
    #[error("la cuenta {number} no está activa (estado: {status})")]
    AccountInactive { number: String, status: String },
    #[error("{0}")]
    InvalidAmount(String),
    #[error("saldo insuficiente en la cuenta {number}: disponible {available}, solicitado {requested}")]
    InsufficientFunds {
        number: String,
        available: Money,
        requested: Money,
    },
    #[error("la cuenta origen y la cuenta destino deben ser distintas")]
    SameAccountTransfer,
    #[error("el número de cuenta {0} ya existe")]
    DuplicateAccount(String),
    #[error("cliente {0} no encontrado")]
    ClientNotFound(i64),
    #[error("transacción {0} no encontrada")]
    TransactionNotFound(i64),
    #[error("la cuenta {number} tiene saldo {balance}, debe ser cero")]
    NonZeroBalance { number: String, balance: Money },
    #[error("tiempo de espera agotado sobre la cuenta {0}")]
    OperationTimeout(String),
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("error de persistencia: {0}")]
    Storage(String),
}

impl EngineError {
    /// The canonical "amount must be > 0" rejection.
    pub(crate) fn non_positive_amount() -> Self {
        EngineError::InvalidAmount("el monto debe ser mayor a cero".to_string())
    }
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Storage(err.to_string())
    }
}

use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{run, run_with_listener, spawn_with_listener};

mod clientes;
mod cuentas;
mod server;
mod transacciones;

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::AccountNotFound(_)
        | EngineError::ClientNotFound(_)
        | EngineError::TransactionNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::DuplicateAccount(_) => StatusCode::CONFLICT,
        EngineError::OperationTimeout(_) => StatusCode::SERVICE_UNAVAILABLE,
        EngineError::Database(_) | EngineError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::AccountInactive { .. }
        | EngineError::InvalidAmount(_)
        | EngineError::InsufficientFunds { .. }
        | EngineError::SameAccountTransfer
        | EngineError::NonZeroBalance { .. } => StatusCode::BAD_REQUEST,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "error interno del servidor".to_string()
        }
        EngineError::Storage(detail) => {
            tracing::error!("storage error: {detail}");
            "error interno del servidor".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::Money;

    #[test]
    fn not_found_family_maps_to_404() {
        for err in [
            EngineError::AccountNotFound("1001".to_string()),
            EngineError::ClientNotFound(7),
            EngineError::TransactionNotFound(42),
        ] {
            let res = ServerError::from(err).into_response();
            assert_eq!(res.status(), StatusCode::NOT_FOUND);
        }
    }

    #[test]
    fn validation_family_maps_to_400() {
        for err in [
            EngineError::InvalidAmount("x".to_string()),
            EngineError::InsufficientFunds {
                number: "1001".to_string(),
                available: Money::ZERO,
                requested: Money::from_cents(100),
            },
            EngineError::SameAccountTransfer,
            EngineError::NonZeroBalance {
                number: "1001".to_string(),
                balance: Money::from_cents(100),
            },
            EngineError::AccountInactive {
                number: "1001".to_string(),
                status: "bloqueada".to_string(),
            },
        ] {
            let res = ServerError::from(err).into_response();
            assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn duplicate_account_maps_to_409() {
        let res = ServerError::from(EngineError::DuplicateAccount("1001".to_string()))
            .into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn timeout_maps_to_503() {
        let res = ServerError::from(EngineError::OperationTimeout("1001".to_string()))
            .into_response();
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn persistence_maps_to_500() {
        let res = ServerError::from(EngineError::Storage("disk full".to_string()))
            .into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}

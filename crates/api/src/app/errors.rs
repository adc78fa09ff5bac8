use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use crate::app::services::ServiceError;

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Validation(msg) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", msg)
        }
        ServiceError::Conflict(msg) => json_error(StatusCode::BAD_REQUEST, "user_exists", msg),
        ServiceError::InvalidCredentials => json_error(
            StatusCode::BAD_REQUEST,
            "invalid_credentials",
            "Credenciais inválidas!",
        ),
        ServiceError::UnknownLogin => json_error(
            StatusCode::BAD_REQUEST,
            "not_found",
            "Usuário não encontrado!",
        ),
        ServiceError::InsufficientFunds(detail) => {
            tracing::debug!(%detail, "withdrawal rejected");
            json_error(
                StatusCode::BAD_REQUEST,
                "insufficient_funds",
                "Saldo insuficiente",
            )
        }
        ServiceError::NotFound => {
            json_error(StatusCode::NOT_FOUND, "not_found", "Usuário não encontrado")
        }
        ServiceError::Internal(detail) => {
            // Full detail stays in the logs.
            tracing::error!(error = %detail, "request failed");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Erro interno do servidor. Tente novamente mais tarde.",
            )
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "msg": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_error_kind() {
        let cases = [
            (ServiceError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (ServiceError::Conflict("x".into()), StatusCode::BAD_REQUEST),
            (ServiceError::InvalidCredentials, StatusCode::BAD_REQUEST),
            (ServiceError::UnknownLogin, StatusCode::BAD_REQUEST),
            (ServiceError::InsufficientFunds("x".into()), StatusCode::BAD_REQUEST),
            (ServiceError::NotFound, StatusCode::NOT_FOUND),
            (ServiceError::Internal("db down".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(service_error_to_response(err).status(), status);
        }
    }
}

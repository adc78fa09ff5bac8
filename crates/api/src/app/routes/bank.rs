use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::{header, HeaderValue, StatusCode},
    response::IntoResponse,
    Json,
};

use rogerbank_core::Amount;

use crate::app::routes::json_body;
use crate::app::services::{AppServices, ServiceError};
use crate::app::{dto, errors};
use crate::context::AuthenticatedUser;

pub async fn balance(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> axum::response::Response {
    match services.balance(user.user_id()).await {
        Ok(balance) => (StatusCode::OK, Json(dto::BalanceResponse { balance })).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn deposit(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthenticatedUser>,
    body: Result<Json<dto::AmountRequest>, JsonRejection>,
) -> axum::response::Response {
    let amount = match parse_amount(body) {
        Ok(a) => a,
        Err(resp) => return resp,
    };

    match services.deposit(user.user_id(), amount).await {
        Ok(posting) => (
            StatusCode::OK,
            Json(dto::PostingResponse {
                balance: posting.new_balance,
                msg: "Depósito realizado com sucesso.",
            }),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn withdraw(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthenticatedUser>,
    body: Result<Json<dto::AmountRequest>, JsonRejection>,
) -> axum::response::Response {
    let amount = match parse_amount(body) {
        Ok(a) => a,
        Err(resp) => return resp,
    };

    match services.withdraw(user.user_id(), amount).await {
        Ok(posting) => (
            StatusCode::OK,
            Json(dto::PostingResponse {
                balance: posting.new_balance,
                msg: "Saque realizado com sucesso.",
            }),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn transactions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> axum::response::Response {
    match services.transactions(user.user_id()).await {
        Ok(items) => {
            let items = items
                .into_iter()
                .map(dto::TransactionResponse::from)
                .collect::<Vec<_>>();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn generate_statement(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> axum::response::Response {
    let statement = match services.statement(user.user_id()).await {
        Ok(s) => s,
        Err(e) => return errors::service_error_to_response(e),
    };

    // The filename is already restricted to [A-Za-z0-9_.-].
    let disposition = match HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        statement.filename
    )) {
        Ok(v) => v,
        Err(e) => {
            return errors::service_error_to_response(ServiceError::Internal(e.to_string()));
        }
    };

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        statement.bytes,
    )
        .into_response()
}

fn parse_amount(
    body: Result<Json<dto::AmountRequest>, JsonRejection>,
) -> Result<Amount, axum::response::Response> {
    let body = json_body(body)?;
    Amount::from_json(&body.amount)
        .map_err(|e| errors::service_error_to_response(ServiceError::from(e)))
}

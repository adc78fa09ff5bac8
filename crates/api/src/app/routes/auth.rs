use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::app::routes::json_body;
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub async fn check_email(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::EmailCheckRequest>, JsonRejection>,
) -> axum::response::Response {
    let body = match json_body(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    match services.email_exists(&body.email).await {
        Ok(true) => (
            StatusCode::OK,
            Json(dto::EmailCheckResponse { email_exists: true }),
        )
            .into_response(),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(dto::EmailCheckResponse {
                email_exists: false,
            }),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::RegisterRequest>, JsonRejection>,
) -> axum::response::Response {
    let body = match json_body(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    match services
        .register(&body.name, &body.email, &body.password)
        .await
    {
        Ok(_) => (
            StatusCode::OK,
            Json(dto::MessageResponse {
                msg: "Usuário registrado com sucesso!",
            }),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::LoginRequest>, JsonRejection>,
) -> axum::response::Response {
    let body = match json_body(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    match services.login(&body.email, &body.password).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(dto::LoginResponse {
                msg: "Login bem-sucedido!",
                token: outcome.token,
                user: outcome.user.into(),
            }),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

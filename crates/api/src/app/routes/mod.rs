use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::Response,
    routing::{get, post},
    Json, Router,
};

use crate::app::errors;

pub mod auth;
pub mod bank;
pub mod system;
pub mod users;

/// Public account endpoints (`/api/auth`).
pub fn auth_router() -> Router {
    Router::new()
        .route("/verificar-email", post(auth::check_email))
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
}

/// Public user directory (`/api/users`).
pub fn users_router() -> Router {
    Router::new()
        .route("/", get(users::list_users))
        .route("/:id", get(users::get_user))
}

/// Bearer-protected ledger endpoints (`/api/bank`).
pub fn bank_router() -> Router {
    Router::new()
        .route("/balance", get(bank::balance))
        .route("/deposit", post(bank::deposit))
        .route("/withdraw", post(bank::withdraw))
        .route("/transactions", get(bank::transactions))
        .route("/generate-statement", get(bank::generate_statement))
}

/// Unwrap a JSON body, turning malformed payloads into a 400.
pub(crate) fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    body.map(|Json(v)| v).map_err(|rejection| {
        errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            rejection.body_text(),
        )
    })
}

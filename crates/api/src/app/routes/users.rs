use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use rogerbank_auth::User;

use crate::app::errors;
use crate::app::services::AppServices;

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.list_users().await {
        Ok(users) => {
            let items = users.iter().map(User::profile).collect::<Vec<_>>();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match services.get_user(&id).await {
        Ok(user) => (StatusCode::OK, Json(user.profile())).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

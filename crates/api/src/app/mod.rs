//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store selection and the account/ledger/statement operations
//! - `routes/`: HTTP handlers, one file per area
//! - `dto.rs`: request/response bodies
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use anyhow::Context;
use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Extension, Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use rogerbank_auth::Hs256Jwt;

use crate::config::AppConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// Connects and migrates Postgres when `config.database_url` is set.
pub async fn build_app(config: &AppConfig) -> anyhow::Result<Router> {
    let jwt = Arc::new(Hs256Jwt::new(config.jwt_secret.as_bytes(), config.token_ttl));
    let auth_state = middleware::AuthState { jwt: jwt.clone() };

    let services = Arc::new(
        services::build_services(config, jwt)
            .await
            .context("failed to initialize storage")?,
    );

    // Protected routes: every /api/bank handler sees an AuthenticatedUser.
    let bank = routes::bank_router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    let api = Router::new()
        .nest("/api/auth", routes::auth_router())
        .nest("/api/users", routes::users_router())
        .nest("/api/bank", bank)
        .layer(Extension(services));

    Ok(Router::new()
        .route("/health", get(routes::system::health))
        .merge(api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&config.cors_origin)?),
        ))
}

fn cors_layer(origin: &str) -> anyhow::Result<CorsLayer> {
    let origin: HeaderValue = origin
        .parse()
        .with_context(|| format!("invalid CORS origin '{origin}'"))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]))
}

//! Router construction

use crate::handlers::{self, records, records::Record};
use crate::AppState;
use axum::{routing::get, Router};
use qotd_core::Store;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn router(state: AppState) -> Router {
    let prefix = state.route_prefix.clone();

    Router::new()
        .route(
            &format!("{prefix}/healthcheck"),
            get(handlers::health).fallback(handlers::method_not_allowed),
        )
        .with_state(state.clone())
        .merge(resource_routes(&format!("{prefix}/quotes"), state.quotes))
        .merge(resource_routes(&format!("{prefix}/comments"), state.comments))
        .fallback(handlers::not_found)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

fn resource_routes<R: Record>(path: &str, store: Arc<dyn Store<R>>) -> Router {
    Router::new()
        .route(
            path,
            get(records::list::<R>)
                .post(records::create::<R>)
                .fallback(handlers::method_not_allowed),
        )
        .route(
            &format!("{path}/:id"),
            get(records::get::<R>)
                .put(records::update::<R>)
                .delete(records::delete::<R>)
                .fallback(handlers::method_not_allowed),
        )
        .with_state(store)
}

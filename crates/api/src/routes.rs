//! Route table

use axum::routing::{get, post};
use axum::Router;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{self, groups, health, transactions};
use crate::state::AppState;

/// Slow requests are answered with 408 once `state.request_timeout` elapses
pub fn router(state: AppState) -> Router {
    let request_timeout = state.request_timeout;

    Router::new()
        .route("/v1/healthcheck", get(health::healthcheck))
        .route("/v1/groups", post(groups::create_group))
        .route(
            "/v1/groups/{groupID}",
            get(groups::get_group)
                .patch(groups::update_group)
                .delete(groups::delete_group),
        )
        .route(
            "/v1/groups/{groupID}/transactions",
            get(transactions::list_transactions).post(transactions::create_transaction),
        )
        .route(
            "/v1/groups/{groupID}/transactions/{transactionID}",
            get(transactions::get_transaction)
                .put(transactions::update_transaction)
                .delete(transactions::delete_transaction),
        )
        .fallback(handlers::not_found)
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

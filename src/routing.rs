//! Application router configuration.

use std::path::Path;

use axum::{
    Router,
    handler::HandlerWithoutStateExt,
    middleware,
    routing::{delete, get},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    budget::{create_budget_endpoint, delete_budget_endpoint, get_budgets_endpoint},
    endpoints,
    not_found::get_404_not_found,
    owner::owner_guard,
    report::{get_balance_endpoint, get_budget_report_endpoint, get_report_endpoint},
    transaction::{
        create_transaction_endpoint, delete_all_transactions_endpoint,
        delete_transaction_endpoint, get_transactions_endpoint,
    },
};

/// Return a router with all the app's routes.
///
/// Every API route requires the owner token header. If `static_dir` is given,
/// paths that match no API route are served from that directory, e.g. the
/// browser client. Anything else gets a JSON 404.
pub fn build_router(state: AppState, static_dir: Option<&Path>) -> Router {
    let api_routes = Router::new()
        .route(
            endpoints::TRANSACTIONS_API,
            get(get_transactions_endpoint)
                .post(create_transaction_endpoint)
                .delete(delete_all_transactions_endpoint),
        )
        .route(endpoints::TRANSACTION, delete(delete_transaction_endpoint))
        .route(
            endpoints::BUDGETS_API,
            get(get_budgets_endpoint).post(create_budget_endpoint),
        )
        .route(endpoints::BUDGET, delete(delete_budget_endpoint))
        .route(endpoints::BALANCE, get(get_balance_endpoint))
        .route(endpoints::REPORTS, get(get_report_endpoint))
        .route(endpoints::BUDGET_REPORT, get(get_budget_report_endpoint))
        .layer(middleware::from_fn(owner_guard));

    let router = match static_dir {
        Some(static_dir) => api_routes.fallback_service(
            ServeDir::new(static_dir).not_found_service(get_404_not_found.into_service()),
        ),
        None => api_routes.fallback(get_404_not_found),
    };

    router.with_state(state)
}

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::handlers::{protected, public};
use crate::middleware::route_guard;
use crate::state::AppState;

/// Full HTTP surface. The route guard wraps everything so unknown page paths
/// redirect to `/` just like known ones.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(public_routes())
        .merge(page_routes())
        .merge(company_routes())
        .merge(portfolio_routes())
        .merge(deposit_routes())
        .fallback(not_found)
        .layer(middleware::from_fn(route_guard))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(public::landing))
        .route("/health", get(public::health))
        .route("/login", post(public::login))
        .route("/logout", post(public::logout))
}

fn page_routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(protected::dashboard))
}

fn company_routes() -> Router<AppState> {
    use protected::companies;

    Router::new()
        .route("/api/companies", get(companies::list).post(companies::create))
        .route("/api/companies/:id", put(companies::update).delete(companies::delete))
}

fn portfolio_routes() -> Router<AppState> {
    use protected::portfolio;

    Router::new()
        .route("/api/portfolio", get(portfolio::list).post(portfolio::create))
        .route("/api/portfolio/summary", get(portfolio::summary))
        .route("/api/portfolio/:id", put(portfolio::update).delete(portfolio::delete))
}

fn deposit_routes() -> Router<AppState> {
    use protected::deposits;

    Router::new()
        .route("/api/deposits", get(deposits::list).post(deposits::create))
        .route("/api/deposits/summary", get(deposits::summary))
        .route("/api/deposits/:id", put(deposits::update).delete(deposits::delete))
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Not found".to_string())
}

// Route definitions

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::{
    AppState,
    error::AppResult,
    feed,
    models::ListingParams,
    query::{Catalog, QueryState},
};

mod actions;
mod api;
mod pages;

// The state is attached here; main only adds static file serving on top
pub fn create_router(app_state: AppState) -> Router {
    let api_router = Router::new()
        .route("/cars", get(api::list_cars))
        .route("/cars/:id", get(api::get_car))
        .route("/query", post(api::dispatch_query))
        .with_state(app_state.clone());

    Router::new()
        .route("/", get(pages::index))
        .route("/home", get(pages::listing_page))
        // One form post per query state operation
        .route("/home/search", post(actions::set_search_query))
        .route("/home/filters", post(actions::set_filters))
        .route("/home/sort", post(actions::set_sort_by))
        .route("/home/page", post(actions::set_current_page))
        .route("/home/clear", post(actions::clear_query))
        .route("/car/:id", get(pages::car_detail_page))
        .nest("/api", api_router)
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
}

// Fetches the feed for this page load and pairs it with the requested state
async fn load_catalog(app_state: &AppState, params: ListingParams) -> Catalog {
    let records = feed::fetch_cars(&app_state.http_client, &app_state.settings.feed_url).await;
    Catalog::new(records, params.into_state(app_state.settings.items_per_page))
}

fn listing_url(state: &QueryState) -> AppResult<String> {
    let query = ListingParams::from_state(state).to_query_string()?;
    if query.is_empty() {
        Ok("/home".to_string())
    } else {
        Ok(format!("/home?{}", query))
    }
}

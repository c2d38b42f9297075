// JSON API over the same query pipeline the listing page uses

use axum::{
    extract::{Json as JsonExtract, Path, Query, State},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};

use super::load_catalog;
use crate::{
    AppState,
    error::AppError,
    feed,
    models::{Car, ListingParams},
    query::{Catalog, CatalogPage, Filters, QueryAction, QueryState, SortSpec},
};

// --- Response Wrappers ---

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ListingResponse {
    cars: Vec<Car>,
    total_pages: usize,
    current_page: usize,
    total_matches: usize,
    filters: Filters,
    sort_by: SortSpec,
}

impl From<CatalogPage<'_>> for ListingResponse {
    fn from(page: CatalogPage<'_>) -> Self {
        Self {
            cars: page.cars.into_iter().cloned().collect(),
            total_pages: page.total_pages,
            current_page: page.current_page,
            total_matches: page.total_matches,
            filters: page.query.filters.clone(),
            sort_by: page.query.sort_by,
        }
    }
}

#[derive(Serialize, Debug)]
struct QueryResponse {
    state: QueryState,
    page: ListingResponse,
}

// --- Request Structs ---

#[derive(Deserialize, Debug)]
pub struct QueryRequest {
    #[serde(default)]
    state: QueryState,
    action: QueryAction,
}

// --- API Handlers ---

pub async fn list_cars(
    State(app_state): State<AppState>,
    Query(params): Query<ListingParams>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!("[HANDLER] /api/cars - Request received with params: {:?}", params);
    let catalog = load_catalog(&app_state, params).await;
    let response = ListingResponse::from(catalog.page());
    tracing::info!(
        "[HANDLER] /api/cars - Returning {} of {} matching cars.",
        response.cars.len(),
        response.total_matches
    );
    Ok(Json(response))
}

pub async fn get_car(
    State(app_state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!("[HANDLER] /api/cars/:id - Request received for id: {}", raw_id);
    match feed::find_car(&app_state.http_client, &app_state.settings.feed_url, &raw_id).await {
        Some(car) => Ok(Json(car)),
        None => Err(AppError::NotFound("Car not found".to_string())),
    }
}

// Applies one action to the posted state and returns the new state with its page.
// The page size is always the server's.
pub async fn dispatch_query(
    State(app_state): State<AppState>,
    JsonExtract(request): JsonExtract<QueryRequest>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!("[HANDLER] /api/query - Action received: {:?}", request.action);
    let records = feed::fetch_cars(&app_state.http_client, &app_state.settings.feed_url).await;
    let state = QueryState {
        items_per_page: app_state.settings.items_per_page,
        ..request.state
    };

    let mut catalog = Catalog::new(records, state);
    let page = ListingResponse::from(catalog.dispatch(request.action));
    Ok(Json(QueryResponse {
        state: catalog.state().clone(),
        page,
    }))
}

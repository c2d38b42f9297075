// Form posts from the listing page, one per query state operation.
// Each reads the current state from the action URL's query string, applies the
// matching reducer and redirects back to the listing for the new state.

use axum::{
    extract::{Form, Query, State},
    response::Redirect,
};
use serde::Deserialize;

use super::listing_url;
use crate::{
    AppState,
    error::{AppError, AppResult},
    models::ListingParams,
    query::{FilterPatch, QueryState, SortSpec, state},
};

#[derive(Debug, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    q: String,
}

#[derive(Debug, Deserialize)]
pub struct SortForm {
    sort: String,
}

#[derive(Debug, Deserialize)]
pub struct PageForm {
    page: usize,
}

fn current_state(app_state: &AppState, params: ListingParams) -> QueryState {
    params.into_state(app_state.settings.items_per_page)
}

fn redirect_to(next: &QueryState) -> AppResult<Redirect> {
    let url = listing_url(next)?;
    tracing::debug!("Redirecting to {}", url);
    Ok(Redirect::to(&url))
}

pub async fn set_search_query(
    State(app_state): State<AppState>,
    Query(params): Query<ListingParams>,
    Form(form): Form<SearchForm>,
) -> AppResult<Redirect> {
    tracing::info!("[HANDLER] /home/search - New search text: {:?}", form.q);
    let next = state::apply_search(&current_state(&app_state, params), form.q);
    redirect_to(&next)
}

pub async fn set_filters(
    State(app_state): State<AppState>,
    Query(params): Query<ListingParams>,
    Form(patch): Form<FilterPatch>,
) -> AppResult<Redirect> {
    tracing::info!("[HANDLER] /home/filters - Filter update: {:?}", patch);
    let next = state::apply_filters(&current_state(&app_state, params), patch);
    redirect_to(&next)
}

pub async fn set_sort_by(
    State(app_state): State<AppState>,
    Query(params): Query<ListingParams>,
    Form(form): Form<SortForm>,
) -> AppResult<Redirect> {
    tracing::info!("[HANDLER] /home/sort - Sort requested: {}", form.sort);
    let sort_by: SortSpec = form
        .sort
        .parse()
        .map_err(|e: state::SortParseError| AppError::BadRequest(e.to_string()))?;
    let next = state::apply_sort(&current_state(&app_state, params), sort_by);
    redirect_to(&next)
}

pub async fn set_current_page(
    State(app_state): State<AppState>,
    Query(params): Query<ListingParams>,
    Form(form): Form<PageForm>,
) -> AppResult<Redirect> {
    tracing::info!("[HANDLER] /home/page - Page requested: {}", form.page);
    let next = state::apply_page(&current_state(&app_state, params), form.page);
    redirect_to(&next)
}

// "Clear All Filters" from the empty-results view: also drops the search text
pub async fn clear_query(
    State(app_state): State<AppState>,
    Query(params): Query<ListingParams>,
) -> AppResult<Redirect> {
    tracing::info!("[HANDLER] /home/clear - Clearing filters and search");
    let next = state::clear_query(&current_state(&app_state, params));
    redirect_to(&next)
}

// Filter, sort and paginate the car list for the current query state

use serde::Serialize;
use std::cmp::Ordering;
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use super::state::{Filters, QueryState, SortDirection, SortField, SortSpec};
use crate::models::Car;

// One rendered page of the catalog, tied to the state it was computed for
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogPage<'a> {
    pub cars: Vec<&'a Car>,
    pub total_pages: usize,
    pub current_page: usize,
    pub total_matches: usize,
    #[serde(skip)]
    pub query: &'a QueryState,
}

impl CatalogPage<'_> {
    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}

pub fn run<'a>(records: &'a [Car], state: &'a QueryState) -> CatalogPage<'a> {
    let mut matches = filter_cars(records, &state.search_query, &state.filters);
    sort_cars(&mut matches, state.sort_by);

    let total_matches = matches.len();
    let total_pages = total_pages(total_matches, state.items_per_page);
    let cars = paginate(&matches, state.current_page, state.items_per_page);
    tracing::debug!(
        total = records.len(),
        total_matches,
        total_pages,
        page = state.current_page,
        shown = cars.len(),
        "Ran catalog query"
    );

    CatalogPage {
        cars,
        total_pages,
        current_page: state.current_page,
        total_matches,
        query: state,
    }
}

pub fn filter_cars<'a>(records: &'a [Car], search_query: &str, filters: &Filters) -> Vec<&'a Car> {
    let needle = search_query.to_lowercase();
    records
        .iter()
        .filter(|car| matches_search(car, &needle) && matches_filters(car, filters))
        .collect()
}

// `needle` is already lowercased
fn matches_search(car: &Car, needle: &str) -> bool {
    needle.is_empty()
        || car.make.to_lowercase().contains(needle)
        || car.model.to_lowercase().contains(needle)
        || car.year.to_string().contains(needle)
}

fn matches_filters(car: &Car, filters: &Filters) -> bool {
    let min_year = parse_bound::<i32>(&filters.min_year);
    let max_year = parse_bound::<i32>(&filters.max_year);
    let min_price = parse_bound::<f64>(&filters.min_price).filter(|p| p.is_finite());
    let max_price = parse_bound::<f64>(&filters.max_price).filter(|p| p.is_finite());

    (filters.make.is_empty() || same_text(&car.make, &filters.make))
        && (filters.model.is_empty() || same_text(&car.model, &filters.model))
        && min_year.is_none_or(|min| car.year >= min)
        && max_year.is_none_or(|max| car.year <= max)
        && min_price.is_none_or(|min| car.price >= min)
        && max_price.is_none_or(|max| car.price <= max)
}

// Make/model equality used by the filters and by the selected option in the page
pub fn same_text(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

// Unparseable bounds count as unset
fn parse_bound<T: std::str::FromStr>(raw: &str) -> Option<T> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse().ok()
}

// Stable sort; ties keep their filtered order in both directions
pub fn sort_cars(cars: &mut [&Car], sort_by: SortSpec) {
    cars.sort_by(|a, b| {
        let ordering = compare_field(a, b, sort_by.field);
        match sort_by.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

fn compare_field(a: &Car, b: &Car, field: SortField) -> Ordering {
    match field {
        SortField::Price => a.price.total_cmp(&b.price),
        SortField::Year => a.year.cmp(&b.year),
        SortField::Mileage => a.mileage.total_cmp(&b.mileage),
        SortField::Make => collate(&a.make, &b.make),
        SortField::Model => collate(&a.model, &b.model),
    }
}

// Locale-style dictionary order. Letters compare without accents or case
// first ("Škoda" sits between "Seat" and "Tesla"); accents break ties next,
// then lowercase sorts before uppercase.
fn collate(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| b.cmp(a))
}

fn collation_key(value: &str) -> String {
    value
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

pub fn total_pages(count: usize, per_page: usize) -> usize {
    if per_page == 0 {
        return 0;
    }
    count.div_ceil(per_page)
}

// Items `[(page-1)*per_page, page*per_page)`, empty when the page is out of range
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Vec<T> {
    if page == 0 || per_page == 0 {
        return Vec::new();
    }
    let start = (page - 1).saturating_mul(per_page);
    if start >= items.len() {
        return Vec::new();
    }
    let end = start.saturating_add(per_page).min(items.len());
    items[start..end].to_vec()
}

// Distinct values of one field, in order of first appearance
pub fn distinct_values<'a>(records: &'a [Car], field: impl Fn(&'a Car) -> &'a str) -> Vec<&'a str> {
    let mut seen = std::collections::HashSet::new();
    records
        .iter()
        .map(field)
        .filter(|value| seen.insert(*value))
        .collect()
}

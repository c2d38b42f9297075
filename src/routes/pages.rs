// Server-rendered pages: the car listing and the per-car detail view

use askama::Template;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use super::load_catalog;
use crate::{
    AppState,
    error::AppError,
    feed,
    models::{Breadcrumb, Car, ListingParams},
    query::{
        Catalog, FilterPatch, Filters, SortSpec, pipeline,
        state::{SortDirection, SortField},
    },
};

// The sort selector, in display order
const SORT_OPTIONS: [(SortSpec, &str); 6] = [
    (SortSpec::new(SortField::Price, SortDirection::Asc), "Price: Low to High"),
    (SortSpec::new(SortField::Price, SortDirection::Desc), "Price: High to Low"),
    (SortSpec::new(SortField::Year, SortDirection::Desc), "Year: Newest First"),
    (SortSpec::new(SortField::Year, SortDirection::Asc), "Year: Oldest First"),
    (SortSpec::new(SortField::Mileage, SortDirection::Asc), "Mileage: Low to High"),
    (SortSpec::new(SortField::Mileage, SortDirection::Desc), "Mileage: High to Low"),
];

struct SelectOption {
    value: String,
    label: String,
    selected: bool,
}

struct HiddenField {
    name: &'static str,
    value: String,
}

impl HiddenField {
    // Keys left as `None` are not posted, so they keep their current value
    fn from_patch(patch: &FilterPatch) -> Vec<HiddenField> {
        [
            ("make", &patch.make),
            ("model", &patch.model),
            ("year", &patch.year),
            ("minYear", &patch.min_year),
            ("maxYear", &patch.max_year),
            ("minPrice", &patch.min_price),
            ("maxPrice", &patch.max_price),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.clone().map(|value| HiddenField { name, value }))
        .collect()
    }
}

// An active filter with the form fields that remove it
struct FilterChip {
    label: String,
    fields: Vec<HiddenField>,
}

impl FilterChip {
    fn new(label: String, removal: FilterPatch) -> Self {
        Self {
            fields: HiddenField::from_patch(&removal),
            label,
        }
    }
}

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.is_empty() { placeholder } else { value }
}

// Year and price ranges each show up as a single chip
fn filter_chips(filters: &Filters) -> Vec<FilterChip> {
    let clear = || Some(String::new());
    let mut chips = Vec::new();
    if !filters.make.is_empty() {
        chips.push(FilterChip::new(
            format!("Make: {}", filters.make),
            FilterPatch {
                make: clear(),
                ..FilterPatch::default()
            },
        ));
    }
    if !filters.model.is_empty() {
        chips.push(FilterChip::new(
            format!("Model: {}", filters.model),
            FilterPatch {
                model: clear(),
                ..FilterPatch::default()
            },
        ));
    }
    if !filters.min_year.is_empty() || !filters.max_year.is_empty() {
        chips.push(FilterChip::new(
            format!(
                "Year: {} - {}",
                or_placeholder(&filters.min_year, "Any"),
                or_placeholder(&filters.max_year, "Any")
            ),
            FilterPatch {
                min_year: clear(),
                max_year: clear(),
                ..FilterPatch::default()
            },
        ));
    }
    if !filters.min_price.is_empty() || !filters.max_price.is_empty() {
        chips.push(FilterChip::new(
            format!(
                "Price: ${} - ${}",
                or_placeholder(&filters.min_price, "0"),
                or_placeholder(&filters.max_price, "Any")
            ),
            FilterPatch {
                min_price: clear(),
                max_price: clear(),
                ..FilterPatch::default()
            },
        ));
    }
    chips
}

struct CarCard {
    href: String,
    title: String,
    year: i32,
    price: String,
    mileage: String,
    image: Option<String>,
}

#[derive(Template)]
#[template(path = "listing.html")]
struct ListingTemplate {
    breadcrumbs: Vec<Breadcrumb>,
    search_query: String,
    min_year: String,
    max_year: String,
    min_price: String,
    max_price: String,
    state_query: String, // Appended to every action URL so the action sees the current state
    make_options: Vec<SelectOption>,
    model_options: Vec<SelectOption>,
    sort_options: Vec<SelectOption>,
    has_active_filters: bool,
    active_filters: Vec<FilterChip>,
    clear_all_fields: Vec<HiddenField>,
    cars: Vec<CarCard>,
    total_matches: usize,
    current_page: usize,
    total_pages: usize,
    previous_page: Option<usize>,
    next_page: Option<usize>,
}

impl ListingTemplate {
    fn build(catalog: &Catalog) -> Result<Self, AppError> {
        let state = catalog.state();
        let filters = &state.filters;
        let page = catalog.page();

        let select_options = |values: Vec<&str>, current: &str| -> Vec<SelectOption> {
            values
                .into_iter()
                .map(|value| SelectOption {
                    value: value.to_string(),
                    label: value.to_string(),
                    selected: pipeline::same_text(value, current),
                })
                .collect()
        };

        Ok(Self {
            breadcrumbs: Breadcrumb::listing_trail(),
            search_query: state.search_query.clone(),
            min_year: filters.min_year.clone(),
            max_year: filters.max_year.clone(),
            min_price: filters.min_price.clone(),
            max_price: filters.max_price.clone(),
            state_query: ListingParams::from_state(state).to_query_string()?,
            make_options: select_options(catalog.makes(), &filters.make),
            model_options: select_options(catalog.models(), &filters.model),
            sort_options: SORT_OPTIONS
                .iter()
                .map(|(spec, label)| SelectOption {
                    value: spec.to_string(),
                    label: label.to_string(),
                    selected: *spec == state.sort_by,
                })
                .collect(),
            has_active_filters: !filters.is_empty(),
            active_filters: filter_chips(filters),
            clear_all_fields: HiddenField::from_patch(&FilterPatch::clear_all()),
            cars: page
                .cars
                .iter()
                .map(|car| CarCard {
                    href: format!("/car/{}", car.id),
                    title: car.title(),
                    year: car.year,
                    price: car.price_label(),
                    mileage: car.mileage_label(),
                    image: car.thumbnail().map(str::to_string),
                })
                .collect(),
            total_matches: page.total_matches,
            current_page: page.current_page,
            total_pages: page.total_pages,
            previous_page: page.has_previous().then(|| page.current_page - 1),
            next_page: page.has_next().then(|| page.current_page + 1),
        })
    }
}

struct SpecRow {
    name: String,
    value: String,
}

struct ImageDot {
    href: String,
    active: bool,
}

#[derive(Template)]
#[template(path = "car_detail.html")]
struct CarDetailTemplate {
    breadcrumbs: Vec<Breadcrumb>,
    title: String,
    make: String,
    model: String,
    year: i32,
    price: String,
    mileage: String,
    image: Option<String>,
    previous_image_href: String,
    next_image_href: String,
    has_multiple_images: bool,
    dots: Vec<ImageDot>,
    specifications: Vec<SpecRow>,
    description: Option<String>,
}

// Previous and next index around `current`, wrapping at both ends
fn carousel_neighbours(current: usize, len: usize) -> (usize, usize) {
    if len == 0 {
        return (0, 0);
    }
    let previous = if current == 0 { len - 1 } else { current - 1 };
    (previous, (current + 1) % len)
}

impl CarDetailTemplate {
    fn new(car: Car, requested_image: usize) -> Self {
        let image_count = car.images.len();
        let current = if image_count == 0 { 0 } else { requested_image % image_count };
        let (previous, next) = carousel_neighbours(current, image_count);
        let image_href = |index: usize| format!("/car/{}?image={}", car.id, index);

        Self {
            breadcrumbs: Breadcrumb::detail_trail(&car),
            title: format!("{} {} {}", car.make, car.model, car.year),
            price: car.price_label(),
            mileage: car.mileage_label(),
            image: car.images.get(current).cloned(),
            previous_image_href: image_href(previous),
            next_image_href: image_href(next),
            has_multiple_images: image_count > 1,
            dots: (0..image_count)
                .map(|index| ImageDot {
                    href: image_href(index),
                    active: index == current,
                })
                .collect(),
            specifications: car
                .specifications
                .iter()
                .flatten()
                .map(|(name, value)| SpecRow {
                    name: name.clone(),
                    value: value.clone(),
                })
                .collect(),
            description: car.description.clone(),
            year: car.year,
            make: car.make,
            model: car.model,
        }
    }
}

#[derive(Template)]
#[template(path = "not_found.html")]
struct NotFoundTemplate {
    breadcrumbs: Vec<Breadcrumb>,
    message: String,
}

fn render<T: Template>(template: T, name: &str) -> Result<Html<String>, AppError> {
    match template.render() {
        Ok(html) => Ok(Html(html)),
        Err(e) => {
            tracing::error!("Failed to render {} template: {}", name, e);
            Err(AppError::InternalServerError(anyhow::Error::new(e)))
        }
    }
}

// The site root only forwards to the listing
pub async fn index() -> Redirect {
    Redirect::permanent("/home")
}

pub async fn listing_page(
    State(app_state): State<AppState>,
    Query(params): Query<ListingParams>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!("[HANDLER] /home - Request received with params: {:?}", params);
    let catalog = load_catalog(&app_state, params).await;
    let template = ListingTemplate::build(&catalog)?;
    tracing::debug!(
        "[HANDLER] /home - Rendering {} cars, page {} of {}",
        template.cars.len(),
        template.current_page,
        template.total_pages
    );
    render(template, "listing")
}

#[derive(Deserialize, Debug)]
pub struct DetailParams {
    image: Option<String>,
}

pub async fn car_detail_page(
    State(app_state): State<AppState>,
    Path(raw_id): Path<String>,
    Query(params): Query<DetailParams>,
) -> Result<Response, AppError> {
    tracing::info!("[HANDLER] /car/:id - Request received for id: {}", raw_id);
    let car = feed::find_car(&app_state.http_client, &app_state.settings.feed_url, &raw_id).await;

    match car {
        Some(car) => {
            let image = params
                .image
                .and_then(|raw| raw.trim().parse::<usize>().ok())
                .unwrap_or(0);
            Ok(render(CarDetailTemplate::new(car, image), "car detail")?.into_response())
        }
        None => {
            let template = NotFoundTemplate {
                breadcrumbs: Breadcrumb::listing_trail(),
                message: "Car not found".to_string(),
            };
            Ok((StatusCode::NOT_FOUND, render(template, "not found")?).into_response())
        }
    }
}

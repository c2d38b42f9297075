// Data structures shared by the feed, the query pipeline and the pages

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::query::{FilterPatch, QueryState, SortSpec};

// A single car as published by the listing feed
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Car {
    pub id: i64,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub price: f64,
    pub mileage: f64,
    #[serde(rename = "image", default)] // Feed key is singular
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specifications: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Car {
    pub fn title(&self) -> String {
        format!("{} {}", self.make, self.model)
    }

    pub fn thumbnail(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    pub fn price_label(&self) -> String {
        format!("${}", group_thousands(self.price))
    }

    pub fn mileage_label(&self) -> String {
        format!("{} miles", group_thousands(self.mileage))
    }
}

// One entry of the navigation trail rendered above each page
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Breadcrumb {
    pub label: String,
    pub href: String,
}

impl Breadcrumb {
    pub fn new(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: href.into(),
        }
    }

    // Trail shared by every listing page
    pub fn listing_trail() -> Vec<Breadcrumb> {
        vec![
            Breadcrumb::new("Home", "/"),
            Breadcrumb::new("Car Listings", "/home"),
        ]
    }

    pub fn detail_trail(car: &Car) -> Vec<Breadcrumb> {
        let mut trail = Self::listing_trail();
        trail.push(Breadcrumb::new(car.title(), format!("/car/{}", car.id)));
        trail
    }
}

// Listing page query string; carries the whole query state of the page
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")] // Match the form field names
pub struct ListingParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>, // Shorthand for minYear = maxYear
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>, // e.g. "price-asc"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
}

impl ListingParams {
    // Bad sort or page values from a hand-edited URL fall back to the defaults
    pub fn into_state(self, items_per_page: usize) -> QueryState {
        let mut state = QueryState::new(items_per_page);
        state.search_query = self.q.unwrap_or_default();
        state.filters.merge(FilterPatch {
            make: self.make,
            model: self.model,
            year: self.year,
            min_year: self.min_year,
            max_year: self.max_year,
            min_price: self.min_price,
            max_price: self.max_price,
        });
        if let Some(sort) = self.sort.filter(|s| !s.is_empty()) {
            match sort.parse::<SortSpec>() {
                Ok(spec) => state.sort_by = spec,
                Err(e) => tracing::debug!("Ignoring sort parameter: {}", e),
            }
        }
        if let Some(page) = self.page {
            match page.trim().parse::<usize>() {
                Ok(n) => state.current_page = n,
                Err(e) => tracing::debug!(page = %page, "Ignoring page parameter: {}", e),
            }
        }
        state
    }

    // Defaults are left out to keep URLs short
    pub fn from_state(state: &QueryState) -> Self {
        let filters = &state.filters;
        Self {
            q: non_empty(&state.search_query),
            make: non_empty(&filters.make),
            model: non_empty(&filters.model),
            year: None,
            min_year: non_empty(&filters.min_year),
            max_year: non_empty(&filters.max_year),
            min_price: non_empty(&filters.min_price),
            max_price: non_empty(&filters.max_price),
            sort: (state.sort_by != SortSpec::default()).then(|| state.sort_by.to_string()),
            page: (state.current_page != 1).then(|| state.current_page.to_string()),
        }
    }

    pub fn to_query_string(&self) -> Result<String> {
        serde_urlencoded::to_string(self).context("Failed to encode listing query string")
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

// Formats 45000.0 as "45,000"; fractional amounts keep two decimals
fn group_thousands(value: f64) -> String {
    let negative = value < 0.0;
    let total_cents = (value.abs() * 100.0).round() as u64;
    let whole = total_cents / 100;
    let cents = total_cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if cents > 0 {
        grouped.push_str(&format!(".{:02}", cents));
    }
    if negative {
        grouped.insert(0, '-');
    }
    grouped
}

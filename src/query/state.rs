// Query state for the listing page and the reducers that mutate it.
// Changing the search text, the filters or the sort order goes back to page 1;
// changing the page stores the requested page as-is.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

pub const DEFAULT_ITEMS_PER_PAGE: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[default]
    Price,
    Year,
    Mileage,
    Make,
    Model,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Price => "price",
            SortField::Year => "year",
            SortField::Mileage => "mileage",
            SortField::Make => "make",
            SortField::Model => "model",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortSpec {
    pub const fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SortParseError {
    #[error("sort value '{0}' is not of the form <field>-<direction>")]
    Malformed(String),
    #[error("unknown sort field '{0}'")]
    UnknownField(String),
    #[error("unknown sort direction '{0}'")]
    UnknownDirection(String),
}

// Selector values look like "price-asc" / "year-desc"
impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.field.as_str(), self.direction.as_str())
    }
}

impl FromStr for SortSpec {
    type Err = SortParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, direction) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| SortParseError::Malformed(s.to_string()))?;
        let field = match field {
            "price" => SortField::Price,
            "year" => SortField::Year,
            "mileage" => SortField::Mileage,
            "make" => SortField::Make,
            "model" => SortField::Model,
            other => return Err(SortParseError::UnknownField(other.to_string())),
        };
        let direction = match direction {
            "asc" => SortDirection::Asc,
            "desc" => SortDirection::Desc,
            other => return Err(SortParseError::UnknownDirection(other.to_string())),
        };
        Ok(SortSpec::new(field, direction))
    }
}

// Active filter values. An empty string means the filter is unset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Filters {
    pub make: String,
    pub model: String,
    pub min_year: String,
    pub max_year: String,
    pub min_price: String,
    pub max_price: String,
}

// Partial filter update: `None` keeps the current value, `Some("")` clears it.
// Unrecognized keys are dropped by serde.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    // Single-year shorthand, sets both ends of the year range
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<String>,
}

impl FilterPatch {
    pub fn clear_all() -> Self {
        Self {
            make: Some(String::new()),
            model: Some(String::new()),
            year: None,
            min_year: Some(String::new()),
            max_year: Some(String::new()),
            min_price: Some(String::new()),
            max_price: Some(String::new()),
        }
    }
}

impl Filters {
    pub fn merge(&mut self, patch: FilterPatch) {
        if let Some(year) = patch.year {
            self.min_year = year.clone();
            self.max_year = year;
        }
        if let Some(make) = patch.make {
            self.make = make;
        }
        if let Some(model) = patch.model {
            self.model = model;
        }
        if let Some(min_year) = patch.min_year {
            self.min_year = min_year;
        }
        if let Some(max_year) = patch.max_year {
            self.max_year = max_year;
        }
        if let Some(min_price) = patch.min_price {
            self.min_price = min_price;
        }
        if let Some(max_price) = patch.max_price {
            self.max_price = max_price;
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Filters::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryState {
    pub search_query: String,
    pub filters: Filters,
    pub sort_by: SortSpec,
    pub current_page: usize, // 1-based, never clamped
    pub items_per_page: usize,
}

impl QueryState {
    pub fn new(items_per_page: usize) -> Self {
        Self {
            search_query: String::new(),
            filters: Filters::default(),
            sort_by: SortSpec::default(),
            current_page: 1,
            items_per_page,
        }
    }
}

impl Default for QueryState {
    fn default() -> Self {
        Self::new(DEFAULT_ITEMS_PER_PAGE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum QueryAction {
    SetSearchQuery(String),
    SetFilters(FilterPatch),
    SetSortBy(SortSpec),
    SetCurrentPage(usize),
}

pub fn apply_search(state: &QueryState, text: impl Into<String>) -> QueryState {
    QueryState {
        search_query: text.into(),
        current_page: 1,
        ..state.clone()
    }
}

pub fn apply_filters(state: &QueryState, patch: FilterPatch) -> QueryState {
    let mut next = state.clone();
    next.filters.merge(patch);
    next.current_page = 1;
    next
}

pub fn apply_sort(state: &QueryState, sort_by: SortSpec) -> QueryState {
    QueryState {
        sort_by,
        current_page: 1,
        ..state.clone()
    }
}

pub fn apply_page(state: &QueryState, page: usize) -> QueryState {
    QueryState {
        current_page: page,
        ..state.clone()
    }
}

// Empties every filter and the search text; the sort order is kept
pub fn clear_query(state: &QueryState) -> QueryState {
    apply_search(&apply_filters(state, FilterPatch::clear_all()), "")
}

pub fn reduce(state: &QueryState, action: QueryAction) -> QueryState {
    match action {
        QueryAction::SetSearchQuery(text) => apply_search(state, text),
        QueryAction::SetFilters(patch) => apply_filters(state, patch),
        QueryAction::SetSortBy(sort_by) => apply_sort(state, sort_by),
        QueryAction::SetCurrentPage(page) => apply_page(state, page),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use proptest::prelude::*;

    fn on_page(page: usize) -> QueryState {
        QueryState {
            current_page: page,
            ..QueryState::default()
        }
    }

    #[test]
    fn defaults_match_initial_listing() {
        let state = QueryState::default();
        assert_eq!(state.search_query, "");
        assert!(state.filters.is_empty());
        assert_eq!(state.sort_by, SortSpec::new(SortField::Price, SortDirection::Asc));
        assert_eq!(state.current_page, 1);
        assert_eq!(state.items_per_page, 6);
    }

    #[test]
    fn search_replaces_text_and_resets_page() {
        let next = apply_search(&on_page(4), "bmw");
        assert_eq!(next.search_query, "bmw");
        assert_eq!(next.current_page, 1);

        let cleared = apply_search(&next, "");
        assert_eq!(cleared.search_query, "");
    }

    #[test]
    fn filters_merge_instead_of_replace() {
        let mut state = on_page(3);
        state.filters.make = "BMW".to_string();
        state.filters.min_price = "40000".to_string();

        let next = apply_filters(
            &state,
            FilterPatch {
                max_price: Some("55000".to_string()),
                ..FilterPatch::default()
            },
        );
        assert_eq!(next.filters.make, "BMW");
        assert_eq!(next.filters.min_price, "40000");
        assert_eq!(next.filters.max_price, "55000");
        assert_eq!(next.current_page, 1);
    }

    #[test]
    fn empty_string_clears_a_filter() {
        let mut state = QueryState::default();
        state.filters.make = "Audi".to_string();
        let next = apply_filters(
            &state,
            FilterPatch {
                make: Some(String::new()),
                ..FilterPatch::default()
            },
        );
        assert_eq!(next.filters.make, "");
        assert!(next.filters.is_empty());
    }

    #[test]
    fn single_year_sets_both_range_ends() {
        let next = apply_filters(
            &QueryState::default(),
            FilterPatch {
                year: Some("2020".to_string()),
                ..FilterPatch::default()
            },
        );
        assert_eq!(next.filters.min_year, "2020");
        assert_eq!(next.filters.max_year, "2020");
    }

    #[test]
    fn unknown_filter_keys_are_ignored() {
        let patch: FilterPatch =
            serde_json::from_str(r#"{"make":"BMW","colour":"red"}"#).expect("patch json");
        assert_eq!(patch.make.as_deref(), Some("BMW"));
        assert_eq!(patch.model, None);
    }

    #[test]
    fn sort_replaces_spec_and_resets_page() {
        let spec = SortSpec::new(SortField::Mileage, SortDirection::Desc);
        let next = apply_sort(&on_page(2), spec);
        assert_eq!(next.sort_by, spec);
        assert_eq!(next.current_page, 1);
    }

    #[test]
    fn page_is_stored_verbatim() {
        assert_eq!(apply_page(&QueryState::default(), 2).current_page, 2);
        assert_eq!(apply_page(&QueryState::default(), 0).current_page, 0);
        assert_eq!(apply_page(&QueryState::default(), 99).current_page, 99);
    }

    #[test]
    fn sort_spec_parses_selector_values() {
        for value in ["price-asc", "year-desc", "mileage-asc", "make-desc", "model-asc"] {
            let spec: SortSpec = value.parse().expect("sort value");
            assert_eq!(spec.to_string(), value);
        }
        assert_eq!(
            "color-asc".parse::<SortSpec>(),
            Err(SortParseError::UnknownField("color".to_string()))
        );
        assert_eq!(
            "price-up".parse::<SortSpec>(),
            Err(SortParseError::UnknownDirection("up".to_string()))
        );
        assert_eq!(
            "price".parse::<SortSpec>(),
            Err(SortParseError::Malformed("price".to_string()))
        );
    }

    #[test]
    fn actions_use_type_and_payload_tags() {
        let action: QueryAction = serde_json::from_str(
            r#"{"type":"setSortBy","payload":{"field":"year","direction":"desc"}}"#,
        )
        .expect("action json");
        assert_eq!(
            action,
            QueryAction::SetSortBy(SortSpec::new(SortField::Year, SortDirection::Desc))
        );

        let action: QueryAction =
            serde_json::from_str(r#"{"type":"setFilters","payload":{"minPrice":"40000"}}"#)
                .expect("action json");
        assert_eq!(
            action,
            QueryAction::SetFilters(FilterPatch {
                min_price: Some("40000".to_string()),
                ..FilterPatch::default()
            })
        );
    }

    #[test]
    fn clearing_the_query_keeps_the_sort() {
        let mut state = on_page(3);
        state.search_query = "x5".to_string();
        state.filters.make = "BMW".to_string();
        state.filters.max_price = "60000".to_string();
        state.sort_by = SortSpec::new(SortField::Year, SortDirection::Desc);

        let cleared = clear_query(&state);
        assert_eq!(cleared.search_query, "");
        assert!(cleared.filters.is_empty());
        assert_eq!(cleared.sort_by, state.sort_by);
        assert_eq!(cleared.current_page, 1);
    }

    fn arb_value() -> impl Strategy<Value = Option<String>> {
        proptest::option::of("[A-Za-z0-9]{0,6}")
    }

    fn arb_patch() -> impl Strategy<Value = FilterPatch> {
        (arb_value(), arb_value(), arb_value(), arb_value(), arb_value(), arb_value())
            .prop_map(|(make, model, min_year, max_year, min_price, max_price)| FilterPatch {
                make,
                model,
                year: None,
                min_year,
                max_year,
                min_price,
                max_price,
            })
    }

    pub(crate) fn arb_sort() -> impl Strategy<Value = SortSpec> {
        (
            prop_oneof![
                Just(SortField::Price),
                Just(SortField::Year),
                Just(SortField::Mileage),
                Just(SortField::Make),
                Just(SortField::Model),
            ],
            prop_oneof![Just(SortDirection::Asc), Just(SortDirection::Desc)],
        )
            .prop_map(|(field, direction)| SortSpec::new(field, direction))
    }

    fn arb_action() -> impl Strategy<Value = QueryAction> {
        prop_oneof![
            "[a-z0-9 ]{0,8}".prop_map(QueryAction::SetSearchQuery),
            arb_patch().prop_map(QueryAction::SetFilters),
            arb_sort().prop_map(QueryAction::SetSortBy),
            (0usize..20).prop_map(QueryAction::SetCurrentPage),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn query_changes_always_return_to_first_page(
            page in 0usize..50,
            action in arb_action(),
        ) {
            let next = reduce(&on_page(page), action.clone());
            match action {
                QueryAction::SetCurrentPage(n) => {
                    prop_assert_eq!(next.current_page, n);
                }
                _ => {
                    prop_assert_eq!(next.current_page, 1);
                }
            }
        }

        #[test]
        fn single_key_patch_leaves_other_keys_alone(
            before in arb_patch(),
            value in "[A-Za-z0-9]{0,6}",
        ) {
            let mut state = QueryState::default();
            state.filters.merge(before);
            let next = apply_filters(&state, FilterPatch {
                model: Some(value.clone()),
                ..FilterPatch::default()
            });
            prop_assert_eq!(&next.filters.model, &value);
            prop_assert_eq!(&next.filters.make, &state.filters.make);
            prop_assert_eq!(&next.filters.min_year, &state.filters.min_year);
            prop_assert_eq!(&next.filters.max_year, &state.filters.max_year);
            prop_assert_eq!(&next.filters.min_price, &state.filters.min_price);
            prop_assert_eq!(&next.filters.max_price, &state.filters.max_price);
        }
    }
}

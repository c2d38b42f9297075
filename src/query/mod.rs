// The query state store and the filter/sort/paginate pass over the car list

pub mod pipeline;
pub mod state;

pub use pipeline::CatalogPage;
pub use state::{FilterPatch, Filters, QueryAction, QueryState, SortSpec};

use crate::models::Car;

// The car list for one page load together with the query applied to it.
// Every mutation goes through `dispatch`, which hands back the recomputed page.
#[derive(Debug, Clone)]
pub struct Catalog {
    records: Vec<Car>,
    state: QueryState,
}

impl Catalog {
    pub fn new(records: Vec<Car>, state: QueryState) -> Self {
        Self { records, state }
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    pub fn dispatch(&mut self, action: QueryAction) -> CatalogPage<'_> {
        tracing::debug!(?action, "Dispatching query action");
        self.state = state::reduce(&self.state, action);
        self.page()
    }

    pub fn page(&self) -> CatalogPage<'_> {
        pipeline::run(&self.records, &self.state)
    }

    pub fn makes(&self) -> Vec<&str> {
        pipeline::distinct_values(&self.records, |car| car.make.as_str())
    }

    pub fn models(&self) -> Vec<&str> {
        pipeline::distinct_values(&self.records, |car| car.model.as_str())
    }
}

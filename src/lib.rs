pub mod adapters;
pub mod config;
pub mod domain;
pub mod services;

use {
    domain::provider::RetailProvider, services::closure_aggregator::ClosureAggregator,
    std::sync::Arc,
};

#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<ClosureAggregator>,
    pub provider: Arc<dyn RetailProvider>,
}

#![allow(dead_code)]

use closure_sync::config::AggregationConfig;
use closure_sync::domain::error::ClosureError;
use closure_sync::domain::id::{OutletId, RegisterId};
use closure_sync::domain::provider::{ProviderFuture, RetailProvider};
use closure_sync::domain::register::{Outlet, PaymentRecord, PaymentSummary, Register};
use closure_sync::services::closure_aggregator::ClosureAggregator;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// In-memory vendor. Unknown summaries and outlets answer 404.
#[derive(Default)]
pub struct FakeProvider {
    registers: Vec<Register>,
    fail_listing: bool,
    summaries: HashMap<String, PaymentSummary>,
    failing_summaries: HashSet<String>,
    outlets: HashMap<String, Outlet>,
    delays: HashMap<String, Duration>,
    listing_delay: Option<Duration>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_register(mut self, id: &str, outlet: Option<&str>, close_time: Option<&str>) -> Self {
        self.registers.push(make_register(id, outlet, close_time));
        self
    }

    pub fn with_summary(mut self, id: &str, totals: Vec<serde_json::Value>, sequence: Option<i64>) -> Self {
        self.summaries.insert(
            id.to_string(),
            PaymentSummary {
                payments: totals.into_iter().map(PaymentRecord::new).collect(),
                sequence_number: sequence,
            },
        );
        self
    }

    pub fn with_failing_summary(mut self, id: &str) -> Self {
        self.failing_summaries.insert(id.to_string());
        self
    }

    pub fn with_outlet(mut self, id: &str, name: &str) -> Self {
        self.outlets.insert(
            id.to_string(),
            Outlet {
                id: OutletId::new(id).unwrap(),
                name: name.to_string(),
            },
        );
        self
    }

    /// Delay the payments summary of one register.
    pub fn with_delay(mut self, id: &str, delay: Duration) -> Self {
        self.delays.insert(id.to_string(), delay);
        self
    }

    pub fn with_listing_delay(mut self, delay: Duration) -> Self {
        self.listing_delay = Some(delay);
        self
    }

    pub fn with_failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

fn not_found(path: String) -> ClosureError {
    ClosureError::Upstream {
        status: 404,
        path,
        body: "not found".into(),
    }
}

impl RetailProvider for FakeProvider {
    fn list_registers(&self) -> ProviderFuture<'_, Vec<Register>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            if let Some(delay) = self.listing_delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail_listing {
                return Err(ClosureError::Upstream {
                    status: 503,
                    path: "/registers".into(),
                    body: "maintenance".into(),
                });
            }
            Ok(self.registers.clone())
        })
    }

    fn fetch_payments_summary(&self, id: &RegisterId) -> ProviderFuture<'_, PaymentSummary> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let id = id.as_str().to_string();
        Box::pin(async move {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            if let Some(delay) = self.delays.get(&id) {
                tokio::time::sleep(*delay).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.failing_summaries.contains(&id) {
                return Err(ClosureError::Upstream {
                    status: 500,
                    path: format!("/registers/{id}/payments_summary"),
                    body: "internal error".into(),
                });
            }
            self.summaries
                .get(&id)
                .cloned()
                .ok_or_else(|| not_found(format!("/registers/{id}/payments_summary")))
        })
    }

    fn fetch_outlet(&self, id: &OutletId) -> ProviderFuture<'_, Outlet> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let id = id.as_str().to_string();
        Box::pin(async move {
            self.outlets
                .get(&id)
                .cloned()
                .ok_or_else(|| not_found(format!("/outlets/{id}")))
        })
    }

    fn list_outlets(&self) -> ProviderFuture<'_, Vec<Outlet>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move { Ok(self.outlets.values().cloned().collect()) })
    }
}

pub fn make_register(id: &str, outlet: Option<&str>, close_time: Option<&str>) -> Register {
    Register {
        id: RegisterId::new(id).unwrap(),
        name: Some(format!("Register {id}")),
        outlet_id: outlet.map(|o| OutletId::new(o).unwrap()),
        is_open: close_time.is_none(),
        register_close_time: close_time.map(str::to_string),
        register_open_time: None,
    }
}

pub fn aggregation_config() -> AggregationConfig {
    AggregationConfig {
        concurrency: 4,
        register_timeout: Duration::from_secs(5),
        deadline: Duration::from_secs(30),
        closure_url_template: "https://shop.example/register/closure/summary/{id}".into(),
    }
}

pub fn aggregator(provider: Arc<FakeProvider>) -> ClosureAggregator {
    aggregator_with(provider, aggregation_config())
}

pub fn aggregator_with(provider: Arc<FakeProvider>, config: AggregationConfig) -> ClosureAggregator {
    ClosureAggregator::new(provider, config)
}

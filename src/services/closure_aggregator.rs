use {
    crate::{
        config::AggregationConfig,
        domain::{
            closure::{ClosureBatch, ClosureDate, ClosureReport, NewClosureReport, NoMatchDiagnostics},
            error::ClosureError,
            money::Amount,
            provider::RetailProvider,
            register::{Outlet, PaymentSummary, Register},
        },
    },
    futures::stream::{self, StreamExt},
    std::{collections::BTreeSet, sync::Arc, time::Instant},
};

/// Builds closure reports for one calendar day out of register, payment
/// summary and outlet data fetched from the vendor.
pub struct ClosureAggregator {
    provider: Arc<dyn RetailProvider>,
    config: AggregationConfig,
}

impl ClosureAggregator {
    pub fn new(provider: Arc<dyn RetailProvider>, config: AggregationConfig) -> Self {
        Self { provider, config }
    }

    /// Only a failed register listing fails the call. Per-register failures
    /// become degraded rows; the deadline cuts the run short and returns
    /// whatever finished.
    pub async fn aggregate(&self, date: &ClosureDate) -> Result<ClosureBatch, ClosureError> {
        let started = Instant::now();
        let deadline = tokio::time::Instant::now() + self.config.deadline;

        let registers = tokio::time::timeout_at(deadline, self.provider.list_registers())
            .await
            .map_err(|_| {
                ClosureError::Timeout(format!(
                    "register list not received within {:?}",
                    self.config.deadline
                ))
            })??;

        for register in &registers {
            if let Some(raw) = register.unreadable_close_time() {
                tracing::warn!(register_id = %register.id, raw, "unreadable register_close_time, ignoring");
            }
        }

        let matched: Vec<Register> = registers
            .iter()
            .filter(|r| r.closes_on(date))
            .cloned()
            .collect();
        tracing::info!(
            %date,
            registers = registers.len(),
            matched = matched.len(),
            "aggregating closures"
        );

        if matched.is_empty() {
            return Ok(ClosureBatch::no_match(*date, diagnostics(&registers)));
        }

        let mut slots: Vec<Option<ClosureReport>> = vec![None; matched.len()];
        let mut pending = stream::iter(matched.clone().into_iter().enumerate())
            .map(|(slot, register)| async move { (slot, self.reconcile(&register, date).await) })
            .buffer_unordered(self.config.concurrency);

        let mut truncated = false;
        loop {
            match tokio::time::timeout_at(deadline, pending.next()).await {
                Ok(Some((slot, report))) => slots[slot] = Some(report),
                Ok(None) => break,
                Err(_) => {
                    truncated = true;
                    break;
                }
            }
        }
        drop(pending);

        let unfinished: Vec<_> = slots
            .iter()
            .zip(&matched)
            .filter(|(slot, _)| slot.is_none())
            .map(|(_, register)| register.id.clone())
            .collect();
        let reports: Vec<ClosureReport> = slots.into_iter().flatten().collect();

        let note = truncated.then(|| {
            tracing::warn!(
                %date,
                finished = reports.len(),
                unfinished = unfinished.len(),
                "aggregation deadline reached"
            );
            format!(
                "aggregation stopped after {:?}: {} of {} registers not reported",
                self.config.deadline,
                unfinished.len(),
                matched.len()
            )
        });

        let batch = ClosureBatch {
            date: *date,
            matched: matched.len(),
            reports,
            truncated,
            note,
            unfinished,
            diagnostics: None,
        };

        tracing::info!(
            %date,
            complete = batch.complete_count(),
            degraded = batch.degraded_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "closures aggregated"
        );
        Ok(batch)
    }

    /// Fetch details for one register and build its row. Never fails: any
    /// error ends up in the row itself.
    async fn reconcile(&self, register: &Register, date: &ClosureDate) -> ClosureReport {
        let fetched =
            tokio::time::timeout(self.config.register_timeout, self.fetch_details(register)).await;

        let mut errors = Vec::new();
        let (total, sequence_number, outlet_name) = match fetched {
            Ok((summary, outlet)) => {
                let (total, sequence_number) = match summary {
                    Ok(summary) => (summary.total(), summary.sequence_number),
                    Err(e) => {
                        errors.push(format!("payments summary: {e}"));
                        (Amount::ZERO, None)
                    }
                };
                let outlet_name = match outlet {
                    Ok(outlet) => Some(outlet.name),
                    Err(e) => {
                        errors.push(format!("outlet: {e}"));
                        None
                    }
                };
                (total, sequence_number, outlet_name)
            }
            Err(_) => {
                errors.push(format!(
                    "details not received within {:?}",
                    self.config.register_timeout
                ));
                (Amount::ZERO, None, None)
            }
        };

        let error = (!errors.is_empty()).then(|| errors.join("; "));
        if let Some(error) = &error {
            tracing::warn!(register_id = %register.id, %date, %error, "degraded closure report");
        }

        ClosureReport::new(NewClosureReport {
            register_id: register.id.clone(),
            register_name: register.name().to_string(),
            outlet_name,
            date: *date,
            closed_at: register.closed_at().unwrap_or_default(),
            total,
            sequence_number,
            url: self.config.closure_url(register.id.as_str()),
            error,
        })
    }

    async fn fetch_details(
        &self,
        register: &Register,
    ) -> (Result<PaymentSummary, String>, Result<Outlet, String>) {
        let summary = async {
            self.provider
                .fetch_payments_summary(&register.id)
                .await
                .map_err(|e| e.to_string())
        };
        let outlet = async {
            match &register.outlet_id {
                Some(id) => self.provider.fetch_outlet(id).await.map_err(|e| e.to_string()),
                None => Err("register has no outlet_id".to_string()),
            }
        };
        tokio::join!(summary, outlet)
    }
}

fn diagnostics(registers: &[Register]) -> NoMatchDiagnostics {
    let dates: Vec<_> = registers.iter().filter_map(Register::close_date).collect();
    NoMatchDiagnostics {
        closed_registers: dates.len(),
        available_dates: dates
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(ClosureDate::from)
            .collect(),
    }
}

use {
    super::error::ClosureError,
    super::id::{OutletId, RegisterId},
    super::register::{Outlet, PaymentSummary, Register},
    std::{future::Future, pin::Pin},
};

pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ClosureError>> + Send + 'a>>;

/// Read-only access to the point-of-sale vendor.
pub trait RetailProvider: Send + Sync {
    /// Every register, across all pages.
    fn list_registers(&self) -> ProviderFuture<'_, Vec<Register>>;

    fn fetch_payments_summary(&self, id: &RegisterId) -> ProviderFuture<'_, PaymentSummary>;

    fn fetch_outlet(&self, id: &OutletId) -> ProviderFuture<'_, Outlet>;

    fn list_outlets(&self) -> ProviderFuture<'_, Vec<Outlet>>;
}

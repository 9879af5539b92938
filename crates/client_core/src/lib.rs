use async_trait::async_trait;
use shared::{
    domain::{ClienteId, PagoId},
    protocol::{Cliente, ClientesQuery, ExcelExportQuery, Pago, PageEnvelope, PageResponse, PagosQuery},
};

pub mod cache;
pub mod controller;
pub mod debounce;
pub mod error;
pub mod export;
pub mod payments;
pub mod query;
pub mod transport;

pub use controller::{ListController, ListControllerOptions, ListSnapshot, Pagination};
pub use error::{ExportError, FetchError};
pub use payments::PaymentsController;
pub use query::QueryKey;
pub use transport::HttpBackend;

#[async_trait]
pub trait ClientesBackend: Send + Sync {
    async fn list_clientes(&self, query: &ClientesQuery)
        -> Result<PageResponse<Cliente>, FetchError>;
    async fn export_excel(&self, query: ExcelExportQuery) -> Result<Vec<u8>, FetchError>;
}

#[async_trait]
pub trait PagosBackend: Send + Sync {
    async fn list_pagos(
        &self,
        cliente_id: ClienteId,
        query: &PagosQuery,
    ) -> Result<PageEnvelope<Pago>, FetchError>;
    async fn cancel_pago(&self, pago_id: PagoId) -> Result<(), FetchError>;
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;

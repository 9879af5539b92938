//! reqwest implementation of the backend traits.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{ClienteId, PagoId},
    protocol::{
        Cliente, ClientesQuery, ExcelExportQuery, Pago, PageEnvelope, PageResponse, PagosQuery,
    },
};
use tracing::debug;
use url::Url;

use crate::{error::FetchError, ClientesBackend, PagosBackend};

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: Client,
    api_url: String,
}

impl HttpBackend {
    pub fn new(api_url: &str) -> Result<Self, FetchError> {
        Self::with_timeout(api_url, None)
    }

    /// `timeout` bounds each whole request; `None` leaves reqwest's default.
    pub fn with_timeout(api_url: &str, timeout: Option<Duration>) -> Result<Self, FetchError> {
        let parsed = Url::parse(api_url.trim())?;
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            api_url: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    async fn checked(response: Response) -> Result<Response, FetchError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(FetchError::status(status.as_u16(), &body))
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, FetchError> {
        let bytes = Self::checked(response).await?.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl ClientesBackend for HttpBackend {
    async fn list_clientes(
        &self,
        query: &ClientesQuery,
    ) -> Result<PageResponse<Cliente>, FetchError> {
        debug!(page = query.page, search = ?query.search, sort = %query.sort_dir, "GET /api/clientes");
        let response = self
            .http
            .get(format!("{}/api/clientes", self.api_url))
            .query(query)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn export_excel(&self, query: ExcelExportQuery) -> Result<Vec<u8>, FetchError> {
        debug!(mes = query.mes, anio = query.anio, "GET /api/clientes/exportar/excel");
        let response = self
            .http
            .get(format!("{}/api/clientes/exportar/excel", self.api_url))
            .query(&query)
            .header(reqwest::header::ACCEPT, XLSX_MIME)
            .send()
            .await?;
        let bytes = Self::checked(response).await?.bytes().await?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl PagosBackend for HttpBackend {
    async fn list_pagos(
        &self,
        cliente_id: ClienteId,
        query: &PagosQuery,
    ) -> Result<PageEnvelope<Pago>, FetchError> {
        debug!(%cliente_id, page = query.page, "GET /api/pagos/cliente");
        let response = self
            .http
            .get(format!("{}/api/pagos/cliente/{cliente_id}", self.api_url))
            .query(query)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn cancel_pago(&self, pago_id: PagoId) -> Result<(), FetchError> {
        debug!(%pago_id, "DELETE /api/pagos/cancelar");
        let response = self
            .http
            .delete(format!("{}/api/pagos/cancelar/{pago_id}", self.api_url))
            .send()
            .await?;
        Self::checked(response).await?;
        Ok(())
    }
}

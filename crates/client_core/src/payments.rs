//! Payments table for a single client: filters, sorting and cancellation.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use shared::{
    domain::{ClienteId, PagoId, PagoSortKey, SortDirection, PAGE_SIZE},
    protocol::{Pago, PagosQuery},
};
use tracing::{error, info, warn};

use crate::PagosBackend;

pub const LOAD_ERROR_MESSAGE: &str = "could not load payments";
pub const CANCEL_ERROR_MESSAGE: &str = "could not cancel the payment";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PagoSort {
    pub key: PagoSortKey,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PagoFilters {
    pub search: String,
    pub tipo_deuda: String,
    pub fecha_inicio: Option<NaiveDate>,
    pub fecha_fin: Option<NaiveDate>,
}

pub struct PaymentsController {
    backend: Arc<dyn PagosBackend>,
    cliente_id: ClienteId,
    filters: PagoFilters,
    sort: PagoSort,
    /// One-indexed.
    current_page: u32,
    total_pages: u32,
    total_elements: u64,
    payments: Vec<Pago>,
    error: Option<String>,
    loading: bool,
    last_query: Option<PagosQuery>,
}

impl PaymentsController {
    pub fn new(backend: Arc<dyn PagosBackend>, cliente_id: ClienteId) -> Self {
        Self {
            backend,
            cliente_id,
            filters: PagoFilters::default(),
            sort: PagoSort::default(),
            current_page: 1,
            total_pages: 1,
            total_elements: 0,
            payments: Vec::new(),
            error: None,
            loading: false,
            last_query: None,
        }
    }

    pub fn payments(&self) -> &[Pago] {
        &self.payments
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn total_elements(&self) -> u64 {
        self.total_elements
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn sort(&self) -> PagoSort {
        self.sort
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.filters.search = search.into();
    }

    /// An empty string means "all debt types".
    pub fn set_tipo_deuda(&mut self, tipo_deuda: impl Into<String>) {
        self.filters.tipo_deuda = tipo_deuda.into();
    }

    /// The range only reaches the backend once both ends are set.
    pub fn set_date_range(&mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) {
        self.filters.fecha_inicio = start;
        self.filters.fecha_fin = end;
    }

    pub fn request_sort(&mut self, key: PagoSortKey) {
        let direction = if self.sort.key == key {
            self.sort.direction.toggled()
        } else {
            SortDirection::Asc
        };
        self.sort = PagoSort { key, direction };
    }

    pub fn set_sort(&mut self, key: PagoSortKey, direction: SortDirection) {
        self.sort = PagoSort { key, direction };
    }

    /// Takes a one-indexed page, clamped to the pages last reported.
    pub fn change_page(&mut self, page: u32) {
        self.current_page = page.clamp(1, self.total_pages.max(1));
    }

    pub fn query(&self) -> PagosQuery {
        let (fecha_inicio, fecha_fin) = match (self.filters.fecha_inicio, self.filters.fecha_fin) {
            (Some(start), Some(end)) => (Some(start), Some(end)),
            _ => (None, None),
        };
        PagosQuery {
            page: self.current_page.saturating_sub(1),
            size: PAGE_SIZE,
            search: non_empty(&self.filters.search),
            tipo_deuda: non_empty(&self.filters.tipo_deuda),
            fecha_inicio,
            fecha_fin,
            sort_by: self.sort.key,
            sort_dir: self.sort.direction,
        }
    }

    pub async fn sync(&mut self) -> bool {
        if self.last_query.as_ref() == Some(&self.query()) {
            return false;
        }
        self.refresh().await;
        true
    }

    pub async fn refresh(&mut self) {
        let query = self.query();
        self.last_query = Some(query.clone());
        self.loading = true;
        self.error = None;

        match self.backend.list_pagos(self.cliente_id, &query).await {
            Ok(envelope) => {
                info!(
                    cliente_id = %self.cliente_id,
                    rows = envelope.content.len(),
                    total_pages = envelope.total_pages,
                    "payments fetched"
                );
                self.payments = envelope.content;
                self.total_pages = envelope.total_pages;
                self.total_elements = envelope.total_elements;
            }
            Err(err) => {
                warn!(cliente_id = %self.cliente_id, error = %err, "failed to load payments");
                self.error = Some(LOAD_ERROR_MESSAGE.to_string());
            }
        }

        self.loading = false;
    }

    pub async fn cancel_pago(&mut self, pago_id: PagoId) -> bool {
        match self.backend.cancel_pago(pago_id).await {
            Ok(()) => {
                info!(%pago_id, "payment cancelled");
                self.refresh().await;
                true
            }
            Err(err) => {
                error!(%pago_id, error = %err, "failed to cancel payment");
                self.error = Some(CANCEL_ERROR_MESSAGE.to_string());
                false
            }
        }
    }

    /// Distinct debt types on the current page, in first-seen order.
    pub fn debt_types(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for tipo in self
            .payments
            .iter()
            .filter_map(|p| p.deuda.as_ref()?.tipo_deuda.as_deref())
            .filter(|t| !t.is_empty())
        {
            if !seen.iter().any(|s| s == tipo) {
                seen.push(tipo.to_string());
            }
        }
        seen
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Chilean peso formatting: `$` prefix, `.` thousands separator, no decimals.
pub fn format_clp(amount: f64) -> String {
    let rounded = amount.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    if negative {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

/// Renders a transaction timestamp as `DD/MM/YYYY`.
pub fn format_fecha(raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return "no date".to_string();
    };
    let parsed = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.date()))
        .or_else(|_| chrono::DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()));
    match parsed {
        Ok(date) => date.format("%d/%m/%Y").to_string(),
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
#[path = "tests/payments_tests.rs"]
mod tests;

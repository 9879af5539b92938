use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{ClienteId, PagoId, PagoSortKey, SortDirection, PAGE_SIZE};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cliente {
    pub cliente_id: ClienteId,
    #[serde(default)]
    pub nombre: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Cliente {
    pub fn new(cliente_id: ClienteId, nombre: impl Into<String>) -> Self {
        Self {
            cliente_id,
            nombre: nombre.into(),
            extra: serde_json::Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deuda {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tipo_deuda: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observaciones: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pago {
    pub pago_id: PagoId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fecha_transaccion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monto: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deuda: Option<Deuda>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metodo_pago: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observaciones: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEnvelope<T> {
    pub content: Vec<T>,
    pub total_pages: u32,
    pub total_elements: u64,
}

/// Listing endpoints answer either with an envelope or with a bare array.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PageResponse<T> {
    Paged(PageEnvelope<T>),
    Bare(Vec<T>),
}

impl<T> PageResponse<T> {
    pub fn normalize(self, page_size: u32) -> ListPage<T> {
        match self {
            Self::Paged(envelope) => envelope.into(),
            Self::Bare(records) => {
                let len = records.len();
                let per_page = page_size.max(1) as usize;
                ListPage {
                    total_pages: u32::try_from(len.div_ceil(per_page)).unwrap_or(u32::MAX),
                    total_elements: len as u64,
                    records,
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListPage<T> {
    pub records: Vec<T>,
    pub total_pages: u32,
    pub total_elements: u64,
}

impl<T> ListPage<T> {
    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
            total_pages: 0,
            total_elements: 0,
        }
    }
}

impl<T> Default for ListPage<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> From<PageEnvelope<T>> for ListPage<T> {
    fn from(value: PageEnvelope<T>) -> Self {
        Self {
            records: value.content,
            total_pages: value.total_pages,
            total_elements: value.total_elements,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientesQuery {
    pub page: u32,
    pub size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    pub sort_by: &'static str,
    pub sort_dir: SortDirection,
}

impl ClientesQuery {
    pub const SORT_FIELD: &'static str = "nombre";

    pub fn new(page: u32, search: &str, sort_dir: SortDirection) -> Self {
        Self {
            page,
            size: PAGE_SIZE,
            search: (!search.is_empty()).then(|| search.to_string()),
            sort_by: Self::SORT_FIELD,
            sort_dir,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagosQuery {
    pub page: u32,
    pub size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo_deuda: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha_inicio: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha_fin: Option<NaiveDate>,
    pub sort_by: PagoSortKey,
    pub sort_dir: SortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExcelExportQuery {
    pub mes: u32,
    pub anio: i32,
}

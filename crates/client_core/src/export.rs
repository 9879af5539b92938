use std::path::{Path, PathBuf};

use shared::protocol::ExcelExportQuery;
use tracing::{error, info};

use crate::{error::ExportError, ClientesBackend};

pub fn export_file_name(month: u32, year: i32) -> String {
    format!("clientes_saldo_pendiente_{month}_{year}.xlsx")
}

pub fn export_query(month: u32, year: i32) -> Result<ExcelExportQuery, ExportError> {
    if !(1..=12).contains(&month) {
        return Err(ExportError::InvalidMonth(month));
    }
    Ok(ExcelExportQuery {
        mes: month,
        anio: year,
    })
}

/// Downloads the spreadsheet for `month`/`year` into `dir` and returns the
/// written path.
pub async fn export_excel(
    backend: &dyn ClientesBackend,
    month: u32,
    year: i32,
    dir: &Path,
) -> Result<PathBuf, ExportError> {
    let query = export_query(month, year)?;
    info!(month, year, "starting spreadsheet export");

    let bytes = backend.export_excel(query).await.inspect_err(|err| {
        error!(error = %err, month, year, "spreadsheet download failed");
    })?;
    if bytes.is_empty() {
        return Err(ExportError::EmptyPayload);
    }

    let path = dir.join(export_file_name(month, year));
    tokio::fs::write(&path, &bytes)
        .await
        .map_err(|source| ExportError::Write {
            path: path.clone(),
            source,
        })?;

    info!(path = %path.display(), size_bytes = bytes.len(), "spreadsheet export written");
    Ok(path)
}

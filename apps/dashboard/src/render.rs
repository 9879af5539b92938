//! Plain-text tables for the terminal front-end.

use std::fmt::Write as _;

use client_core::{
    payments::{format_clp, format_fecha},
    ListSnapshot, PaymentsController,
};

pub fn client_table(snapshot: &ListSnapshot) -> String {
    let mut out = String::new();
    if snapshot.loading && snapshot.records.is_empty() {
        out.push_str("Loading clients...\n");
        return out;
    }

    if snapshot.records.is_empty() {
        if snapshot.search.is_empty() {
            out.push_str("No clients registered\n");
        } else {
            let _ = writeln!(out, "No clients match \"{}\"", snapshot.search);
        }
    } else {
        let _ = writeln!(out, "{:>8}  {}", "ID", format!("NOMBRE ({})", snapshot.sort));
        for cliente in &snapshot.records {
            let _ = writeln!(out, "{:>8}  {}", cliente.cliente_id, cliente.nombre);
        }
    }

    let pagination = snapshot.pagination;
    if pagination.total_pages > 0 {
        let _ = writeln!(
            out,
            "Page {} of {} ({} clients)",
            pagination.display_page(),
            pagination.total_pages,
            pagination.total_elements
        );
    }
    out
}

pub fn payments_table(controller: &PaymentsController) -> String {
    let mut out = String::new();
    if let Some(error) = controller.error() {
        let _ = writeln!(out, "{error}");
        return out;
    }

    if controller.payments().is_empty() {
        out.push_str("No payments found.\n");
    } else {
        let _ = writeln!(
            out,
            "{:>6}  {:<10}  {:>12}  {:<14}  {:<14}  {}",
            "ID", "FECHA", "MONTO", "TIPO DEUDA", "METODO", "OBSERVACIONES"
        );
        for pago in controller.payments() {
            let deuda = pago.deuda.as_ref();
            let _ = writeln!(
                out,
                "{:>6}  {:<10}  {:>12}  {:<14}  {:<14}  {}",
                pago.pago_id,
                format_fecha(pago.fecha_transaccion.as_deref()),
                pago.monto.map(format_clp).unwrap_or_else(|| "0".to_string()),
                deuda
                    .and_then(|d| d.tipo_deuda.as_deref())
                    .unwrap_or("N/A"),
                pago.metodo_pago.as_deref().unwrap_or("N/A"),
                pago.observaciones.as_deref().unwrap_or("-"),
            );
        }
    }

    let _ = writeln!(
        out,
        "Page {} of {} ({} records)",
        controller.current_page(),
        controller.total_pages(),
        controller.total_elements()
    );
    out
}

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use clap::{Parser, Subcommand};
use client_core::{export, HttpBackend, ListController, PagosBackend, PaymentsController};
use shared::domain::{ClienteId, PagoId, PagoSortKey, SortDirection};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod browse;
mod config;
mod render;

use config::load_settings;

#[derive(Parser, Debug)]
#[command(about = "Terminal client for the contadores dashboard backend")]
struct Args {
    /// Backend base URL; overrides dashboard.toml and the environment.
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print one page of clients.
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value = "asc")]
        sort: SortDirection,
    },
    /// Browse clients interactively.
    Browse,
    /// Download the pending-balance spreadsheet for a month.
    Export {
        #[arg(long)]
        month: Option<u32>,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List a client's payments.
    Pagos {
        cliente_id: i64,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value = "")]
        tipo_deuda: String,
        #[arg(long)]
        desde: Option<NaiveDate>,
        #[arg(long)]
        hasta: Option<NaiveDate>,
        #[arg(long, default_value = "fechaTransaccion")]
        sort_by: PagoSortKey,
        #[arg(long)]
        desc: bool,
    },
    /// Cancel a payment.
    CancelPago { pago_id: i64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut settings = load_settings();
    if let Some(api_url) = args.api_url {
        settings.api_url = api_url;
    }
    info!(api_url = %settings.api_url, "dashboard starting");

    let backend = Arc::new(
        HttpBackend::with_timeout(&settings.api_url, settings.request_timeout())
            .with_context(|| format!("invalid api url '{}'", settings.api_url))?,
    );

    match args.command {
        Command::List { page, search, sort } => {
            let mut controller =
                ListController::with_options(backend, settings.controller_options());
            controller
                .fetch_clients(page.saturating_sub(1), &search, sort)
                .await;
            print!("{}", render::client_table(&controller.snapshot()));
        }
        Command::Browse => {
            let controller = ListController::with_options(backend, settings.controller_options());
            browse::run(controller).await?;
        }
        Command::Export { month, year, out } => {
            let today = Local::now().date_naive();
            let month = month.unwrap_or_else(|| today.month());
            let year = year.unwrap_or_else(|| today.year());
            let dir = out.unwrap_or_else(|| settings.export_dir.clone());
            let path = export::export_excel(backend.as_ref(), month, year, &dir)
                .await
                .context("spreadsheet export failed")?;
            println!("Saved {}", path.display());
        }
        Command::Pagos {
            cliente_id,
            page,
            search,
            tipo_deuda,
            desde,
            hasta,
            sort_by,
            desc,
        } => {
            let mut controller = PaymentsController::new(backend, ClienteId(cliente_id));
            controller.set_search(search);
            controller.set_tipo_deuda(tipo_deuda);
            controller.set_date_range(desde, hasta);
            let direction = if desc {
                SortDirection::Desc
            } else {
                SortDirection::Asc
            };
            controller.set_sort(sort_by, direction);
            controller.sync().await;
            if page > 1 {
                controller.change_page(page);
                controller.sync().await;
            }
            print!("{}", render::payments_table(&controller));
        }
        Command::CancelPago { pago_id } => {
            backend
                .cancel_pago(PagoId(pago_id))
                .await
                .with_context(|| format!("failed to cancel payment {pago_id}"))?;
            println!("Payment {pago_id} cancelled");
        }
    }

    Ok(())
}

//! Render the room-booking sheet and keep it in sync with the shared spreadsheet.
//!
//! Usage:
//!   bookgrid rooms.json --skip-sync                 # local workbook only
//!   bookgrid rooms.json --spreadsheet-id ID         # publish to the remote sheet
//!   bookgrid rooms.json --load-remote ...           # reconcile edits first, then publish
//!   bookgrid rooms.json --reconcile-from edited.xlsx --skip-sync

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use bookgrid::config::{
    OutputConfig, SyncConfig, DEFAULT_API_BASE, DEFAULT_RECONCILED_PATH, DEFAULT_SHEET_NAME,
    DEFAULT_WORKBOOK_PATH,
};
use bookgrid::sync::{BookingSession, GoogleSheetsClient, WorkbookFileSheet};
use bookgrid::{Coloring, LayoutMode, RenderOptions, RoomCatalog};

#[derive(Parser)]
#[command(version, about = "Lay out room bookings as a spreadsheet and sync them with Google Sheets.")]
struct Args {
    /// Room dataset (JSON array of rooms).
    dataset: PathBuf,

    /// Local workbook to write.
    #[arg(long, short, default_value = DEFAULT_WORKBOOK_PATH)]
    output: PathBuf,

    /// Where the reconciled dataset is saved.
    #[arg(long, default_value = DEFAULT_RECONCILED_PATH)]
    reconciled: PathBuf,

    /// Title of the sheet.
    #[arg(long)]
    title: Option<String>,

    /// Print occupant names instead of "Taken".
    #[arg(long)]
    show_names: bool,

    /// Include lector (duplex) rooms.
    #[arg(long)]
    show_lectors: bool,

    /// Stack room blocks in a single column.
    #[arg(long)]
    single_column: bool,

    /// Color bed cells with conditional rules instead of fixed fills.
    #[arg(long)]
    conditional: bool,

    /// Reconcile against the admin spreadsheet before publishing.
    #[arg(long, conflicts_with = "reconcile_from")]
    load_remote: bool,

    /// Only write the local workbook.
    #[arg(long, conflicts_with = "load_remote")]
    skip_sync: bool,

    /// Reconcile against a locally edited workbook.
    #[arg(long, value_name = "XLSX")]
    reconcile_from: Option<PathBuf>,

    #[arg(long, env = "BOOKGRID_SPREADSHEET_ID")]
    spreadsheet_id: Option<String>,

    /// Spreadsheet the organizers edit; defaults to --spreadsheet-id.
    #[arg(long, env = "BOOKGRID_ADMIN_SPREADSHEET_ID")]
    admin_spreadsheet_id: Option<String>,

    #[arg(long, env = "BOOKGRID_SHEET_NAME", default_value = DEFAULT_SHEET_NAME)]
    sheet_name: String,

    /// OAuth bearer token for the Sheets API.
    #[arg(long, env = "BOOKGRID_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    #[arg(long, env = "BOOKGRID_API_BASE", default_value = DEFAULT_API_BASE)]
    api_base: String,
}

impl Args {
    fn render_options(&self) -> RenderOptions {
        let defaults = RenderOptions::default();
        RenderOptions {
            title: self.title.clone().unwrap_or(defaults.title),
            show_names: self.show_names,
            show_lectors: self.show_lectors,
            layout: if self.single_column {
                LayoutMode::SingleColumn
            } else {
                LayoutMode::DoubleColumn
            },
            coloring: if self.conditional {
                Coloring::Conditional
            } else {
                Coloring::Static
            },
        }
    }

    fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            spreadsheet_id: self.spreadsheet_id.clone(),
            admin_spreadsheet_id: self.admin_spreadsheet_id.clone(),
            sheet_name: self.sheet_name.clone(),
            access_token: self.access_token.clone(),
            api_base: self.api_base.clone(),
        }
    }

    fn output_config(&self) -> OutputConfig {
        OutputConfig {
            workbook: self.output.clone(),
            reconciled: self.reconciled.clone(),
        }
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let options = args.render_options();
    let sync = args.sync_config();

    let catalog = RoomCatalog::load_initial(&args.dataset)
        .with_context(|| format!("loading {}", args.dataset.display()))?;
    log::info!("Loaded {} rooms from {}", catalog.len(), args.dataset.display());

    let edited = args.reconcile_from.as_ref().map(WorkbookFileSheet::new);
    let client = if args.skip_sync {
        None
    } else {
        sync.validate()
            .context("remote sync is enabled; pass --skip-sync to write the local workbook only")?;
        Some(GoogleSheetsClient::new(&sync)?)
    };

    let mut session = BookingSession::new(options.clone(), args.output_config());
    if let Some(file) = &edited {
        session = session.reconcile_from(file, "", &sync.sheet_name, options.show_names);
    }
    if let Some(client) = &client {
        let public_id = sync.validate()?;
        if args.load_remote {
            let admin_id = sync.admin_id()?;
            session =
                session.reconcile_from(client, admin_id, &sync.sheet_name, admin_id != public_id);
        }
        session = session.publish_to(client, public_id, &sync.sheet_name);
    }

    let report = session.run(catalog)?;
    for warning in &report.warnings {
        log::warn!("{warning:?}");
    }
    log::info!(
        "Done: {} bed cells, {} updated, {} formatted{}",
        report.edits,
        report.updated_cells,
        report.formatted_cells,
        if report.reconciled { ", reconciled" } else { "" }
    );
    Ok(())
}

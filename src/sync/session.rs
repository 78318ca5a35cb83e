//! End-to-end booking run.

use crate::catalog::RoomCatalog;
use crate::cell_ref::{qualified, range_ref};
use crate::config::OutputConfig;
use crate::error::Result;
use crate::export::save_workbook;
use crate::layout::{render_catalog, RenderPass};
use crate::reconcile::{reconcile, ReconcileWarning};
use crate::tracker::{bounding_rect, build_batch};
use crate::types::{CellRange, RenderOptions};

use super::{SheetSink, SheetSource};

/// A sheet inside a spreadsheet reachable through `service`.
struct RemoteSheet<'a, S: ?Sized> {
    service: &'a S,
    spreadsheet_id: String,
    sheet_name: String,
}

/// What a run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    /// Catalog after reconciliation, or the input catalog sorted
    pub catalog: RoomCatalog,
    /// Bed cells rendered for the final layout
    pub edits: usize,
    pub updated_cells: u64,
    pub formatted_cells: u64,
    pub warnings: Vec<ReconcileWarning>,
    pub reconciled: bool,
}

/// A1 range covering everything from `A1` to the bottom-right corner of `bounds`.
///
/// Reading from `A1` keeps grid indices equal to sheet coordinates.
///
/// # Errors
/// Returns [`crate::BookgridError::ColumnOutOfRange`] past column `Z`.
pub fn read_range(sheet: &str, bounds: &CellRange) -> Result<String> {
    let from_origin = CellRange {
        first_row: 0,
        first_col: 0,
        last_row: bounds.last_row,
        last_col: bounds.last_col,
    };
    Ok(qualified(sheet, &range_ref(&from_origin)?))
}

/// Render, optionally reconcile against an edited sheet, write the local
/// workbook and optionally push the layout to a remote sheet.
pub struct BookingSession<'a> {
    options: RenderOptions,
    output: OutputConfig,
    source: Option<RemoteSheet<'a, dyn SheetSource + 'a>>,
    source_shows_names: bool,
    target: Option<RemoteSheet<'a, dyn SheetSink + 'a>>,
}

impl<'a> BookingSession<'a> {
    pub fn new(options: RenderOptions, output: OutputConfig) -> Self {
        Self {
            options,
            output,
            source: None,
            source_shows_names: true,
            target: None,
        }
    }

    /// Reconcile against `sheet_name` of `spreadsheet_id` before writing anything.
    ///
    /// `shows_names` tells whether that sheet was rendered with occupant
    /// names; the edit map is rebuilt the same way. A source that is also the
    /// publish target holds the anonymized layout and is always read as such.
    #[must_use]
    pub fn reconcile_from(
        mut self,
        service: &'a dyn SheetSource,
        spreadsheet_id: impl Into<String>,
        sheet_name: impl Into<String>,
        shows_names: bool,
    ) -> Self {
        self.source = Some(RemoteSheet {
            service,
            spreadsheet_id: spreadsheet_id.into(),
            sheet_name: sheet_name.into(),
        });
        self.source_shows_names = shows_names;
        self
    }

    /// Push the final layout to `sheet_name` of `spreadsheet_id`.
    #[must_use]
    pub fn publish_to(
        mut self,
        service: &'a dyn SheetSink,
        spreadsheet_id: impl Into<String>,
        sheet_name: impl Into<String>,
    ) -> Self {
        self.target = Some(RemoteSheet {
            service,
            spreadsheet_id: spreadsheet_id.into(),
            sheet_name: sheet_name.into(),
        });
        self
    }

    /// Run the pipeline over `catalog`.
    ///
    /// # Errors
    /// Any failed remote call, file write or malformed remote payload aborts
    /// the run. Publishing an empty layout fails with
    /// [`crate::BookgridError::EmptyEditSet`].
    pub fn run(&self, catalog: RoomCatalog) -> Result<SessionReport> {
        let mut catalog = catalog.sort();
        let mut warnings = Vec::new();
        let reconciled = self.source.is_some();

        if let Some(source) = &self.source {
            let shows_names = self.source_shows_names && !self.source_is_target();
            if shows_names != self.source_shows_names {
                log::info!(
                    "{}!{} is also the publish target, reading it without names",
                    source.spreadsheet_id,
                    source.sheet_name
                );
            }
            let source_options = if shows_names {
                self.options.with_names()
            } else {
                self.options.anonymized()
            };
            let admin = render_catalog(&catalog, &source_options);
            if admin.edits.is_empty() {
                log::info!("Nothing rendered, skipping reconciliation");
            } else {
                let range = read_range(&source.sheet_name, &bounding_rect(&admin.edits)?)?;
                let grid = source.service.get_values(&source.spreadsheet_id, &range)?;
                let result = reconcile(&grid, &admin.edits, &catalog, &source_options);
                warnings = result.warnings;
                catalog = result.catalog;
            }
            catalog.save(&self.output.reconciled)?;
        }

        let local = render_catalog(&catalog, &self.options);
        save_workbook(&local, &self.output.workbook)?;

        let mut report = SessionReport {
            edits: local.edits.len(),
            catalog,
            updated_cells: 0,
            formatted_cells: 0,
            warnings,
            reconciled,
        };

        if let Some(target) = &self.target {
            let public = if reconciled {
                render_catalog(&report.catalog, &self.options.anonymized())
            } else {
                local
            };
            let (updated, formatted) = publish(target, &public)?;
            report.edits = public.edits.len();
            report.updated_cells = updated;
            report.formatted_cells = formatted;
        }

        Ok(report)
    }

    fn source_is_target(&self) -> bool {
        match (&self.source, &self.target) {
            (Some(source), Some(target)) => {
                source.spreadsheet_id == target.spreadsheet_id
                    && source.sheet_name == target.sheet_name
            }
            _ => false,
        }
    }
}

/// Write values then formatting of `pass` to `target`.
fn publish(target: &RemoteSheet<'_, dyn SheetSink + '_>, pass: &RenderPass) -> Result<(u64, u64)> {
    let batch = build_batch(&pass.edits, &target.sheet_name)?;
    let service = target.service;
    let id = target.spreadsheet_id.as_str();

    let sheet_id = service.sheet_id(id)?;
    let updated = service.batch_update_values(id, &batch.values)?;
    let formatted = service.batch_update_formatting(id, sheet_id, &batch.formats)?;
    log::info!(
        "Published {} bed cells to {}!{}",
        batch.edits.len(),
        id,
        target.sheet_name
    );
    Ok((updated, formatted))
}

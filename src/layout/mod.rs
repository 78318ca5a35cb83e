//! Layout engine for the booking sheet.
//!
//! This module handles:
//! - Assigning room blocks to grid slots (one or two block columns)
//! - Emitting draw commands for titles, headers, room ids and bed rows
//! - Recording one [`CellEdit`] per bed row for the sync pipeline
//!
//! Drawing is decoupled from any spreadsheet library through [`SheetSurface`].

pub mod geometry;
mod renderer;

pub use renderer::{RenderPass, Renderer};

use crate::catalog::RoomCatalog;
use crate::error::Result;
use crate::types::{CellRange, RenderOptions};

/// Visual role of a written cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellStyle {
    /// Sheet title: bold, bordered, 14pt, centered
    Title,
    /// Group title: bold, bordered, centered
    RoomType,
    /// Unstyled text ("Room ID" heading)
    Plain,
    /// Room-id cell: centered
    RoomId,
    /// Name column text: left aligned
    Names,
    /// Taken bed: left aligned, red fill
    Taken,
    /// Free bed: left aligned, green fill
    Free,
}

/// One drawing operation against a sheet surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawCommand {
    /// Merge `range` and write `text` into it.
    Merge {
        range: CellRange,
        text: String,
        style: CellStyle,
    },
    /// Write `text` into a single cell.
    Write {
        row: u32,
        col: u32,
        text: String,
        style: CellStyle,
    },
    /// Fill cells of `range` green when their text contains `needle`, red otherwise.
    ConditionalFill { range: CellRange, needle: String },
}

/// Anything the renderer's output can be drawn onto.
pub trait SheetSurface {
    /// Merge `range` into one cell holding `text`.
    fn merge_range(&mut self, range: CellRange, text: &str, style: CellStyle) -> Result<()>;

    /// Write `text` into the cell at `(row, col)`.
    fn write_string(&mut self, row: u32, col: u32, text: &str, style: CellStyle) -> Result<()>;

    /// Attach a "contains `needle`" coloring rule to `range`.
    fn conditional_fill(&mut self, range: CellRange, needle: &str) -> Result<()>;

    /// Apply a single command.
    fn apply(&mut self, command: &DrawCommand) -> Result<()> {
        match command {
            DrawCommand::Merge { range, text, style } => self.merge_range(*range, text, *style),
            DrawCommand::Write {
                row,
                col,
                text,
                style,
            } => self.write_string(*row, *col, text, *style),
            DrawCommand::ConditionalFill { range, needle } => self.conditional_fill(*range, needle),
        }
    }
}

/// Filter, sort, group and render a catalog in one go.
pub fn render_catalog(catalog: &RoomCatalog, options: &RenderOptions) -> RenderPass {
    let groups = catalog
        .filter_lectors(options.show_lectors)
        .sort()
        .group_by_type();
    Renderer::new(options).render(&groups)
}

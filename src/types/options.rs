use serde::{Deserialize, Serialize};

/// How room blocks are arranged on the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LayoutMode {
    /// One 4-wide block column; rooms stack vertically.
    SingleColumn,
    /// Two 4-wide block columns separated by a gap column; rooms alternate left/right.
    #[default]
    DoubleColumn,
}

/// How bed cells get their taken/free background in the local workbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Coloring {
    /// Fill baked into each bed cell's style.
    #[default]
    Static,
    /// Conditional rules keyed on the text containing "Free".
    Conditional,
}

/// Immutable switches for one render pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOptions {
    /// Text of the sheet's title row
    pub title: String,
    /// Print occupant names instead of the "Taken" label
    pub show_names: bool,
    /// Include lector (duplex) rooms
    pub show_lectors: bool,
    pub layout: LayoutMode,
    pub coloring: Coloring,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            title: "CECC 2019 Bookings".to_string(),
            show_names: false,
            show_lectors: false,
            layout: LayoutMode::default(),
            coloring: Coloring::default(),
        }
    }
}

impl RenderOptions {
    /// Copy of these options with names hidden, used for the public sheet.
    #[must_use]
    pub fn anonymized(&self) -> Self {
        Self {
            show_names: false,
            ..self.clone()
        }
    }

    /// Copy of these options with names shown, used for the admin layout.
    #[must_use]
    pub fn with_names(&self) -> Self {
        Self {
            show_names: true,
            ..self.clone()
        }
    }
}

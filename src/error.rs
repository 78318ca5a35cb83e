//! Structured error types for bookgrid.
//!
//! Every fatal condition of a booking run maps onto one variant here. The only
//! recoverable condition (a stale cell during reconciliation) is not an error:
//! see [`crate::reconcile::ReconcileWarning`].

/// All errors that can abort a bookgrid run.
#[derive(Debug, thiserror::Error)]
pub enum BookgridError {
    /// Room-type code outside the four known categories.
    #[error("Unknown room type: {0}")]
    UnknownRoomType(String),

    /// A render pass produced no cell edits, so there is no rectangle to patch.
    #[error("Edit set is empty: nothing to render")]
    EmptyEditSet,

    /// The remote service answered with a payload of the wrong shape.
    #[error("Remote payload has unexpected format: {0}")]
    RemoteFormat(String),

    /// The remote service answered with a non-success HTTP status.
    #[error("Remote service returned {status}: {body}")]
    Remote { status: u16, body: String },

    /// Column index that single-letter A1 notation cannot express.
    #[error("Column {0} is beyond column Z")]
    ColumnOutOfRange(u32),

    /// Invalid cell reference.
    #[error("Invalid cell reference: {0}")]
    InvalidCellRef(String),

    /// Missing or inconsistent configuration.
    #[error("Configuration: {0}")]
    Config(String),

    /// HTTP transport error.
    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON (de)serialization error.
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// XML parsing error from quick-xml.
    #[error("XML parsing: {0}")]
    Xml(#[from] quick_xml::Error),

    /// ZIP archive error.
    #[error("ZIP archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, BookgridError>;

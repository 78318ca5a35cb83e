//! Run configuration for the remote sheet and local output files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{BookgridError, Result};

pub const DEFAULT_SHEET_NAME: &str = "Sheet1";
pub const DEFAULT_API_BASE: &str = "https://sheets.googleapis.com/v4";
pub const DEFAULT_WORKBOOK_PATH: &str = "bookings.xlsx";
pub const DEFAULT_RECONCILED_PATH: &str = "bookings.reconciled.json";

/// Where and how to reach the remote spreadsheets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncConfig {
    /// Public spreadsheet that receives the anonymized layout
    pub spreadsheet_id: Option<String>,
    /// Spreadsheet edited by the organizers; defaults to the public one
    pub admin_spreadsheet_id: Option<String>,
    pub sheet_name: String,
    /// OAuth bearer token, obtained out of band
    pub access_token: Option<String>,
    pub api_base: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: None,
            admin_spreadsheet_id: None,
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            access_token: None,
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

impl SyncConfig {
    /// Check that remote sync can run; returns the public spreadsheet id.
    ///
    /// # Errors
    /// Returns [`BookgridError::Config`] when the spreadsheet id or the access
    /// token is missing or blank.
    pub fn validate(&self) -> Result<&str> {
        let id = non_blank(self.spreadsheet_id.as_deref())
            .ok_or_else(|| BookgridError::Config("a spreadsheet id is required for remote sync".into()))?;
        if non_blank(self.access_token.as_deref()).is_none() {
            return Err(BookgridError::Config(
                "an access token is required for remote sync".into(),
            ));
        }
        Ok(id)
    }

    /// Spreadsheet to reconcile from.
    ///
    /// # Errors
    /// Same as [`SyncConfig::validate`].
    pub fn admin_id(&self) -> Result<&str> {
        let public = self.validate()?;
        Ok(non_blank(self.admin_spreadsheet_id.as_deref()).unwrap_or(public))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Local files written by a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputConfig {
    pub workbook: PathBuf,
    /// Reconciled dataset, written only after a reconciliation
    pub reconciled: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            workbook: PathBuf::from(DEFAULT_WORKBOOK_PATH),
            reconciled: PathBuf::from(DEFAULT_RECONCILED_PATH),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    fn configured() -> SyncConfig {
        SyncConfig {
            spreadsheet_id: Some("public".into()),
            access_token: Some("token".into()),
            ..SyncConfig::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = SyncConfig::default();
        assert_eq!(config.sheet_name, "Sheet1");
        assert_eq!(config.api_base, "https://sheets.googleapis.com/v4");
        assert_eq!(
            OutputConfig::default().workbook,
            PathBuf::from("bookings.xlsx")
        );
    }

    #[test]
    fn test_validate_requires_id_and_token() {
        assert!(matches!(
            SyncConfig::default().validate(),
            Err(BookgridError::Config(_))
        ));
        let no_token = SyncConfig {
            access_token: Some("  ".into()),
            ..configured()
        };
        assert!(matches!(no_token.validate(), Err(BookgridError::Config(_))));
        assert_eq!(configured().validate().unwrap(), "public");
    }

    #[test]
    fn test_admin_id_falls_back_to_public() {
        assert_eq!(configured().admin_id().unwrap(), "public");
        let split = SyncConfig {
            admin_spreadsheet_id: Some("admin".into()),
            ..configured()
        };
        assert_eq!(split.admin_id().unwrap(), "admin");
    }
}

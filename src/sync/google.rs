//! Google Sheets v4 REST client.
//!
//! Requests are built as plain JSON values so the wire format can be checked
//! without a network. Authentication is a bearer token supplied by the
//! operator.

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::Url;
use serde_json::{json, Value};

use super::{SheetSink, SheetSource};
use crate::config::SyncConfig;
use crate::error::{BookgridError, Result};
use crate::types::{FormatPatch, RemoteGrid, ValueWrite};

/// Body of `values:batchUpdate`: one single-cell value range per write.
pub fn values_update_body(writes: &[ValueWrite]) -> Value {
    let data: Vec<Value> = writes
        .iter()
        .map(|w| json!({ "range": w.range, "values": [[w.text]] }))
        .collect();
    json!({
        "valueInputOption": "USER_ENTERED",
        "data": data,
    })
}

/// Body of `spreadsheets:batchUpdate` carrying one `updateCells` request.
pub fn format_update_body(sheet_id: i64, patch: &FormatPatch) -> Value {
    let rows: Vec<Value> = patch
        .rows
        .iter()
        .map(|row| {
            let values: Vec<Value> = row
                .iter()
                .map(|cell| match cell {
                    Some(format) => json!({
                        "userEnteredFormat": { "backgroundColor": format.background }
                    }),
                    None => json!({}),
                })
                .collect();
            json!({ "values": values })
        })
        .collect();

    json!({
        "requests": [{
            "updateCells": {
                "start": {
                    "sheetId": sheet_id,
                    "rowIndex": patch.start_row,
                    "columnIndex": patch.start_col,
                },
                "rows": rows,
                "fields": "userEnteredFormat",
            }
        }]
    })
}

/// Extract the first sheet's id from spreadsheet metadata.
///
/// # Errors
/// Returns [`BookgridError::RemoteFormat`] when the metadata lists no sheet.
pub fn parse_sheet_id(metadata: &Value) -> Result<i64> {
    metadata
        .pointer("/sheets/0/properties/sheetId")
        .and_then(Value::as_i64)
        .ok_or_else(|| BookgridError::RemoteFormat("metadata has no sheets[0].properties.sheetId".into()))
}

/// Extract the grid from a `values.get` response; a missing `values` field is an empty grid.
///
/// # Errors
/// Returns [`BookgridError::RemoteFormat`] when `values` is not row-major.
pub fn parse_values_response(response: &Value) -> Result<RemoteGrid> {
    match response.get("values") {
        Some(values) => RemoteGrid::from_json_values(values),
        None => Ok(RemoteGrid::default()),
    }
}

/// Blocking client for the Sheets REST API.
pub struct GoogleSheetsClient {
    client: Client,
    api_base: Url,
    access_token: String,
}

impl GoogleSheetsClient {
    /// Create a client from sync configuration.
    ///
    /// # Errors
    /// Returns [`BookgridError::Config`] for a missing token or a malformed API base URL.
    pub fn new(config: &SyncConfig) -> Result<Self> {
        let access_token = config
            .access_token
            .clone()
            .ok_or_else(|| BookgridError::Config("an access token is required for remote sync".into()))?;
        let api_base = Url::parse(&config.api_base)
            .map_err(|e| BookgridError::Config(format!("invalid API base {}: {e}", config.api_base)))?;
        Ok(Self {
            client: Client::new(),
            api_base,
            access_token,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|()| BookgridError::Config(format!("API base {} cannot hold a path", self.api_base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn send(&self, request: RequestBuilder) -> Result<Value> {
        let response = request.bearer_auth(&self.access_token).send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(BookgridError::Remote {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<Value>()?)
    }
}

impl SheetSource for GoogleSheetsClient {
    fn get_values(&self, spreadsheet_id: &str, range: &str) -> Result<RemoteGrid> {
        let url = self.endpoint(&["spreadsheets", spreadsheet_id, "values", range])?;
        let response = self.send(self.client.get(url))?;
        let grid = parse_values_response(&response)?;
        log::info!("Read {} rows from {}", grid.row_count(), range);
        Ok(grid)
    }
}

impl SheetSink for GoogleSheetsClient {
    fn sheet_id(&self, spreadsheet_id: &str) -> Result<i64> {
        let mut url = self.endpoint(&["spreadsheets", spreadsheet_id])?;
        url.query_pairs_mut()
            .append_pair("fields", "sheets.properties");
        let metadata = self.send(self.client.get(url))?;
        parse_sheet_id(&metadata)
    }

    fn batch_update_values(&self, spreadsheet_id: &str, writes: &[ValueWrite]) -> Result<u64> {
        let url = self.endpoint(&["spreadsheets", spreadsheet_id, "values:batchUpdate"])?;
        let response = self.send(self.client.post(url).json(&values_update_body(writes)))?;
        let updated = response
            .get("totalUpdatedCells")
            .and_then(Value::as_u64)
            .unwrap_or(0);
        log::info!("{updated} cells updated");
        Ok(updated)
    }

    fn batch_update_formatting(
        &self,
        spreadsheet_id: &str,
        sheet_id: i64,
        patch: &FormatPatch,
    ) -> Result<u64> {
        let url = self.endpoint(&["spreadsheets", &format!("{spreadsheet_id}:batchUpdate")])?;
        self.send(self.client.post(url).json(&format_update_body(sheet_id, patch)))?;
        let cells = u64::try_from(patch.cell_count()).unwrap_or(u64::MAX);
        log::info!("{cells} cells formatted");
        Ok(cells)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::types::{CellFormat, COLOR_FREE, COLOR_TAKEN};

    #[test]
    fn test_values_body() {
        let body = values_update_body(&[ValueWrite {
            range: "Sheet1!B5".into(),
            text: "1. Free".into(),
        }]);
        assert_eq!(
            body,
            json!({
                "valueInputOption": "USER_ENTERED",
                "data": [{"range": "Sheet1!B5", "values": [["1. Free"]]}]
            })
        );
    }

    #[test]
    fn test_format_body_keeps_rows_rectangular() {
        let patch = FormatPatch {
            start_row: 4,
            start_col: 1,
            rows: vec![
                vec![Some(CellFormat { background: COLOR_TAKEN }), None],
                vec![None, Some(CellFormat { background: COLOR_FREE })],
            ],
        };
        let body = format_update_body(7, &patch);
        let update = &body["requests"][0]["updateCells"];
        assert_eq!(update["start"], json!({"sheetId": 7, "rowIndex": 4, "columnIndex": 1}));
        assert_eq!(update["fields"], "userEnteredFormat");
        assert_eq!(update["rows"][0]["values"].as_array().unwrap().len(), 2);
        assert_eq!(update["rows"][0]["values"][1], json!({}));
        assert_eq!(
            update["rows"][0]["values"][0]["userEnteredFormat"]["backgroundColor"],
            json!({"red": 1.0, "green": 0.0, "blue": 0.0, "alpha": 1.0})
        );
    }

    #[test]
    fn test_parse_sheet_id() {
        let meta = json!({"sheets": [{"properties": {"sheetId": 0, "title": "Sheet1"}}]});
        assert_eq!(parse_sheet_id(&meta).unwrap(), 0);
        assert!(matches!(
            parse_sheet_id(&json!({"sheets": []})),
            Err(BookgridError::RemoteFormat(_))
        ));
    }

    #[test]
    fn test_values_response() {
        let grid = parse_values_response(&json!({"range": "Sheet1!A1:I9", "values": [["x"]]})).unwrap();
        assert_eq!(grid.cell(0, 0), Some("x"));
        assert_eq!(
            parse_values_response(&json!({"range": "Sheet1!A1:I9"})).unwrap(),
            RemoteGrid::default()
        );
        assert!(parse_values_response(&json!({"values": "nope"})).is_err());
    }

    #[test]
    fn test_client_requires_token() {
        let config = SyncConfig::default();
        assert!(matches!(
            GoogleSheetsClient::new(&config),
            Err(BookgridError::Config(_))
        ));
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let config = SyncConfig {
            access_token: Some("t".into()),
            ..SyncConfig::default()
        };
        let client = GoogleSheetsClient::new(&config).unwrap();
        let url = client
            .endpoint(&["spreadsheets", "abc", "values", "Sheet1!A1:I9"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/abc/values/Sheet1!A1:I9"
        );
    }
}

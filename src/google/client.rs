//! Drive and Sheets REST endpoints over blocking HTTP.
use crate::google::auth::Credentials;
use crate::google::auth::OAuth2Client;
use crate::google::remote::SheetService;
use crate::google::remote::SpreadsheetInfo;
use crate::google::remote::WorksheetInfo;
use crate::google::RemoteError;
use crate::spreadsheet::cell::CellValue;
use crate::ParserError;
use reqwest::blocking::Client;
use reqwest::blocking::RequestBuilder;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

pub const DRIVE_API_URL: &str = "https://www.googleapis.com/drive/v3/";
pub const SHEETS_API_URL: &str = "https://sheets.googleapis.com/v4/";

const SPREADSHEET_MIME_TYPE: &str = "application/vnd.google-apps.spreadsheet";

#[derive(Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Deserialize)]
struct DriveFile {
    id: String,
    name: String,
}

#[derive(Deserialize)]
struct SpreadsheetMetadata {
    #[serde(default)]
    sheets: Vec<SheetMetadata>,
}

#[derive(Deserialize)]
struct SheetMetadata {
    properties: SheetProperties,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    #[serde(default)]
    title: String,
    #[serde(default)]
    index: usize,
    #[serde(default)]
    grid_properties: GridProperties,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GridProperties {
    #[serde(default)]
    row_count: usize,
}

/// Grid data of a `spreadsheets.get` call restricted to one range.
#[derive(Deserialize)]
struct GridResponse {
    #[serde(default)]
    sheets: Vec<GridSheet>,
}

#[derive(Deserialize)]
struct GridSheet {
    #[serde(default)]
    data: Vec<GridData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GridData {
    #[serde(default)]
    row_data: Vec<RowData>,
}

#[derive(Deserialize)]
struct RowData {
    #[serde(default)]
    values: Vec<CellData>,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CellData {
    #[serde(default)]
    formatted_value: Option<String>,
    #[serde(default)]
    effective_value: Option<ExtendedValue>,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExtendedValue {
    number_value: Option<f64>,
    string_value: Option<String>,
    bool_value: Option<bool>,
    error_value: Option<ErrorValue>,
}

#[derive(Deserialize)]
struct ErrorValue {
    #[serde(rename = "type", default)]
    kind: String,
}

const GRID_FIELDS: &str = "sheets.data.rowData.values(formattedValue,effectiveValue)";

/// Authenticated client for the Google Drive and Sheets APIs.
pub struct GoogleSheetsClient {
    http: Client,
    access_token: String,
    drive_url: String,
    sheets_url: String,
}

impl GoogleSheetsClient {
    pub fn new(access_token: &str) -> Self {
        Self::with_urls(access_token, DRIVE_API_URL, SHEETS_API_URL)
    }

    /// Client talking to other API roots, such as a local emulator.
    pub fn with_urls(access_token: &str, drive_url: &str, sheets_url: &str) -> Self {
        Self {
            http: Client::new(),
            access_token: access_token.to_owned(),
            drive_url: drive_url.to_owned(),
            sheets_url: sheets_url.to_owned(),
        }
    }

    /// Sends requests through `http` instead of a default client.
    pub fn with_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    /// Refreshes `credentials`, then authenticates with the new access token.
    ///
    /// The caller keeps the returned credentials; they replace the ones passed in.
    pub fn connect(oauth: &OAuth2Client, credentials: &Credentials) -> Result<(Self, Credentials), ParserError> {
        let credentials = oauth.refresh(credentials)?;
        Ok((Self::new(&credentials.access_token), credentials))
    }

    fn get<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, RemoteError> {
        let response = request.bearer_auth(&self.access_token).send()?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().unwrap_or_else(|_| "Unknown error".to_owned());
            return Err(RemoteError::Status {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json()?)
    }
}

impl SheetService for GoogleSheetsClient {
    fn find_spreadsheet(&self, name: &str) -> Result<SpreadsheetInfo, RemoteError> {
        let request = self
            .http
            .get(endpoint(&self.drive_url, &["files"])?)
            .query(&[("q", files_query(name).as_str()), ("fields", "files(id,name)")]);
        let file_list: FileList = self.get(request)?;
        let file = file_list
            .files
            .into_iter()
            .next()
            .ok_or_else(|| RemoteError::SpreadsheetNotFound(name.to_owned()))?;

        let request = self
            .http
            .get(endpoint(&self.sheets_url, &["spreadsheets", &file.id])?)
            .query(&[("fields", "sheets.properties(title,index,gridProperties(rowCount))")]);
        let metadata: SpreadsheetMetadata = self.get(request)?;
        let mut worksheets: Vec<WorksheetInfo> = metadata
            .sheets
            .into_iter()
            .map(|sheet| WorksheetInfo {
                title: sheet.properties.title,
                index: sheet.properties.index,
                row_count: sheet.properties.grid_properties.row_count,
            })
            .collect();
        worksheets.sort_by_key(|worksheet| worksheet.index);
        log::debug!("Found spreadsheet '{}' ({}) on Drive", file.name, file.id);

        Ok(SpreadsheetInfo {
            id: file.id,
            name: file.name,
            worksheets,
        })
    }

    fn query_rows(
        &self,
        spreadsheet_id: &str,
        worksheet: &WorksheetInfo,
        first_row: usize,
        last_row: usize,
    ) -> Result<Vec<Vec<CellValue>>, RemoteError> {
        let range = a1_range(&worksheet.title, first_row, last_row);
        let request = self
            .http
            .get(endpoint(&self.sheets_url, &["spreadsheets", spreadsheet_id])?)
            .query(&[("ranges", range.as_str()), ("fields", GRID_FIELDS)]);
        let grid: GridResponse = self.get(request)?;
        Ok(grid
            .sheets
            .into_iter()
            .flat_map(|sheet| sheet.data)
            .flat_map(|data| data.row_data)
            .map(|row| row.values.into_iter().map(to_cell_value).collect())
            .collect())
    }
}

/// Appends path segments to an API root, percent-encoding each one.
fn endpoint(base: &str, segments: &[&str]) -> Result<Url, RemoteError> {
    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| RemoteError::InvalidEndpoint(base.to_owned()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Drive search for non-trashed spreadsheets named exactly `name`.
fn files_query(name: &str) -> String {
    let name = name.replace('\\', "\\\\").replace('\'', "\\'");
    format!("name = '{}' and mimeType = '{}' and trashed = false", name, SPREADSHEET_MIME_TYPE)
}

/// Whole-row range such as `'Sheet 1'!2:40`.
fn a1_range(title: &str, first_row: usize, last_row: usize) -> String {
    format!("'{}'!{}:{}", title.replace('\'', "''"), first_row, last_row)
}

/// Pairs a cell's effective value with the text the sheet displays for it.
/// The displayed text is kept only where it differs from the value's own text.
fn to_cell_value(cell: CellData) -> CellValue {
    let effective = cell.effective_value.unwrap_or_default();
    let value = if let Some(number) = effective.number_value {
        CellValue::Number(number)
    } else if let Some(text) = effective.string_value {
        CellValue::Text(text)
    } else if let Some(value) = effective.bool_value {
        CellValue::Bool(value)
    } else if let Some(error) = effective.error_value {
        CellValue::Error(cell.formatted_value.clone().unwrap_or(error.kind))
    } else {
        CellValue::Blank
    };
    match cell.formatted_value {
        Some(text) if !matches!(value, CellValue::Error(_)) && value.text().as_deref() != Some(text.as_str()) => {
            CellValue::formatted(text, value)
        }
        _ => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::google::tests::serve_once;
    use serde_json::json;

    fn cell(json: serde_json::Value) -> CellValue {
        to_cell_value(serde_json::from_value(json).unwrap())
    }

    fn local_client(url: &str) -> anyhow::Result<GoogleSheetsClient> {
        let http = Client::builder().no_proxy().build()?;
        Ok(GoogleSheetsClient::with_urls("token", url, url).with_client(http))
    }

    fn worksheet() -> WorksheetInfo {
        WorksheetInfo {
            title: "Items".to_owned(),
            index: 0,
            row_count: 100,
        }
    }

    #[test]
    fn endpoint_encodes_range_segment() -> anyhow::Result<()> {
        let url = endpoint(SHEETS_API_URL, &["spreadsheets", "abc", "values", "'My Sheet'!1:1"])?;
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/abc/values/'My%20Sheet'!1:1"
        );
        Ok(())
    }

    #[test]
    fn a1_range_quotes_title() {
        assert_eq!(a1_range("Items", 2, 40), "'Items'!2:40");
        assert_eq!(a1_range("Bob's", 1, 1), "'Bob''s'!1:1");
    }

    #[test]
    fn files_query_escapes_name() {
        assert_eq!(
            files_query("It's"),
            "name = 'It\\'s' and mimeType = 'application/vnd.google-apps.spreadsheet' and trashed = false"
        );
    }

    #[test]
    fn plain_values_become_cells() {
        assert_eq!(
            cell(json!({"formattedValue": "12", "effectiveValue": {"numberValue": 12}})),
            CellValue::Number(12.0)
        );
        assert_eq!(
            cell(json!({"formattedValue": "Sword", "effectiveValue": {"stringValue": "Sword"}})),
            CellValue::Text("Sword".to_owned())
        );
        assert_eq!(cell(json!({})), CellValue::Blank);
    }

    #[test]
    fn formatted_text_kept_beside_value() {
        let percent = cell(json!({"formattedValue": "50%", "effectiveValue": {"numberValue": 0.5}}));
        assert_eq!(percent, CellValue::formatted("50%", CellValue::Number(0.5)));
        assert_eq!(percent.text().as_deref(), Some("50%"));
        assert_eq!(percent.resolved(), &CellValue::Number(0.5));

        let date = cell(json!({"formattedValue": "2024-05-01", "effectiveValue": {"numberValue": 45413}}));
        assert_eq!(date.text().as_deref(), Some("2024-05-01"));
        assert_eq!(date.resolved(), &CellValue::Number(45413.0));

        let flag = cell(json!({"formattedValue": "TRUE", "effectiveValue": {"boolValue": true}}));
        assert_eq!(flag.resolved(), &CellValue::Bool(true));
    }

    #[test]
    fn error_cells_show_their_code() {
        let error = cell(json!({
            "formattedValue": "#DIV/0!",
            "effectiveValue": {"errorValue": {"type": "DIVIDE_BY_ZERO", "message": "Division by zero"}}
        }));
        assert_eq!(error, CellValue::Error("#DIV/0!".to_owned()));
    }

    #[test]
    fn query_rows_reads_grid_data() -> anyhow::Result<()> {
        let (url, server) = serve_once(
            "200 OK",
            r#"{"sheets": [{"data": [{"rowData": [
                {"values": [{"formattedValue": "Sword", "effectiveValue": {"stringValue": "Sword"}},
                            {"formattedValue": "50%", "effectiveValue": {"numberValue": 0.5}}]},
                {},
                {"values": [{}, {"formattedValue": "3", "effectiveValue": {"numberValue": 3}}]}
            ]}]}]}"#,
        )?;

        let rows = local_client(&url)?.query_rows("sheet-id", &worksheet(), 2, 100)?;
        assert_eq!(rows, vec![
            vec![
                CellValue::Text("Sword".to_owned()),
                CellValue::formatted("50%", CellValue::Number(0.5))
            ],
            vec![],
            vec![CellValue::Blank, CellValue::Number(3.0)],
        ]);

        let request = server.join().unwrap();
        assert!(request.starts_with("GET /spreadsheets/sheet-id?"), "{request}");
        assert!(request.contains("fields=sheets.data.rowData.values"), "{request}");
        assert!(request.to_ascii_lowercase().contains("authorization: bearer token"), "{request}");
        Ok(())
    }

    #[test]
    fn error_status_is_reported() -> anyhow::Result<()> {
        let (url, server) = serve_once("403 Forbidden", r#"{"error": {"message": "The caller does not have permission"}}"#)?;

        let error = local_client(&url)?.find_spreadsheet("Game Data").err().unwrap();
        assert!(
            matches!(error, RemoteError::Status { status: 403, ref message } if message.contains("permission")),
            "{error}"
        );

        let request = server.join().unwrap();
        assert!(request.starts_with("GET /files?"), "{request}");
        Ok(())
    }

    #[test]
    fn metadata_response_shape() -> anyhow::Result<()> {
        let metadata: SpreadsheetMetadata = serde_json::from_value(json!({
            "sheets": [
                {"properties": {"title": "Items", "index": 0, "gridProperties": {"rowCount": 1000}}},
                {"properties": {"title": "Empty", "index": 1}}
            ]
        }))?;

        assert_eq!(metadata.sheets.len(), 2);
        assert_eq!(metadata.sheets[0].properties.grid_properties.row_count, 1000);
        assert_eq!(metadata.sheets[1].properties.grid_properties.row_count, 0);

        let grid: GridResponse = serde_json::from_value(json!({"sheets": [{"data": [{}]}]}))?;
        assert!(grid.sheets[0].data[0].row_data.is_empty());
        Ok(())
    }
}

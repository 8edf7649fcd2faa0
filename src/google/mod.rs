//! # Google Sheets
//!
//! Spreadsheets stored on Google Drive, read through the Sheets API. A
//! worksheet's header row and its contents are fetched with one query each.
pub mod auth;
pub mod client;
pub mod remote;
pub mod settings;

use crate::google::auth::AuthError;
use crate::google::auth::Credentials;
use crate::google::auth::OAuth2Client;
use crate::google::client::GoogleSheetsClient;
use crate::google::remote::RemoteSpreadsheet;
use crate::google::settings::GoogleSettings;
use crate::ParserError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("Request to Google failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Google responded with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid API endpoint: {0}")]
    Url(#[from] url::ParseError),

    #[error("API root '{0}' cannot take path segments")]
    InvalidEndpoint(String),

    #[error("Spreadsheet '{0}' not found")]
    SpreadsheetNotFound(String),

    #[error("Spreadsheet '{0}' has no worksheets")]
    NoWorksheets(String),
}

/// Opens the spreadsheet named in `settings` with its stored credentials.
///
/// Returns the refreshed credentials alongside the spreadsheet; persist them
/// with [`GoogleSettings::with_credentials`].
pub fn open_spreadsheet(settings: &GoogleSettings) -> Result<(RemoteSpreadsheet<GoogleSheetsClient>, Credentials), ParserError> {
    let credentials = settings
        .credentials
        .as_ref()
        .ok_or(AuthError::MissingCredentials("stored credentials"))?;
    let oauth = OAuth2Client::new(settings.oauth.clone());
    let (client, credentials) = GoogleSheetsClient::connect(&oauth, credentials)?;
    let spreadsheet = RemoteSpreadsheet::open(client, &settings.spreadsheet)?;
    Ok((spreadsheet, credentials))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::BufRead;
    use std::io::BufReader;
    use std::io::Read;
    use std::io::Write;
    use std::net::TcpListener;
    use std::thread;
    use std::thread::JoinHandle;

    /// Answers one HTTP request on a local port with `status_line` and the JSON `body`.
    /// Returns the server root URL and a handle that yields the raw request received.
    pub(crate) fn serve_once(status_line: &'static str, body: &'static str) -> anyhow::Result<(String, JoinHandle<String>)> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let url = format!("http://{}/", listener.local_addr()?);
        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let mut request = String::new();
            let mut content_length = 0;
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                    break;
                }
                if let Some(value) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                    content_length = value.trim().parse().unwrap();
                }
                request.push_str(&line);
            }
            let mut payload = vec![0; content_length];
            reader.read_exact(&mut payload).unwrap();
            request.push_str(&String::from_utf8_lossy(&payload));

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            reader.get_mut().write_all(response.as_bytes()).unwrap();
            request
        });
        Ok((url, server))
    }

    #[test]
    fn open_without_credentials_fails_before_any_request() {
        let settings = GoogleSettings {
            spreadsheet: "Game Data".to_owned(),
            ..GoogleSettings::default()
        };

        let error = open_spreadsheet(&settings).err().unwrap();
        assert!(matches!(
            error,
            ParserError::AuthError(AuthError::MissingCredentials("stored credentials"))
        ));
    }

    #[test]
    fn open_without_refresh_token_fails_before_any_request() {
        let settings = GoogleSettings::from_client_secret_json(r#"{"installed": {"client_id": "id"}}"#)
            .unwrap()
            .with_credentials(Credentials::default());

        let error = open_spreadsheet(&settings).err().unwrap();
        assert!(matches!(
            error,
            ParserError::AuthError(AuthError::MissingCredentials("refresh token"))
        ));
    }
}

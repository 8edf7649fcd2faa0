use thiserror::Error;

/// Main error type for the sheet parser.
/// Aggregates the errors of the spreadsheet, record and Google modules.
#[derive(Error, Debug)]
pub enum ParserError {
    #[error("{0}")]
    WithContextError(String),

    // Spreadsheet module errors
    #[error("{0}")]
    SpreadsheetError(#[from] crate::spreadsheet::SpreadsheetError),

    // Record module errors
    #[error("{0}")]
    SchemaError(#[from] crate::records::SchemaError),

    #[error("{0}")]
    ConversionError(#[from] crate::records::ConversionError),

    // Google module errors
    #[error("{0}")]
    RemoteError(#[from] crate::google::RemoteError),

    #[error("{0}")]
    AuthError(#[from] crate::google::auth::AuthError),

    #[error("{0}")]
    SettingsError(#[from] crate::google::settings::SettingsError),
}

pub(crate) trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, ParserError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| ParserError::WithContextError(format!("{}: {}", message, e)))
    }
}

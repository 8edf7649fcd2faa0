use crate::google::auth::AuthError;
use crate::google::auth::Credentials;
use crate::google::auth::OAuth2Info;
use serde::Deserialize;
use serde::Serialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Cannot access settings file '{0}': {1}")]
    Io(String, #[source] std::io::Error),

    #[error("Invalid settings file '{0}': {1}")]
    Json(String, #[source] serde_json::Error),

    #[error("{0}")]
    ClientSecret(#[from] AuthError),
}

/// Persisted Google connection settings.
///
/// Credentials are replaced, never edited: store the value returned by a
/// refresh with [`GoogleSettings::with_credentials`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoogleSettings {
    pub oauth: OAuth2Info,
    #[serde(default)]
    pub credentials: Option<Credentials>,
    /// Name of the spreadsheet to open
    #[serde(default)]
    pub spreadsheet: String,
}

impl GoogleSettings {
    /// Settings for a freshly downloaded client secret, without credentials.
    pub fn from_client_secret_json(json: &str) -> Result<Self, SettingsError> {
        Ok(Self {
            oauth: OAuth2Info::from_client_secret_json(json)?,
            ..Self::default()
        })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let name = path.to_string_lossy().to_string();
        let json = fs::read_to_string(path).map_err(|error| SettingsError::Io(name.to_owned(), error))?;
        serde_json::from_str(&json).map_err(|error| SettingsError::Json(name, error))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SettingsError> {
        let path = path.as_ref();
        let name = path.to_string_lossy().to_string();
        let json = serde_json::to_string_pretty(self).map_err(|error| SettingsError::Json(name.to_owned(), error))?;
        fs::write(path, json).map_err(|error| SettingsError::Io(name, error))?;
        log::debug!("Saved Google settings to '{}'", path.display());
        Ok(())
    }

    pub fn with_credentials(self, credentials: Credentials) -> Self {
        Self {
            credentials: Some(credentials),
            ..self
        }
    }
}

//! OAuth 2.0 for installed applications against Google's token endpoint.
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use url::Url;

/// Redirect for copy-paste authorization codes when the client secret lists none
pub const DEFAULT_REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";

/// Scopes needed to list spreadsheets on Drive and read their values
pub const SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/drive",
    "https://www.googleapis.com/auth/spreadsheets",
];

const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Missing {0} for Google authorization")]
    MissingCredentials(&'static str),

    #[error("Invalid client secret JSON: {0}")]
    InvalidClientSecret(#[source] serde_json::Error),

    #[error("Invalid authorization endpoint: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Token request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Token request rejected with status {status}: {message}")]
    TokenRejected { status: u16, message: String },
}

/// Client registration as downloaded from the Google developer console.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuth2Info {
    pub client_id: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub auth_uri: String,
    #[serde(default)]
    pub token_uri: String,
    #[serde(default)]
    pub auth_provider_x509_cert_url: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

#[derive(Deserialize)]
struct ClientSecretFile {
    installed: OAuth2Info,
}

impl OAuth2Info {
    /// Parses a client secret file of the form `{"installed": {...}}`.
    pub fn from_client_secret_json(json: &str) -> Result<Self, AuthError> {
        let file: ClientSecretFile = serde_json::from_str(json).map_err(AuthError::InvalidClientSecret)?;
        Ok(file.installed)
    }

    /// First registered redirect, or [`DEFAULT_REDIRECT_URI`].
    pub fn redirect_uri(&self) -> &str {
        self.redirect_uris
            .first()
            .map(String::as_str)
            .unwrap_or(DEFAULT_REDIRECT_URI)
    }

    fn auth_uri(&self) -> &str {
        non_empty(&self.auth_uri).unwrap_or(DEFAULT_AUTH_URI)
    }

    fn token_uri(&self) -> &str {
        non_empty(&self.token_uri).unwrap_or(DEFAULT_TOKEN_URI)
    }
}

/// Tokens granted to the application. Refreshing yields a new value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credentials {
    /// Returns true if the access token has a known expiry at or before `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|expires_at| expires_at <= now).unwrap_or(false)
    }
}

/// Successful body of a token endpoint call.
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

impl TokenResponse {
    /// Credentials for this response; the previous refresh token is kept when none was issued.
    fn into_credentials(self, previous_refresh_token: Option<&str>, now: DateTime<Utc>) -> Credentials {
        Credentials {
            access_token: self.access_token,
            refresh_token: self
                .refresh_token
                .or_else(|| previous_refresh_token.map(str::to_owned)),
            expires_at: self.expires_in.map(|seconds| now + Duration::seconds(seconds)),
        }
    }
}

pub struct OAuth2Client {
    info: OAuth2Info,
    http: Client,
}

impl OAuth2Client {
    pub fn new(info: OAuth2Info) -> Self {
        Self {
            info,
            http: Client::new(),
        }
    }

    /// Sends token requests through `http` instead of a default client.
    pub fn with_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    pub fn info(&self) -> &OAuth2Info {
        &self.info
    }

    /// Consent page the user visits to obtain an authorization code.
    pub fn authorization_url(&self) -> Result<Url, AuthError> {
        self.require_client_id()?;
        let url = Url::parse_with_params(self.info.auth_uri(), &[
            ("client_id", self.info.client_id.as_str()),
            ("redirect_uri", self.info.redirect_uri()),
            ("response_type", "code"),
            ("scope", SCOPES.join(" ").as_str()),
            ("access_type", "offline"),
        ])?;
        Ok(url)
    }

    /// Trades the code shown after consent for credentials.
    pub fn exchange_code(&self, code: &str) -> Result<Credentials, AuthError> {
        self.require_client_id()?;
        if code.is_empty() {
            Err(AuthError::MissingCredentials("authorization code"))?;
        }
        let response = self.request_token(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", self.info.client_id.as_str()),
            ("client_secret", self.info.client_secret.as_str()),
            ("redirect_uri", self.info.redirect_uri()),
        ])?;
        log::debug!("Exchanged authorization code for client '{}'", self.info.client_id);
        Ok(response.into_credentials(None, Utc::now()))
    }

    /// Obtains a fresh access token for `credentials`.
    pub fn refresh(&self, credentials: &Credentials) -> Result<Credentials, AuthError> {
        self.require_client_id()?;
        let refresh_token = credentials
            .refresh_token
            .as_deref()
            .and_then(non_empty)
            .ok_or(AuthError::MissingCredentials("refresh token"))?;
        let response = self.request_token(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.info.client_id.as_str()),
            ("client_secret", self.info.client_secret.as_str()),
        ])?;
        log::debug!("Refreshed access token for client '{}'", self.info.client_id);
        Ok(response.into_credentials(Some(refresh_token), Utc::now()))
    }

    fn request_token(&self, form: &[(&str, &str)]) -> Result<TokenResponse, AuthError> {
        let response = self.http.post(self.info.token_uri()).form(form).send()?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().unwrap_or_else(|_| "Unknown error".to_owned());
            return Err(AuthError::TokenRejected {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json()?)
    }

    fn require_client_id(&self) -> Result<(), AuthError> {
        match non_empty(&self.info.client_id) {
            Some(_) => Ok(()),
            None => Err(AuthError::MissingCredentials("client id")),
        }
    }
}

fn non_empty(value: &str) -> Option<&str> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

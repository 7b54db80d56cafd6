//! Client for the mail backend's REST API.

mod mock;

use std::time::Duration;

use anyhow::{Result, anyhow};
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use mythmail_core::{CredentialStore, Email};

pub use mock::mock_emails;

pub const DEFAULT_API_URL: &str = "http://localhost:8080";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub mock_fallback: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout_secs: 10,
            mock_fallback: true,
        }
    }
}

impl ApiConfig {
    pub fn build_client(&self) -> Result<reqwest::Client> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs.max(1)))
            .build()?;
        Ok(client)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{operation} failed: HTTP {status} {body}")]
    Status {
        operation: &'static str,
        status: u16,
        body: String,
    },
    #[error("{operation} rejected by server: {message}")]
    Rejected {
        operation: &'static str,
        message: String,
    },
    #[error("login response did not include a token")]
    MissingToken,
    #[error("invalid path segment: {0:?}")]
    InvalidSegment(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct SendEmailRequest {
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cc: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bcc: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    data: Option<T>,
    error: Option<String>,
}

// The backend wraps login in an envelope; older builds answered bare.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LoginReply {
    Bare(LoginResponse),
    Wrapped(Envelope<LoginResponse>),
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    config: ApiConfig,
    credentials: CredentialStore,
}

impl ApiClient {
    pub fn new(config: ApiConfig, credentials: CredentialStore) -> Result<Self> {
        let client = config.build_client()?;
        Ok(Self::with_client(client, config, credentials))
    }

    pub fn with_client(client: reqwest::Client, mut config: ApiConfig, credentials: CredentialStore) -> Self {
        config.base_url = config.base_url.trim().trim_end_matches('/').to_string();
        Self {
            client,
            config,
            credentials,
        }
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.client
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Appends each segment percent-encoded, so ids cannot leave their route.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        if let Some(bad) = segments
            .iter()
            .find(|s| s.is_empty() || matches!(**s, "." | ".."))
        {
            return Err(ApiError::InvalidSegment(bad.to_string()).into());
        }
        let mut url = Url::parse(&self.config.base_url)?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("API base URL cannot have a path: {}", self.config.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let builder = self.client.request(method, self.endpoint(segments)?);
        Ok(match self.credentials.get() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    /// Lists a folder. With mock fallback enabled a failed request yields
    /// the built-in sample messages instead of an error.
    pub async fn fetch_emails(&self, folder: &str) -> Result<Vec<Email>> {
        match self.fetch_emails_remote(folder).await {
            Ok(emails) => Ok(emails),
            Err(err) if self.config.mock_fallback => {
                warn!(folder, "email listing failed, using mock data: {err:#}");
                Ok(mock_emails(folder))
            }
            Err(err) => Err(err),
        }
    }

    async fn fetch_emails_remote(&self, folder: &str) -> Result<Vec<Email>> {
        let response = self
            .request(Method::GET, &["api", "emails", folder.trim()])?
            .send()
            .await?;
        let response = check_status("list emails", response).await?;
        Ok(response.json::<Vec<Email>>().await?)
    }

    /// There is no single-message endpoint; the folder listing is searched.
    pub async fn fetch_email(&self, folder: &str, id: &str) -> Result<Option<Email>> {
        let emails = self.fetch_emails(folder).await?;
        Ok(emails.into_iter().find(|e| e.id == id))
    }

    pub async fn send_email(&self, request: &SendEmailRequest) -> Result<Option<String>> {
        info!(to = ?request.to, "sending email");
        let response = self
            .request(Method::POST, &["api", "emails", "send"])?
            .json(request)
            .send()
            .await?;
        read_envelope("send email", response).await
    }

    pub async fn delete_email(&self, id: &str) -> Result<()> {
        info!(id, "deleting email");
        let response = self
            .request(Method::DELETE, &["api", "emails", id])?
            .send()
            .await?;
        read_envelope("delete email", response).await?;
        Ok(())
    }

    pub async fn mark_as_read(&self, id: &str, read: bool) -> Result<()> {
        info!(id, read, "marking email");
        let response = self
            .request(Method::PATCH, &["api", "emails", id, "read"])?
            .json(&serde_json::json!({ "read": read }))
            .send()
            .await?;
        read_envelope("mark read", response).await?;
        Ok(())
    }

    pub async fn star_email(&self, id: &str, starred: bool) -> Result<()> {
        info!(id, starred, "starring email");
        let response = self
            .request(Method::PATCH, &["api", "emails", id, "star"])?
            .json(&serde_json::json!({ "starred": starred }))
            .send()
            .await?;
        read_envelope("star email", response).await?;
        Ok(())
    }

    /// Authenticates and stores the returned token for later requests.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let response = self
            .request(Method::POST, &["api", "auth", "login"])?
            .json(&LoginRequest { email, password })
            .send()
            .await?;
        let response = check_status("login", response).await?;
        let login = match response.json::<LoginReply>().await? {
            LoginReply::Bare(login) => login,
            LoginReply::Wrapped(envelope) => {
                if !envelope.success {
                    return Err(ApiError::Rejected {
                        operation: "login",
                        message: envelope.error.unwrap_or_else(|| "no reason given".to_string()),
                    }
                    .into());
                }
                envelope.data.ok_or(ApiError::MissingToken)?
            }
        };
        if login.token.trim().is_empty() {
            return Err(ApiError::MissingToken.into());
        }
        self.credentials.set(login.token.clone());
        info!(email, "logged in");
        Ok(login)
    }

    /// Drops the local token even when the server call fails.
    pub async fn logout(&self) -> Result<()> {
        let result = match self.request(Method::POST, &["api", "auth", "logout"]) {
            Ok(request) => match request.send().await {
                Ok(response) => check_status("logout", response).await.map(|_| ()),
                Err(err) => Err(err.into()),
            },
            Err(err) => Err(err),
        };
        self.credentials.clear();
        result
    }
}

async fn check_status(operation: &'static str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status {
        operation,
        status: status.as_u16(),
        body,
    }
    .into())
}

async fn read_envelope(operation: &'static str, response: Response) -> Result<Option<String>> {
    let response = check_status(operation, response).await?;
    let body = response.text().await?;
    if body.trim().is_empty() {
        return Ok(None);
    }
    let envelope: Envelope<serde_json::Value> = serde_json::from_str(&body)?;
    if !envelope.success {
        return Err(ApiError::Rejected {
            operation,
            message: envelope.error.unwrap_or_else(|| "no reason given".to_string()),
        }
        .into());
    }
    Ok(envelope
        .data
        .and_then(|data| data.as_str().map(str::to_string)))
}

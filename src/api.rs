//! Back-office REST client.
//!
//! Provides authenticated HTTP communication with the POS backend. Every
//! request carries the session's bearer token; a 401 purges the session
//! once, here, so views never have to handle it themselves.

use std::net::Ipv4Addr;
use std::sync::Arc;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::models::{ApiResponse, FileRef};
use crate::session::{SessionContext, SignInResponse};

// ---------------------------------------------------------------------------
// URL normalisation
// ---------------------------------------------------------------------------

/// Normalise the backend URL to `scheme://host[:port][/prefix]`.
///
/// A missing scheme becomes `http` for loopback and private LAN hosts (the
/// shop's own backend box) and `https` otherwise. A trailing `/api`, query
/// and fragment are dropped because every request path starts with `/api`.
pub fn normalize_api_url(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }
    let with_scheme = if raw.contains("://") {
        raw.to_string()
    } else if is_lan_host(raw) {
        format!("http://{raw}")
    } else {
        format!("https://{raw}")
    };

    let Ok(mut url) = Url::parse(&with_scheme) else {
        return with_scheme.trim_end_matches('/').to_string();
    };
    url.set_query(None);
    url.set_fragment(None);
    let path = url.path().trim_end_matches('/');
    let prefix = path
        .strip_suffix("/api")
        .unwrap_or(path)
        .trim_end_matches('/')
        .to_string();
    url.set_path(&prefix);
    url.as_str().trim_end_matches('/').to_string()
}

fn is_lan_host(raw: &str) -> bool {
    let host = raw.split(['/', ':']).next().unwrap_or_default();
    host.eq_ignore_ascii_case("localhost")
        || host
            .parse::<Ipv4Addr>()
            .is_ok_and(|ip| ip.is_loopback() || ip.is_private() || ip.is_unspecified())
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

fn friendly_error(url: &str, err: &reqwest::Error) -> ApiError {
    let message = if err.is_connect() {
        format!("Cannot reach backend at {url}")
    } else if err.is_timeout() {
        format!("Connection to {url} timed out")
    } else if err.is_builder() {
        format!("Invalid backend URL: {url}")
    } else {
        format!("Network error communicating with {url}: {err}")
    };
    ApiError::Transport(message)
}

fn status_text(status: StatusCode) -> String {
    match status.as_u16() {
        403 => "Not permitted for this account".to_string(),
        404 => "Backend endpoint not found".to_string(),
        s if s >= 500 => format!("Backend server error (HTTP {s})"),
        s => format!("Unexpected response from backend (HTTP {s})"),
    }
}

/// Best-available message for a failed response: the backend's `message`
/// (or `error`) field, else the raw body, else a status description.
pub(crate) fn error_detail(status: StatusCode, body_text: &str) -> String {
    let trimmed = body_text.trim();
    if let Ok(json) = serde_json::from_str::<Value>(trimmed) {
        if let Some(msg) = json
            .get("message")
            .or_else(|| json.get("error"))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            return msg.to_string();
        }
    } else if !trimmed.is_empty() && trimmed.len() <= 200 && !trimmed.starts_with('<') {
        return trimmed.to_string();
    }
    status_text(status)
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: Arc<SessionContext>,
}

impl ApiClient {
    pub fn new(config: &AppConfig, session: Arc<SessionContext>) -> Result<Self, ApiError> {
        let base_url = normalize_api_url(&config.api_url);
        if base_url.is_empty() {
            return Err(ApiError::validation("Backend URL is not configured"));
        }
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ApiError::Transport(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    /// Perform an authenticated request and return the JSON body, or
    /// `Value::Null` for an empty response.
    ///
    /// `path` includes the leading slash, e.g. `/api/sale-temp/list`.
    pub async fn fetch(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let mut req = self.authorized(&method, path);
        if let Some(b) = body {
            req = req.json(b);
        }
        self.execute(&method, path, req).await
    }

    /// Upload one file as the `myFile` field of a multipart form; the
    /// backend replies with the stored file name.
    pub async fn upload(
        &self,
        path: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<FileRef, ApiError> {
        let file_name = file_name.trim();
        if file_name.is_empty() {
            return Err(ApiError::validation("File name is required"));
        }
        if bytes.is_empty() {
            return Err(ApiError::validation(format!("{file_name} is empty")));
        }
        let size = bytes.len();
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime_for(file_name))
            .map_err(|e| ApiError::validation(format!("Invalid content type: {e}")))?;
        let form = Form::new().part("myFile", part);

        debug!(path, file_name, size, "uploading file");
        let req = self.authorized(&Method::POST, path).multipart(form);
        let value = self.execute(&Method::POST, path, req).await?;
        serde_json::from_value(value).map_err(|e| ApiError::InvalidJson(e.to_string()))
    }

    fn authorized(&self, method: &Method, path: &str) -> RequestBuilder {
        debug!(method = %method, path, "backend request");
        let req = self
            .http
            .request(method.clone(), format!("{}{path}", self.base_url));
        match self.session.bearer_token() {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn execute(
        &self,
        method: &Method,
        path: &str,
        req: RequestBuilder,
    ) -> Result<Value, ApiError> {
        let resp = req
            .send()
            .await
            .map_err(|e| friendly_error(&self.base_url, &e))?;
        let status = resp.status();

        if status == StatusCode::UNAUTHORIZED {
            warn!(method = %method, path, "backend refused credential");
            self.session.purge();
            return Err(ApiError::Unauthorized);
        }

        let body_text = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            let message = error_detail(status, &body_text);
            warn!(method = %method, path, status = status.as_u16(), error = %message, "backend request failed");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        if body_text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body_text).map_err(|e| ApiError::InvalidJson(e.to_string()))
    }

    /// Send a request whose response body is irrelevant.
    pub async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<(), ApiError> {
        let body = body.map(to_value).transpose()?;
        self.fetch(method, path, body.as_ref()).await.map(|_| ())
    }

    /// Send a request and decode the full response body as `T`.
    pub async fn request<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = body.map(to_value).transpose()?;
        let value = self.fetch(method, path, body.as_ref()).await?;
        serde_json::from_value(value).map_err(|e| ApiError::InvalidJson(e.to_string()))
    }

    /// Send a request and unwrap the `{ result | results }` envelope.
    pub async fn request_data<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned + Default,
        B: Serialize + ?Sized,
    {
        let envelope: ApiResponse<T> = self.request(method, path, body).await?;
        Ok(envelope.into_data().unwrap_or_default())
    }

    pub async fn get_data<T>(&self, path: &str) -> Result<T, ApiError>
    where
        T: DeserializeOwned + Default,
    {
        self.request_data::<T, Value>(Method::GET, path, None).await
    }

    /// `POST /api/user/signIn`; on success the shared session is established.
    pub async fn sign_in(&self, username: &str, password: &str) -> Result<SignInResponse, ApiError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(ApiError::validation("Username and password are required"));
        }
        let body = serde_json::json!({ "username": username, "password": password });
        let resp: SignInResponse = self
            .request(Method::POST, "/api/user/signIn", Some(&body))
            .await?;
        let resp = require_token(resp)?;
        self.session.establish_from(resp.clone());
        Ok(resp)
    }
}

fn require_token(resp: SignInResponse) -> Result<SignInResponse, ApiError> {
    if resp.token.trim().is_empty() {
        return Err(ApiError::InvalidJson(
            "sign-in response did not include a token".into(),
        ));
    }
    Ok(resp)
}

/// Content type sent with an upload, from the file extension.
fn mime_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

fn to_value<B: Serialize + ?Sized>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::InvalidJson(format!("serialize body: {e}")))
}

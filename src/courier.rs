/// Client for the courier API: the backend that posts links into a chat channel
///
/// Routes:
/// - `GET  /ping`          → `pong`
/// - `POST /api/login`     → session tokens plus user
/// - `POST /api/register`  → user, or a pending email confirmation
/// - `GET  /api/me`        → the user behind the `Authorization` token
/// - `POST /api/send`      → `{"status": "ok"}` once the message is posted
///
/// Failures come back as a non-2xx status with `{"error": "..."}`.
use crate::error::{CourierError, Result};
use crate::settings::CourierSettings;
use crate::tabs::{TabSource, active_tab};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs one HTTP exchange
#[allow(async_fn_in_trait)]
pub trait HttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpReply>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SendMessage {
    pub channel_id: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SendReceipt {
    pub status: String,
}

/// Body of both `/api/login` and `/api/register`
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub last_sign_in_at: Option<String>,
    #[serde(default)]
    pub email_confirmed_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    #[serde(default)]
    pub expires_at: Option<u64>,
    pub token_type: String,
    pub user: SessionUser,
}

/// Result of `/api/register`: either an active user or one waiting on email confirmation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Registration {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_confirmed_at: Option<String>,
    #[serde(default)]
    pub confirmation_sent_at: Option<String>,
}

impl Registration {
    pub fn needs_confirmation(&self) -> bool {
        self.email_confirmed_at.is_none() && self.confirmation_sent_at.is_some()
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// What was sent by [`share_active_tab`]
#[derive(Debug, Clone, PartialEq)]
pub struct ShareReceipt {
    pub channel_id: String,
    pub url: String,
    pub title: Option<String>,
}

/// Parse an API base, forcing a trailing `/` so that `join` keeps any path prefix
pub fn normalize_base(api_base: &str) -> Result<Url> {
    let trimmed = api_base.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    };

    let base = Url::parse(&with_slash)?;
    match base.scheme() {
        "http" | "https" => Ok(base),
        other => Err(CourierError::invalid_settings(format!(
            "API base must be http or https, got {}",
            other
        ))),
    }
}

pub struct CourierClient<T: HttpTransport> {
    base: Url,
    transport: T,
}

impl<T: HttpTransport> CourierClient<T> {
    pub fn new(api_base: &str, transport: T) -> Result<Self> {
        Ok(CourierClient {
            base: normalize_base(api_base)?,
            transport,
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    #[cfg(test)]
    pub(crate) fn transport(&self) -> &T {
        &self.transport
    }

    pub fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(path.trim_start_matches('/'))?)
    }

    pub async fn ping(&self) -> Result<()> {
        self.execute(HttpMethod::Get, "ping", None, None).await?;
        Ok(())
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<Session> {
        let body = serde_json::to_string(credentials)?;
        let reply = self
            .execute(HttpMethod::Post, "api/login", None, Some(body))
            .await?;
        Ok(serde_json::from_str(&reply.body)?)
    }

    pub async fn register(&self, credentials: &Credentials) -> Result<Registration> {
        let body = serde_json::to_string(credentials)?;
        let reply = self
            .execute(HttpMethod::Post, "api/register", None, Some(body))
            .await?;
        Ok(serde_json::from_str(&reply.body)?)
    }

    /// The user behind `access_token`.
    ///
    /// The backend answers a rejected token with a server error rather than
    /// 401, so every non-2xx reply here means the token is unusable.
    /// Transport failures pass through unchanged.
    pub async fn me(&self, access_token: &str) -> Result<SessionUser> {
        let reply = self
            .execute(HttpMethod::Get, "api/me", Some(access_token), None)
            .await
            .map_err(|err| match err {
                CourierError::Api { .. } => CourierError::Unauthorized,
                other => other,
            })?;
        Ok(serde_json::from_str(&reply.body)?)
    }

    pub async fn send(&self, message: &SendMessage, access_token: Option<&str>) -> Result<SendReceipt> {
        let body = serde_json::to_string(message)?;
        let reply = self
            .execute(HttpMethod::Post, "api/send", access_token, Some(body))
            .await?;
        Ok(serde_json::from_str(&reply.body)?)
    }

    async fn execute(
        &self,
        method: HttpMethod,
        path: &str,
        access_token: Option<&str>,
        body: Option<String>,
    ) -> Result<HttpReply> {
        let url = self.endpoint(path)?;
        let request_id = Uuid::new_v4().to_string();

        let mut headers = vec![(REQUEST_ID_HEADER.to_string(), request_id.clone())];
        if body.is_some() {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }
        // The backend expects the raw access token, no "Bearer" prefix
        if let Some(token) = access_token {
            headers.push(("Authorization".to_string(), token.to_string()));
        }

        log::debug!("[{}] {} {}", request_id, method.as_str(), url);

        let reply = self
            .transport
            .send(HttpRequest {
                method,
                url,
                headers,
                body,
            })
            .await?;

        if reply.is_success() {
            log::debug!("[{}] -> {}", request_id, reply.status);
            return Ok(reply);
        }

        let message = serde_json::from_str::<ErrorBody>(&reply.body)
            .map(|b| b.error)
            .unwrap_or_else(|_| reply.body.trim().to_string());

        log::warn!("[{}] -> {}: {}", request_id, reply.status, message);

        if reply.status == 401 {
            Err(CourierError::Unauthorized)
        } else {
            Err(CourierError::Api {
                status: reply.status,
                message,
            })
        }
    }
}

/// Look up the active tab and post its URL to the configured channel
pub async fn share_active_tab<S, T>(
    source: &S,
    client: &CourierClient<T>,
    settings: &CourierSettings,
    now_secs: u64,
) -> Result<ShareReceipt>
where
    S: TabSource,
    T: HttpTransport,
{
    settings.validate()?;

    let tab = active_tab(source).await?.ok_or(CourierError::NoActiveTab)?;
    let url = tab.url.clone().ok_or(CourierError::TabHasNoUrl)?;

    let parsed = Url::parse(&url)?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(CourierError::UnsupportedUrl(url));
    }

    let message = SendMessage {
        channel_id: settings.channel_id.clone(),
        url: url.clone(),
    };
    let token = settings.access_token(now_secs);

    client.send(&message, token).await?;

    log::info!("Sent {} to channel {}", url, settings.channel_id);

    Ok(ShareReceipt {
        channel_id: message.channel_id,
        url,
        title: tab.title,
    })
}

/// Extension settings persisted in chrome.storage.local
use crate::bridge::{getStorage, setStorage};
use crate::courier::{CourierClient, Credentials, HttpTransport, Session, normalize_base};
use crate::error::{CourierError, Result};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::LazyLock;

pub const STORAGE_KEY: &str = "tab_courier_settings";

// Discord snowflake ids
static CHANNEL_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{17,20}$").expect("channel id pattern is valid"));

/// Access token kept after a successful sign-in
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredSession {
    pub access_token: String,
    #[serde(default)]
    pub user_email: Option<String>,
    /// Unix seconds
    pub expires_at: u64,
}

impl StoredSession {
    pub fn from_session(session: &Session, now_secs: u64) -> StoredSession {
        let expires_at = session
            .expires_at
            .unwrap_or_else(|| now_secs.saturating_add(session.expires_in.max(0) as u64));

        StoredSession {
            access_token: session.access_token.clone(),
            user_email: session.user.email.clone(),
            expires_at,
        }
    }

    pub fn is_expired(&self, now_secs: u64) -> bool {
        now_secs >= self.expires_at
    }
}

impl std::fmt::Debug for StoredSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredSession")
            .field("access_token", &"***")
            .field("user_email", &self.user_email)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Root storage structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CourierSettings {
    #[serde(default)]
    pub api_base: String,
    #[serde(default)]
    pub channel_id: String,
    #[serde(default)]
    pub session: Option<StoredSession>,
}

impl CourierSettings {
    pub fn new(api_base: &str, channel_id: &str) -> Self {
        CourierSettings {
            api_base: api_base.trim().to_string(),
            channel_id: channel_id.trim().to_string(),
            session: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_base.trim().is_empty() {
            return Err(CourierError::invalid_settings("API base URL is not set"));
        }
        normalize_base(&self.api_base)?;

        if !CHANNEL_ID_RE.is_match(self.channel_id.trim()) {
            return Err(CourierError::invalid_settings(format!(
                "Channel id must be a 17-20 digit number, got '{}'",
                self.channel_id
            )));
        }

        Ok(())
    }

    /// The stored token, unless it has expired
    pub fn access_token(&self, now_secs: u64) -> Option<&str> {
        self.session
            .as_ref()
            .filter(|s| !s.is_expired(now_secs))
            .map(|s| s.access_token.as_str())
    }

    pub fn signed_in_as(&self, now_secs: u64) -> Option<&str> {
        self.session
            .as_ref()
            .filter(|s| !s.is_expired(now_secs))
            .map(|s| s.user_email.as_deref().unwrap_or("unknown user"))
    }

    pub fn sign_out(&mut self) -> bool {
        self.session.take().is_some()
    }

    /// Whether `typed` names the same base as the saved one
    pub fn base_matches(&self, typed: &str) -> bool {
        let typed = typed.trim();
        !typed.is_empty() && typed.trim_end_matches('/') == self.api_base.trim().trim_end_matches('/')
    }
}

/// Ask the backend whether the stored session still works; drop it if not.
///
/// Returns `true` when the session was dropped. Network trouble keeps it.
pub async fn verify_session<T: HttpTransport>(
    settings: &mut CourierSettings,
    client: &CourierClient<T>,
    now_secs: u64,
) -> bool {
    let Some(token) = settings.access_token(now_secs).map(str::to_string) else {
        return false;
    };

    match client.me(&token).await {
        Ok(user) => {
            log::debug!("Session valid for {}", user.id);
            false
        }
        Err(CourierError::Unauthorized) => {
            log::info!("Stored session rejected by server, signing out");
            settings.sign_out()
        }
        Err(e) => {
            log::warn!("Could not verify session: {}", e);
            false
        }
    }
}

/// Decode a storage entry; a missing (`null`/`undefined`) entry gives the defaults
pub fn decode_settings<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<CourierSettings, D::Error> {
    Option::<CourierSettings>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Log in against the configured backend and keep the returned session
pub async fn sign_in<T: HttpTransport>(
    settings: &CourierSettings,
    client: &CourierClient<T>,
    credentials: &Credentials,
    now_secs: u64,
) -> Result<CourierSettings> {
    let session = client.login(credentials).await?;
    log::info!("Signed in as {}", session.user.email.as_deref().unwrap_or(&session.user.id));

    let mut updated = settings.clone();
    updated.session = Some(StoredSession::from_session(&session, now_secs));
    Ok(updated)
}

pub async fn load_settings() -> Result<CourierSettings> {
    let settings_js = getStorage(STORAGE_KEY).await?;
    Ok(decode_settings(serde_wasm_bindgen::Deserializer::from(settings_js))?)
}

pub async fn save_settings(settings: &CourierSettings) -> Result<()> {
    let settings_js = serde_wasm_bindgen::to_value(settings)?;
    setStorage(STORAGE_KEY, settings_js).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::courier::SessionUser;
    use crate::testing::FakeTransport;

    fn valid_settings() -> CourierSettings {
        CourierSettings::new("https://courier.example.workers.dev", "112233445566778899")
    }

    fn session(expires_at: Option<u64>) -> Session {
        Session {
            access_token: "at".to_string(),
            refresh_token: "rt".to_string(),
            expires_in: 3600,
            expires_at,
            token_type: "bearer".to_string(),
            user: SessionUser {
                id: "4f7c".to_string(),
                email: Some("dev@example.com".to_string()),
                created_at: None,
                updated_at: None,
                last_sign_in_at: None,
                email_confirmed_at: None,
            },
        }
    }

    #[test]
    fn test_default_settings_are_invalid() {
        let settings = CourierSettings::default();
        assert!(matches!(
            settings.validate(),
            Err(CourierError::InvalidSettings { .. })
        ));
    }

    #[test]
    fn test_validate_ok() {
        assert_eq!(valid_settings().validate(), Ok(()));
    }

    #[test]
    fn test_validate_channel_id() {
        let mut settings = valid_settings();

        settings.channel_id = "1234".to_string();
        assert!(settings.validate().is_err());

        settings.channel_id = "#general".to_string();
        assert!(settings.validate().is_err());

        settings.channel_id = " 112233445566778899 ".to_string();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validate_api_base() {
        let mut settings = valid_settings();
        settings.api_base = "courier.example.workers.dev".to_string();
        assert!(matches!(settings.validate(), Err(CourierError::InvalidUrl(_))));
    }

    #[test]
    fn test_stored_session_uses_expires_at() {
        let stored = StoredSession::from_session(&session(Some(5000)), 1000);
        assert_eq!(stored.expires_at, 5000);
        assert!(!stored.is_expired(4999));
        assert!(stored.is_expired(5000));
    }

    #[test]
    fn test_stored_session_falls_back_to_expires_in() {
        let stored = StoredSession::from_session(&session(None), 1000);
        assert_eq!(stored.expires_at, 4600);
    }

    #[test]
    fn test_access_token_hidden_after_expiry() {
        let mut settings = valid_settings();
        settings.session = Some(StoredSession::from_session(&session(Some(5000)), 0));

        assert_eq!(settings.access_token(10), Some("at"));
        assert_eq!(settings.signed_in_as(10), Some("dev@example.com"));
        assert_eq!(settings.access_token(6000), None);
        assert_eq!(settings.signed_in_as(6000), None);
    }

    #[test]
    fn test_sign_out() {
        let mut settings = valid_settings();
        settings.session = Some(StoredSession::from_session(&session(Some(5000)), 0));

        assert!(settings.sign_out());
        assert!(!settings.sign_out());
        assert_eq!(settings.session, None);
    }

    #[test]
    fn test_sign_in_stores_session() {
        let body = serde_json::to_string(&session(Some(9000))).unwrap();
        let client = CourierClient::new(
            "https://courier.example.workers.dev",
            FakeTransport::replying(200, &body),
        )
        .unwrap();
        let credentials = Credentials {
            email: "dev@example.com".to_string(),
            password: "hunter2".to_string(),
        };

        let updated =
            tokio_test::block_on(sign_in(&valid_settings(), &client, &credentials, 100)).unwrap();

        assert_eq!(updated.access_token(100), Some("at"));
        assert_eq!(updated.channel_id, "112233445566778899");
    }

    #[test]
    fn test_sign_in_failure_keeps_settings_untouched() {
        let client = CourierClient::new(
            "https://courier.example.workers.dev",
            FakeTransport::replying(400, r#"{"error":"Invalid login credentials"}"#),
        )
        .unwrap();
        let credentials = Credentials {
            email: "dev@example.com".to_string(),
            password: "wrong".to_string(),
        };
        let settings = valid_settings();

        let result = tokio_test::block_on(sign_in(&settings, &client, &credentials, 100));

        assert!(result.is_err());
        assert_eq!(settings.session, None);
    }

    #[test]
    fn test_serialization() {
        let mut settings = valid_settings();
        settings.session = Some(StoredSession::from_session(&session(Some(5000)), 0));

        let json = serde_json::to_string(&settings).unwrap();
        let deserialized: CourierSettings = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized, settings);
    }

    #[test]
    fn test_missing_storage_entry_gives_defaults() {
        let settings =
            decode_settings(&mut serde_json::Deserializer::from_str("null")).unwrap();

        assert_eq!(settings, CourierSettings::default());
    }

    #[test]
    fn test_decode_stored_entry() {
        let json = r#"{"api_base": "https://courier.example.workers.dev", "channel_id": "112233445566778899"}"#;

        let settings = decode_settings(&mut serde_json::Deserializer::from_str(json)).unwrap();

        assert_eq!(settings, valid_settings());
    }

    #[test]
    fn test_base_matches() {
        let settings = valid_settings();

        assert!(settings.base_matches("https://courier.example.workers.dev"));
        assert!(settings.base_matches(" https://courier.example.workers.dev/ "));
        assert!(!settings.base_matches("https://other.example.workers.dev"));
        assert!(!settings.base_matches(""));
        assert!(!CourierSettings::default().base_matches(""));
    }

    fn signed_in_settings() -> CourierSettings {
        let mut settings = valid_settings();
        settings.session = Some(StoredSession::from_session(&session(Some(5000)), 0));
        settings
    }

    #[test]
    fn test_verify_session_drops_revoked_token() {
        let client = CourierClient::new(
            "https://courier.example.workers.dev",
            FakeTransport::replying(500, "Error: Unauthorized"),
        )
        .unwrap();
        let mut settings = signed_in_settings();

        let dropped = tokio_test::block_on(verify_session(&mut settings, &client, 10));

        assert!(dropped);
        assert_eq!(settings.session, None);
    }

    #[test]
    fn test_verify_session_keeps_valid_token() {
        let user = serde_json::to_string(&session(None).user).unwrap();
        let client = CourierClient::new(
            "https://courier.example.workers.dev",
            FakeTransport::replying(200, &user),
        )
        .unwrap();
        let mut settings = signed_in_settings();

        let dropped = tokio_test::block_on(verify_session(&mut settings, &client, 10));

        assert!(!dropped);
        assert_eq!(settings.access_token(10), Some("at"));
        assert_eq!(client.transport().requests()[0].header("Authorization"), Some("at"));
    }

    #[test]
    fn test_verify_session_keeps_token_when_offline() {
        let transport = FakeTransport::default();
        transport.push_error(CourierError::Bridge("TypeError: Failed to fetch".to_string()));
        let client = CourierClient::new("https://courier.example.workers.dev", transport).unwrap();
        let mut settings = signed_in_settings();

        let dropped = tokio_test::block_on(verify_session(&mut settings, &client, 10));

        assert!(!dropped);
        assert!(settings.session.is_some());
    }

    #[test]
    fn test_verify_session_skips_request_without_live_token() {
        let client = CourierClient::new(
            "https://courier.example.workers.dev",
            FakeTransport::default(),
        )
        .unwrap();
        let mut settings = signed_in_settings();

        let dropped = tokio_test::block_on(verify_session(&mut settings, &client, 6000));

        assert!(!dropped);
        assert!(client.transport().requests().is_empty());
    }

    #[test]
    fn test_partial_storage_entry() {
        let settings: CourierSettings =
            serde_json::from_str(r#"{"api_base": "https://courier.example.workers.dev"}"#).unwrap();

        assert_eq!(settings.channel_id, "");
        assert_eq!(settings.session, None);
    }
}

/// Bearer token lifecycle for the vendor cloud
///
/// The session is held behind an async mutex. `ensure_valid` keeps the lock
/// for the whole login, so concurrent callers wait for the single in-flight
/// login and then reuse its token.
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::sync::Arc;
use time::{Duration, OffsetDateTime};
use tokio::sync::Mutex;

use crate::cloud::transport::{HttpRequest, HttpResponse, Transport};
use crate::cloud::{APP_CODE, LANG};
use crate::error::CloudError;

pub const LOGIN_PATH: &str = "/auth/basic/app/login";

/// Tokens are refreshed this long before the server-side expiry
const TOKEN_REFRESH_GRACE: Duration = Duration::minutes(5);

#[derive(Clone)]
pub struct Credentials {
    pub area_code: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("area_code", &self.area_code)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Persisted form of the session: expiry as integer epoch seconds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub token: Option<String>,
    pub refresh_token: Option<String>,
    pub token_expires_at: Option<i64>,
}

#[derive(Debug, Clone, Default)]
struct Session {
    token: Option<String>,
    refresh_token: Option<String>,
    expires_at: Option<OffsetDateTime>,
}

impl Session {
    fn usable_token(&self, now: OffsetDateTime) -> Option<&str> {
        let refresh_at = self.expires_at?.checked_sub(TOKEN_REFRESH_GRACE)?;
        match &self.token {
            Some(token) if now < refresh_at => Some(token.as_str()),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct LoginEnvelope {
    code: Option<i64>,
    ts: Option<i64>,
    data: Option<LoginData>,
}

#[derive(Deserialize)]
struct LoginData {
    token: String,
    #[serde(rename = "refreshToken")]
    refresh_token: Option<String>,
    #[serde(rename = "tokenExpired", default)]
    token_expired: i64,
}

pub struct SessionManager {
    transport: Arc<dyn Transport>,
    credentials: Credentials,
    session: Mutex<Session>,
}

impl SessionManager {
    pub fn new(transport: Arc<dyn Transport>, credentials: Credentials) -> Self {
        Self {
            transport,
            credentials,
            session: Mutex::new(Session::default()),
        }
    }

    /// Load a previously exported state. Expired or bogus tokens are left for
    /// `ensure_valid` to replace.
    pub async fn restore(&self, state: SessionState) {
        let expires_at = state
            .token_expires_at
            .and_then(|ts| OffsetDateTime::from_unix_timestamp(ts).ok());

        *self.session.lock().await = Session {
            token: state.token,
            refresh_token: state.refresh_token,
            expires_at,
        };
    }

    pub async fn export(&self) -> SessionState {
        let session = self.session.lock().await;
        SessionState {
            token: session.token.clone(),
            refresh_token: session.refresh_token.clone(),
            token_expires_at: session.expires_at.map(|t| t.unix_timestamp()),
        }
    }

    /// Return a token that is valid for at least the grace period, logging in
    /// first when the cached one is missing or about to expire
    pub async fn ensure_valid(&self) -> Result<String, CloudError> {
        let mut session = self.session.lock().await;

        if let Some(token) = session.usable_token(OffsetDateTime::now_utc()) {
            return Ok(token.to_string());
        }

        debug!("Cached token missing or near expiry, logging in");
        *session = self.request_login().await?;
        session
            .token
            .clone()
            .ok_or_else(|| CloudError::Auth("login returned no token".to_string()))
    }

    /// Unconditionally log in and replace the cached session
    pub async fn login(&self) -> Result<(), CloudError> {
        let mut session = self.session.lock().await;
        *session = self.request_login().await?;
        Ok(())
    }

    async fn request_login(&self) -> Result<Session, CloudError> {
        let Credentials {
            area_code,
            email,
            password,
        } = &self.credentials;

        let body = json!({
            "areaCode": area_code,
            "phoneOrEmail": email,
            "password": password_hash(password),
            "deviceId": device_id(email, area_code),
        });
        let request = HttpRequest::post_json(LOGIN_PATH, body)
            .header("Content-Type", "application/json")
            .header("lang", LANG)
            .header("appCode", APP_CODE);

        info!("Logging in to HomGar cloud as {}", email);
        let called_at = OffsetDateTime::now_utc();

        let HttpResponse { status, body } = self
            .transport
            .send(request)
            .await
            .map_err(|e| CloudError::Auth(e.to_string()))?;
        if status != 200 {
            return Err(CloudError::Auth(format!("login HTTP {status}")));
        }

        let envelope: LoginEnvelope = serde_json::from_str(&body)
            .map_err(|e| CloudError::Auth(format!("malformed login response: {e}")))?;
        if envelope.code != Some(0) {
            return Err(CloudError::Auth(format!("login rejected: {body}")));
        }
        let data = envelope
            .data
            .ok_or_else(|| CloudError::Auth("login response has no data".to_string()))?;

        // `ts` is the server clock in epoch milliseconds; zero means unset
        let base = envelope
            .ts
            .filter(|&ms| ms != 0)
            .and_then(|ms| {
                OffsetDateTime::from_unix_timestamp_nanos(i128::from(ms) * 1_000_000).ok()
            })
            .unwrap_or(called_at);
        let expires_at = base
            .checked_add(Duration::seconds(data.token_expired))
            .ok_or_else(|| {
                CloudError::Auth(format!(
                    "login token validity out of range: {}",
                    data.token_expired
                ))
            })?;

        info!(
            "HomGar login successful; token expires in {} seconds",
            data.token_expired
        );

        Ok(Session {
            token: Some(data.token),
            refresh_token: data.refresh_token,
            expires_at: Some(expires_at),
        })
    }
}

/// Hex MD5 of the password, as the login endpoint expects
pub fn password_hash(password: &str) -> String {
    format!("{:x}", md5::compute(password.as_bytes()))
}

/// Stable per-account device id
pub fn device_id(email: &str, area_code: &str) -> String {
    format!("{:x}", md5::compute(format!("{email}{area_code}").as_bytes()))
}

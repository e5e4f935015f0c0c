use log::{info, warn};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

use crate::cloud::{Credentials, SessionState};

const DEFAULT_BASE_URL: &str = "https://region3.homgarus.com";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub credentials: Credentials,
    /// Empty means every home the account owns
    pub home_ids: Vec<i64>,
    pub base_url: Url,
    pub poll_interval_secs: u64,
    pub session_file: Option<PathBuf>,
}

impl PollerConfig {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        // Load environment variables
        dotenv::dotenv().ok();

        let area_code = required("HOMGAR_AREA_CODE")?;
        let email = required("HOMGAR_EMAIL")?;
        let password = required("HOMGAR_PASSWORD")?;

        let home_ids = match env::var("HOMGAR_HOME_IDS") {
            Ok(raw) => parse_home_ids(&raw)?,
            Err(_) => Vec::new(),
        };

        let base_url =
            env::var("HOMGAR_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let base_url = Url::parse(&base_url)
            .map_err(|e| format!("Invalid HOMGAR_BASE_URL '{}': {}", base_url, e))?;

        let poll_interval_secs = match env::var("HOMGAR_POLL_INTERVAL_SECS") {
            Ok(raw) => parse_interval(&raw)?,
            Err(_) => DEFAULT_POLL_INTERVAL_SECS,
        };

        let session_file = env::var("HOMGAR_SESSION_FILE")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        if home_ids.is_empty() {
            info!("HOMGAR_HOME_IDS not set, all homes of the account will be polled");
        } else {
            info!("Configured home ids: {:?}", home_ids);
        }

        Ok(PollerConfig {
            credentials: Credentials {
                area_code,
                email,
                password,
            },
            home_ids,
            base_url,
            poll_interval_secs,
            session_file,
        })
    }
}

fn required(key: &str) -> Result<String, String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(format!("{} environment variable not set", key)),
    }
}

/// Parse `"1, 2,3"` into home ids; empty input selects no explicit homes
pub fn parse_home_ids(raw: &str) -> Result<Vec<i64>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| {
            id.parse::<i64>()
                .map_err(|e| format!("Invalid home id '{}' in HOMGAR_HOME_IDS: {}", id, e))
        })
        .collect()
}

fn parse_interval(raw: &str) -> Result<u64, String> {
    match raw.trim().parse::<u64>() {
        Ok(0) | Err(_) => Err(format!(
            "HOMGAR_POLL_INTERVAL_SECS must be a positive number of seconds, got '{}'",
            raw
        )),
        Ok(secs) => Ok(secs),
    }
}

/// Read a previously saved session. A missing or unreadable file means a fresh login.
pub fn load_session_state(path: &Path) -> Option<SessionState> {
    let contents = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&contents) {
        Ok(state) => Some(state),
        Err(e) => {
            warn!("Ignoring unreadable session file {}: {}", path.display(), e);
            None
        }
    }
}

pub fn save_session_state(path: &Path, state: &SessionState) -> Result<(), String> {
    let json = serde_json::to_string_pretty(state)
        .map_err(|e| format!("Failed to serialize session: {}", e))?;
    fs::write(path, json).map_err(|e| format!("Failed to write {}: {}", path.display(), e))
}

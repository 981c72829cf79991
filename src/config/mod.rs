mod session;

pub use session::SessionContext;

use chrono::format::{ Item, StrftimeItems };
use std::time::Duration;
use url::Url;

use crate::cli::Args;
use crate::error::{ ChatError, ChatResult };

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_DATE_FORMAT: &str = "%d/%m/%Y";

#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Always ends with `/` so endpoint paths join under it.
    pub api_base_url: Url,
    pub request_timeout: Duration,
    pub poll_interval: Duration,
    pub discard_stale_refreshes: bool,
    pub date_format: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_base_url: Url::parse("http://127.0.0.1:8080/api/").expect("static url"),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            discard_stale_refreshes: true,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

impl ChatConfig {
    pub fn from_args(args: &Args) -> ChatResult<Self> {
        if args.poll_interval_secs == 0 {
            return Err(ChatError::Config("poll interval must be at least one second".into()));
        }
        if args.request_timeout_secs == 0 {
            return Err(ChatError::Config("request timeout must be at least one second".into()));
        }
        if StrftimeItems::new(&args.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(ChatError::Config(format!("invalid date format: '{}'", args.date_format)));
        }

        Ok(Self {
            api_base_url: normalize_base_url(&args.api_base_url)?,
            request_timeout: Duration::from_secs(args.request_timeout_secs),
            poll_interval: Duration::from_secs(args.poll_interval_secs),
            discard_stale_refreshes: args.discard_stale_refreshes,
            date_format: args.date_format.clone(),
        })
    }
}

pub fn normalize_base_url(raw: &str) -> ChatResult<Url> {
    let mut url = Url::parse(raw.trim()).map_err(|e|
        ChatError::Config(format!("invalid API base URL '{}': {}", raw, e))
    )?;
    if url.cannot_be_a_base() {
        return Err(ChatError::Config(format!("API base URL '{}' cannot hold paths", raw)));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Terminal client for the stayhost messaging panel", long_about = None)]
pub struct Args {
    // --- Backend Args ---
    /// Base URL of the marketplace JSON API (e.g., https://stayhost.example/api)
    #[arg(long, env = "CHAT_API_BASE_URL", default_value = "http://127.0.0.1:8080/api")]
    pub api_base_url: String,

    /// Per-request timeout in seconds.
    #[arg(long, env = "CHAT_REQUEST_TIMEOUT_SECS", default_value = "15")]
    pub request_timeout_secs: u64,

    // --- Session Args ---
    /// Id of the signed-in user.
    #[arg(long, env = "CHAT_USER_ID")]
    pub user_id: i64,

    /// Display name of the signed-in user.
    #[arg(long, env = "CHAT_USER_NAME", default_value = "me")]
    pub user_name: String,

    /// Session credential sent as a bearer token. Chat is unavailable without it.
    #[arg(long, env = "CHAT_AUTH_TOKEN")]
    pub auth_token: Option<String>,

    // --- Conversation Args ---
    /// Seconds between refreshes of the open conversation.
    #[arg(long, env = "CHAT_POLL_INTERVAL_SECS", default_value = "5")]
    pub poll_interval_secs: u64,

    /// Drop refresh responses that resolve after a newer one has been applied.
    #[arg(long, env = "CHAT_DISCARD_STALE_REFRESHES", default_value = "true", action = clap::ArgAction::Set)]
    pub discard_stale_refreshes: bool,

    /// chrono format used for timestamps older than a week.
    #[arg(long, env = "CHAT_DATE_FORMAT", default_value = "%d/%m/%Y")]
    pub date_format: String,
}

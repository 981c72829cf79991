pub mod api;
pub mod cli;
pub mod composer;
pub mod config;
pub mod context;
pub mod directory;
pub mod error;
pub mod format;
pub mod models;
pub mod poller;
pub mod read_tracker;
pub mod render;
pub mod terminal;
pub mod view;

use cli::Args;
use config::{ ChatConfig, SessionContext };
use context::ChatContext;
use log::info;
use render::TerminalRenderer;
use std::error::Error;
use tokio::io::BufReader;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = ChatConfig::from_args(&args)?;
    let session = SessionContext::from_args(&args)?;

    info!("--- Chat Configuration ---");
    info!("API Base URL: {}", config.api_base_url);
    info!("User: {} ({})", session.user_name, session.user_id);
    info!("Credential: {}", if args.auth_token.is_some() { "provided" } else { "missing" });
    info!("Poll Interval: {:?}", config.poll_interval);
    info!("Request Timeout: {:?}", config.request_timeout);
    info!("Discard Stale Refreshes: {}", config.discard_stale_refreshes);
    info!("Date Format: {}", config.date_format);
    info!("--------------------------");

    let date_format = config.date_format.clone();
    let mut ctx = ChatContext::connect(config, session)?;
    let mut renderer = TerminalRenderer::new(std::io::stdout(), ctx.user_id(), date_format);
    let stdin = BufReader::new(tokio::io::stdin());
    terminal::run_session(&mut ctx, stdin, &mut renderer).await?;

    Ok(())
}

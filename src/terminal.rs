use futures::StreamExt;
use log::{ error, info };
use std::io;
use tokio::io::{ AsyncBufRead, AsyncBufReadExt };
use tokio_stream::wrappers::{ LinesStream, WatchStream };

use crate::context::ChatContext;
use crate::error::ChatError;
use crate::models::chat::Peer;
use crate::models::command::{ Command, HELP };
use crate::render::Renderer;

/// Reads commands line by line and drives the messaging components. Poll
/// results are drawn as they arrive. Returns on `quit` or end of input, with
/// the open conversation closed.
pub async fn run_session<R, T>(ctx: &mut ChatContext, input: R, renderer: &mut T) -> io::Result<()>
    where R: AsyncBufRead + Unpin, T: Renderer
{
    let mut lines = LinesStream::new(input.lines());
    let mut snapshots = WatchStream::from_changes(ctx.view.subscribe());
    renderer.notice(HELP)?;
    show_conversations(ctx, renderer).await?;

    loop {
        tokio::select! {
            biased;
            line = lines.next() => {
                let Some(line) = line else {
                    break;
                };
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<Command>() {
                    Ok(Command::Quit) => break,
                    Ok(command) => dispatch(ctx, command, renderer).await?,
                    Err(e) => renderer.notice(&e.to_string())?,
                }
            }
            Some(snapshot) = snapshots.next() => {
                match snapshot {
                    Some(snapshot) => renderer.conversation(&snapshot)?,
                    None => renderer.closed()?,
                }
            }
        }
    }

    ctx.view.close().await;
    info!("Chat session ended for user {}", ctx.user_id());
    Ok(())
}

async fn dispatch<T: Renderer>(ctx: &mut ChatContext, command: Command, renderer: &mut T) -> io::Result<()> {
    match command {
        Command::List => show_conversations(ctx, renderer).await,
        Command::Open(peer_id) => {
            let name = ctx.directory
                .find(peer_id)
                .map(|c| c.peer_name.clone())
                .unwrap_or_else(|| format!("user #{}", peer_id));
            let opened = ctx.view.select_conversation(Peer::new(peer_id, name)).await;
            show_current(ctx, renderer)?;
            report(opened, renderer)
        }
        Command::Send(text) => {
            let sent = ctx.composer.submit(&text).await;
            show_current(ctx, renderer)?;
            report(sent, renderer)
        }
        Command::Refresh => {
            let refreshed = ctx.view.refresh().await;
            show_current(ctx, renderer)?;
            report(refreshed, renderer)
        }
        Command::Close => {
            if ctx.view.close().await {
                renderer.closed()?;
                show_conversations(ctx, renderer).await
            } else {
                renderer.notice("No conversation is open.")
            }
        }
        Command::Help => renderer.notice(HELP),
        Command::Quit => Ok(()),
    }
}

async fn show_conversations<T: Renderer>(ctx: &mut ChatContext, renderer: &mut T) -> io::Result<()> {
    let listed = ctx.directory.list_conversations().await.map(|_| ());
    match listed {
        Ok(()) => {
            let conversations = ctx.directory.latest().unwrap_or_default();
            renderer.conversations(conversations, ctx.directory.unread_total())
        }
        Err(e) => report(Err::<(), _>(e), renderer),
    }
}

fn show_current<T: Renderer>(ctx: &ChatContext, renderer: &mut T) -> io::Result<()> {
    match ctx.view.snapshot() {
        Some(snapshot) => renderer.conversation(&snapshot),
        None => Ok(()),
    }
}

fn report<V, T: Renderer>(result: Result<V, ChatError>, renderer: &mut T) -> io::Result<()> {
    match result {
        Ok(_) => Ok(()),
        Err(e) => {
            if !e.is_validation() {
                error!("{}", e);
            }
            renderer.error(&e)
        }
    }
}

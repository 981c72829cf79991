use log::debug;
use std::future::Future;
use std::ops::ControlFlow;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{ interval_at, Instant, MissedTickBehavior };
use tokio_util::sync::CancellationToken;

/// Fixed-interval refresh task. Dropping the poller cancels it: no tick starts
/// after the drop. A tick already in flight runs to completion.
pub struct Poller {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl Poller {
    /// The first tick fires one full `period` after start.
    pub fn start<F, Fut>(period: Duration, mut on_tick: F) -> Self
        where F: FnMut() -> Fut + Send + 'static, Fut: Future<Output = ControlFlow<()>> + Send + 'static
    {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let first_tick = Instant::now() + period;

        let handle = tokio::spawn(async move {
            let mut ticks = interval_at(first_tick, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => break,
                    _ = ticks.tick() => {
                        if cancelled.is_cancelled() || on_tick().await.is_break() {
                            break;
                        }
                    }
                }
            }
            debug!("Poller stopped");
        });

        Self { token, handle }
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

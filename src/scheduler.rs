//! Update Scheduler: the single loop that reads session state and publishes.
//!
//! Two trigger sources feed one handler: change notifications for the Live
//! Status Record and a fixed-interval timer. Every trigger performs a full
//! re-derivation through the [`SessionSelector`], so duplicate or reordered
//! triggers are harmless. Termination is observed through a
//! [`CancellationToken`], including while a read or publish is in flight.

use std::time::Duration;

use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, warn, Instrument};

use crate::config::DisplayConfig;
use crate::ipc::IpcClient;
use crate::presence::render_activity;
use crate::session::{SessionContext, SessionSelector, SourceMode};
use crate::watcher::StatusWatcher;
use crate::Result;

/// Upper bound on closing the channel during shutdown.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// What a single trigger produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A snapshot was rendered and sent.
    Published,
    /// Neither source had a session.
    NoSession,
    /// A snapshot was available but the publish failed.
    PublishFailed,
}

/// Owns every piece of state the loop touches.
#[derive(Debug)]
pub struct UpdateScheduler {
    selector: SessionSelector,
    client: IpcClient,
    ctx: SessionContext,
    display: DisplayConfig,
    poll_interval: Duration,
}

impl UpdateScheduler {
    /// Create a scheduler around a connected client.
    #[must_use]
    pub fn new(
        selector: SessionSelector,
        client: IpcClient,
        ctx: SessionContext,
        display: DisplayConfig,
        poll_interval: Duration,
    ) -> Self {
        Self {
            selector,
            client,
            ctx,
            display,
            poll_interval,
        }
    }

    /// Per-run context (source mode, tip flag).
    #[must_use]
    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    /// The IPC client driven by this scheduler.
    #[must_use]
    pub fn client(&self) -> &IpcClient {
        &self.client
    }

    /// Handle one trigger: read the current session and publish it.
    ///
    /// Publish failures are logged and reported in the outcome; they never
    /// end the loop.
    pub async fn tick(&mut self) -> TickOutcome {
        let Some(snapshot) = self.selector.read_session(&mut self.ctx).await else {
            return TickOutcome::NoSession;
        };

        let activity = render_activity(&snapshot, &self.display);
        match self.client.publish(&activity).await {
            Ok(()) => TickOutcome::Published,
            Err(err) => {
                warn!(%err, "failed to publish activity");
                TickOutcome::PublishFailed
            }
        }
    }

    /// Run until `cancel` fires, then close the client.
    ///
    /// The first read happens before the loop starts so an already active
    /// session shows up immediately.
    ///
    /// # Errors
    ///
    /// Currently infallible; the signature leaves room for setup failures
    /// that should end the process.
    pub async fn run(mut self, cancel: CancellationToken) -> Result<()> {
        let span = info_span!("update_scheduler", interval_secs = self.poll_interval.as_secs());
        async move {
            let Some(first) = self.tick_or_cancel(&cancel).await else {
                info!("update scheduler cancelled before first read");
                self.close_client().await;
                return Ok(());
            };
            self.report_startup(first);

            let mut watcher = match StatusWatcher::new(self.selector.status_path()) {
                Ok(watcher) => Some(watcher),
                Err(err) => {
                    warn!(%err, "file watcher unavailable, using polling mode");
                    None
                }
            };

            let mut interval = interval_at(Instant::now() + self.poll_interval, self.poll_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    () = cancel.cancelled() => {
                        info!("update scheduler shutting down");
                        break;
                    }
                    changed = next_change(watcher.as_mut()) => {
                        if changed.is_none() {
                            warn!("file watcher stopped, using polling mode");
                            watcher = None;
                            continue;
                        }
                        if self.tick_or_cancel(&cancel).await.is_none() {
                            info!("update scheduler cancelled mid-update");
                            break;
                        }
                    }
                    _ = interval.tick() => {
                        if self.tick_or_cancel(&cancel).await.is_none() {
                            info!("update scheduler cancelled mid-update");
                            break;
                        }
                    }
                }
            }

            self.close_client().await;
            Ok(())
        }
        .instrument(span)
        .await
    }

    /// Run one tick unless `cancel` fires first; `None` means cancelled.
    async fn tick_or_cancel(&mut self, cancel: &CancellationToken) -> Option<TickOutcome> {
        tokio::select! {
            () = cancel.cancelled() => None,
            outcome = self.tick() => Some(outcome),
        }
    }

    async fn close_client(&mut self) {
        if tokio::time::timeout(CLOSE_TIMEOUT, self.client.close())
            .await
            .is_err()
        {
            warn!("timed out closing discord ipc channel");
        }
    }

    fn report_startup(&self, first: TickOutcome) {
        if first == TickOutcome::NoSession {
            info!("waiting for Claude Code session");
            return;
        }
        match self.ctx.source_mode {
            SourceMode::Primary => info!("session found via statusline data"),
            SourceMode::Fallback => info!("session found via transcript logs"),
        }
    }
}

/// Resolve on the next watcher notification, or never when there is no
/// watcher.
async fn next_change(watcher: Option<&mut StatusWatcher>) -> Option<()> {
    match watcher {
        Some(watcher) => watcher.changed().await,
        None => std::future::pending().await,
    }
}

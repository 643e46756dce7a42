//! Background polling.
//!
//! Two independent triggers drive the pipeline, both as tasks on a [`tokio`]
//! runtime:
//!
//! * **refresh**: runs once at startup and again whenever the UI asks
//!   through [`Poller::refresh`]; the result replaces the list on screen.
//! * **check**: runs every `check_interval_minutes` and feeds the result to
//!   [`notify::check`], which may raise one notification.
//!
//! The triggers share nothing but the [`SettingsStore`], whose lock makes the
//! ledger update atomic.  Results go to the UI thread over an [`mpsc`]
//! channel, drained once per frame.

use std::sync::{mpsc, Arc};

use chrono::Local;
use tokio::runtime::Handle;
use tokio::sync::mpsc as async_mpsc;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, warn};

use crate::notify::{self, NotificationRequest, Notifier};
use crate::pipeline::IngestionPipeline;
use crate::settings::SettingsStore;
use crate::source::NewsItem;

/// Messages sent from the polling tasks to the UI thread.
#[derive(Debug)]
pub enum PollMsg {
    /// A refresh has started.
    Refreshing,
    /// A refresh finished with today's items, newest first.
    Items(Vec<NewsItem>),
    /// The periodic check raised this notification.
    Notified(NotificationRequest),
    /// A check could not deliver its notification.
    Error(String),
}

/// Everything one poll needs, shared by both triggers.
pub struct PollContext {
    pub pipeline: IngestionPipeline,
    pub store: Arc<SettingsStore>,
    pub notifier: Arc<dyn Notifier>,
}

/// Handle for requesting on-demand refreshes.
pub struct Poller {
    refresh_tx: async_mpsc::UnboundedSender<()>,
}

impl Poller {
    pub fn refresh(&self) {
        // Only fails once the refresh task is gone, i.e. during shutdown.
        let _ = self.refresh_tx.send(());
    }
}

/// Spawn the refresh and check tasks on `runtime`.
///
/// The tasks stop once the returned receiver is dropped (on their next send)
/// or when the runtime shuts down.
pub fn spawn(runtime: &Handle, ctx: Arc<PollContext>) -> (Poller, mpsc::Receiver<PollMsg>) {
    let (tx, rx) = mpsc::channel();
    let (refresh_tx, mut refresh_rx) = async_mpsc::unbounded_channel();

    let refresh_ctx = ctx.clone();
    let refresh_out = tx.clone();
    runtime.spawn(async move {
        while refresh_rx.recv().await.is_some() {
            if refresh_out.send(PollMsg::Refreshing).is_err() {
                return;
            }
            let items = refresh_ctx.pipeline.run(Local::now()).await;
            if refresh_out.send(PollMsg::Items(items)).is_err() {
                return;
            }
        }
    });

    let interval = ctx.store.snapshot().check_interval();
    runtime.spawn(async move {
        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let msg = match check_once(&ctx).await {
                Ok((_, Some(request))) => PollMsg::Notified(request),
                Ok((_, None)) => continue,
                Err(e) => {
                    warn!(error = %e, "notification check failed");
                    PollMsg::Error(format!("notification failed: {e}"))
                }
            };
            if tx.send(msg).is_err() {
                return;
            }
        }
    });

    let poller = Poller { refresh_tx };
    poller.refresh();
    (poller, rx)
}

/// One ingestion run followed by one notification check.
pub async fn check_once(ctx: &PollContext) -> anyhow::Result<(Vec<NewsItem>, Option<NotificationRequest>)> {
    let items = ctx.pipeline.run(Local::now()).await;
    let request = notify::check(&ctx.store, &items, ctx.notifier.as_ref())?;
    debug!(items = items.len(), notified = request.is_some(), "check complete");
    Ok((items, request))
}

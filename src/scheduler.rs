//! Background reminder dispatch loop.
//!
//! One long-lived task scans the store on a fixed tick for due, unsent tasks
//! and pushes them through the [`Notifier`]. The notifier call happens
//! outside the store's critical section (it may block for seconds on slow
//! external automation) and is bounded by a configurable timeout; a timeout
//! counts as a transient failure and is retried on the next tick.

use crate::notify::Notifier;
use crate::store::{MarkResult, SendOutcome, TaskStore};
use crate::types::Task;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Diagnostic recorded on tasks whose stored date/time no longer parses.
pub const INVALID_DUE_ERROR: &str = "Formato de data/hora inválido";

/// Delay before resuming after an unexpected scan failure.
const SCAN_FAILURE_BACKOFF: Duration = Duration::from_secs(10);

pub struct ReminderScheduler {
    store: TaskStore,
    notifier: Arc<dyn Notifier>,
    tick: Duration,
    notify_timeout: Duration,
}

impl ReminderScheduler {
    pub fn new(
        store: TaskStore,
        notifier: Arc<dyn Notifier>,
        tick: Duration,
        notify_timeout: Duration,
    ) -> Self {
        Self {
            store,
            notifier,
            tick,
            notify_timeout,
        }
    }

    /// Run until process shutdown. One bad tick never stops future ticks.
    pub async fn run(self) {
        info!(tick_secs = self.tick.as_secs(), "reminder scheduler started");
        let mut interval = tokio::time::interval(self.tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            if let Err(e) = self.scan().await {
                warn!(error = %e, "reminder scan failed");
                tokio::time::sleep(SCAN_FAILURE_BACKOFF).await;
            }
        }
    }

    /// One tick: snapshot the store, dispatch every due unsent task.
    pub async fn scan(&self) -> Result<()> {
        let now = chrono::Local::now().naive_local();
        let tasks = self.store.list()?;
        for task in tasks.into_iter().filter(|t| !t.sent) {
            let due = match task.due() {
                Ok(due) => due,
                Err(_) => {
                    self.store
                        .mark_outcome(&task, SendOutcome::Failed(INVALID_DUE_ERROR.to_string()))?;
                    continue;
                }
            };
            if due > now {
                continue;
            }
            self.deliver(&task).await?;
        }
        Ok(())
    }

    async fn deliver(&self, task: &Task) -> Result<()> {
        let message = render_message(task);
        info!(id = task.id, phone = %task.phone, "sending reminder");

        let outcome = match tokio::time::timeout(
            self.notify_timeout,
            self.notifier.send(&task.phone, &message),
        )
        .await
        {
            Ok(Ok(())) => SendOutcome::Delivered,
            Ok(Err(e)) => SendOutcome::Failed(e.to_string()),
            Err(_) => SendOutcome::Failed(format!(
                "envio excedeu o tempo limite de {}s",
                self.notify_timeout.as_secs()
            )),
        };

        match &outcome {
            SendOutcome::Delivered => {
                info!(id = task.id, phone = %task.phone, "reminder delivered")
            }
            SendOutcome::Failed(reason) => {
                warn!(id = task.id, phone = %task.phone, %reason, "reminder delivery failed")
            }
        }

        // The snapshot may be stale by now: a client can edit or remove the
        // task while the notifier call is in flight. The store drops the
        // write in both cases.
        match self.store.mark_outcome(task, outcome)? {
            MarkResult::StaleRevision => {
                debug!(id = task.id, "task edited during delivery; outcome dropped")
            }
            MarkResult::Missing => {
                debug!(id = task.id, "task removed during delivery; outcome dropped")
            }
            MarkResult::Applied | MarkResult::AlreadyRecorded => {}
        }
        Ok(())
    }
}

/// The message handed to the notifier, embedding due date, time, and
/// description.
pub fn render_message(task: &Task) -> String {
    format!(
        "📅 Lembrete: {} {}: \"{}\"",
        task.date, task.time, task.description
    )
}

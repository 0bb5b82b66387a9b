//! Outbound notification capability.
//!
//! The server only depends on `send(target, message)`; the actual transport
//! (messaging automation, gateway scripts) lives behind this trait. Failures
//! are recoverable: the scheduler records them on the task and retries on the
//! next tick.

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

/// Delivery failure reason, recorded on the task's `error` field.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct NotifyError(pub String);

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, target: &str, message: &str) -> Result<(), NotifyError>;
}

/// Runs a configured external command per reminder, with the target and the
/// message appended as the final two arguments. Exit status zero counts as
/// delivered; anything else (or a spawn failure) is a failure whose reason is
/// taken from stderr.
pub struct ExecNotifier {
    program: String,
    args: Vec<String>,
}

impl ExecNotifier {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

#[async_trait]
impl Notifier for ExecNotifier {
    async fn send(&self, target: &str, message: &str) -> Result<(), NotifyError> {
        let output = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .arg(target)
            .arg(message)
            .output()
            .await
            .map_err(|e| NotifyError(format!("falha ao executar {}: {}", self.program, e)))?;

        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        if stderr.is_empty() {
            Err(NotifyError(format!(
                "{} terminou com {}",
                self.program, output.status
            )))
        } else {
            Err(NotifyError(stderr.to_string()))
        }
    }
}

/// Logs the reminder instead of delivering it. Used when no notify command is
/// configured, so the scheduler path stays exercisable without a transport.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, target: &str, message: &str) -> Result<(), NotifyError> {
        info!(%target, %message, "reminder due (no notify command configured)");
        Ok(())
    }
}

//! Debounced autosave of a drawing session.
//!
//! A background task holds the latest pending snapshot and writes it once no
//! new snapshot has arrived for the debounce period. `flush` writes the
//! pending snapshot at once, for teardown paths such as a page being hidden.

use crate::models::{now_millis, CanvasDraftSnapshot, DraftKey};
use crate::services::drafts::DraftPersistence;
use crate::services::drawing::DrawingSession;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

enum Command {
    Schedule(CanvasDraftSnapshot),
    Flush(oneshot::Sender<()>),
    Shutdown(oneshot::Sender<()>),
}

pub struct DraftAutosaver {
    commands: mpsc::UnboundedSender<Command>,
    task: JoinHandle<()>,
    ttl: Duration,
    last_revision: Option<u64>,
}

impl DraftAutosaver {
    /// Spawn the autosave task for one draft. Must be called inside a Tokio
    /// runtime.
    pub fn spawn(persistence: DraftPersistence, key: DraftKey, debounce: Duration) -> Self {
        let ttl = persistence.ttl();
        let (commands, receiver) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(persistence, key, debounce, receiver));

        DraftAutosaver {
            commands,
            task,
            ttl,
            last_revision: None,
        }
    }

    /// Replace the pending snapshot and restart the debounce timer. Never
    /// blocks. The snapshot must already be stamped (see
    /// [`DrawingSession::snapshot`]); anything else is dropped at write time.
    pub fn schedule(&self, snapshot: CanvasDraftSnapshot) {
        if self.commands.send(Command::Schedule(snapshot)).is_err() {
            tracing::warn!("Autosave task has stopped, snapshot dropped");
        }
    }

    /// Schedule a snapshot of `session` if it changed since the last call.
    /// Returns whether one was scheduled.
    pub fn track(&mut self, session: &DrawingSession) -> bool {
        let revision = session.revision();
        if self.last_revision == Some(revision) {
            return false;
        }
        self.last_revision = Some(revision);
        self.schedule(session.snapshot(now_millis(), self.ttl));
        true
    }

    /// Write the pending snapshot now and wait for the write to finish.
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.commands.send(Command::Flush(ack)).is_ok() {
            let _ = done.await;
        }
    }

    /// Flush and stop the task.
    pub async fn shutdown(self) {
        let (ack, done) = oneshot::channel();
        if self.commands.send(Command::Shutdown(ack)).is_ok() {
            let _ = done.await;
        }
        if let Err(e) = self.task.await {
            tracing::warn!("Autosave task ended abnormally: {}", e);
        }
    }
}

async fn write_pending(
    persistence: &DraftPersistence,
    key: &DraftKey,
    pending: &mut Option<CanvasDraftSnapshot>,
) {
    if let Some(snapshot) = pending.take() {
        persistence.save(key, &snapshot).await;
    }
}

async fn run(
    persistence: DraftPersistence,
    key: DraftKey,
    debounce: Duration,
    mut commands: mpsc::UnboundedReceiver<Command>,
) {
    let mut pending: Option<CanvasDraftSnapshot> = None;
    let mut deadline: Option<Instant> = None;

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(Command::Schedule(snapshot)) => {
                    pending = Some(snapshot);
                    deadline = Some(Instant::now() + debounce);
                }
                Some(Command::Flush(ack)) => {
                    write_pending(&persistence, &key, &mut pending).await;
                    deadline = None;
                    let _ = ack.send(());
                }
                Some(Command::Shutdown(ack)) => {
                    write_pending(&persistence, &key, &mut pending).await;
                    let _ = ack.send(());
                    break;
                }
                // Every handle dropped without shutdown
                None => {
                    write_pending(&persistence, &key, &mut pending).await;
                    break;
                }
            },
            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                deadline = None;
                write_pending(&persistence, &key, &mut pending).await;
            }
        }
    }

    tracing::debug!("Autosave for {} stopped", key.storage_key());
}

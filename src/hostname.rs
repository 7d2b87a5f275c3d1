use std::{
    io,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use tokio::{fs, io::AsyncWriteExt, process::Command, sync::mpsc};

pub const HOSTNAME_FILE: &str = "/etc/hostname";
pub const HOSTNAME_BIN: &str = "/bin/hostname";

/// Where the hostname lives on disk and which binary applies it to the
/// running system.
#[derive(Debug, Clone)]
pub struct Paths {
    pub file: PathBuf,
    pub binary: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            file: PathBuf::from(HOSTNAME_FILE),
            binary: PathBuf::from(HOSTNAME_BIN),
        }
    }
}

/// How a finished apply command is reported. Some firmwares report success
/// no matter what the command exited with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompletionReport {
    #[default]
    ExitStatus,
    AlwaysApplied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyState {
    Idle,
    WritePersisted,
    ApplyPending,
    Applied,
    Failed,
}

/// Signals delivered to whoever holds the receiver side of the applier.
/// Per successful submit: `Started`, then exactly one of the other two.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyEvent {
    Started,
    Applied,
    Failed { reason: String },
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("hostname file does not exist: {0:?}")]
    NotAvailable(PathBuf),

    #[error("hostname file I/O failed: {file:?}")]
    Persistence {
        file: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug)]
pub struct Applier {
    paths: Paths,
    report: CompletionReport,
    state: Arc<Mutex<ApplyState>>,
    events: mpsc::UnboundedSender<ApplyEvent>,
}

impl Applier {
    pub fn new(
        paths: Paths,
        report: CompletionReport,
    ) -> (Self, mpsc::UnboundedReceiver<ApplyEvent>) {
        let (events, events_rx) = mpsc::unbounded_channel();
        let selph = Self {
            paths,
            report,
            state: Arc::new(Mutex::new(ApplyState::Idle)),
            events,
        };
        (selph, events_rx)
    }

    /// Whether changing the hostname can be offered at all. The menu entry
    /// is hidden when the file is missing.
    pub fn check_available(&self) -> bool {
        self.paths.file.try_exists().is_ok_and(|exists| exists)
    }

    pub fn state(&self) -> ApplyState {
        *self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub async fn read_current(&self) -> Result<String, Error> {
        fs::read_to_string(&self.paths.file).await.map_err(|error| {
            if error.kind() == io::ErrorKind::NotFound {
                Error::NotAvailable(self.paths.file.clone())
            } else {
                Error::Persistence {
                    file: self.paths.file.clone(),
                    source: error,
                }
            }
        })
    }

    /// Persists the new hostname and launches the apply command. Does not
    /// wait for it - the result arrives as events on the receiver.
    ///
    /// An empty string means the user backed out of the edit: no write, no
    /// launch, no events.
    pub async fn submit(&self, hostname: &str) -> Result<(), Error> {
        if hostname.is_empty() {
            tracing::debug!("Empty hostname submitted. Ignoring.");
            return Ok(());
        }
        if let Err(source) = self.persist(hostname).await {
            self.set_state(ApplyState::Failed);
            tracing::error!(
                error = ?source,
                file = ?self.paths.file,
                "Failed to persist hostname."
            );
            return Err(Error::Persistence {
                file: self.paths.file.clone(),
                source,
            });
        }
        self.set_state(ApplyState::WritePersisted);
        self.launch();
        Ok(())
    }

    async fn persist(&self, hostname: &str) -> io::Result<()> {
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.paths.file)
            .await?;
        file.write_all(hostname.as_bytes()).await?;
        // Flush, then sync, then close. The content must be durable before
        // the apply command reads the file back.
        file.flush().await?;
        file.sync_all().await?;
        drop(file);
        Ok(())
    }

    fn launch(&self) {
        tracing::info!(
            binary = ?self.paths.binary,
            file = ?self.paths.file,
            "Launching the apply command."
        );
        let spawned = Command::new(&self.paths.binary)
            .arg("-F")
            .arg(&self.paths.file)
            .spawn();
        let child = match spawned {
            Err(error) => {
                tracing::error!(
                    ?error,
                    binary = ?self.paths.binary,
                    "Failed to launch the apply command."
                );
                self.set_state(ApplyState::Failed);
                notify(
                    &self.events,
                    ApplyEvent::Failed {
                        reason: format!(
                            "failed to launch {:?}: {error}",
                            self.paths.binary
                        ),
                    },
                );
                return;
            }
            Ok(child) => child,
        };
        self.set_state(ApplyState::ApplyPending);
        notify(&self.events, ApplyEvent::Started);
        let pending = PendingApply {
            child,
            report: self.report,
        };
        let state = self.state.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let event = pending.finish().await;
            let next = match event {
                ApplyEvent::Applied => ApplyState::Applied,
                _ => ApplyState::Failed,
            };
            store(&state, next);
            notify(&events, event);
        });
    }

    fn set_state(&self, next: ApplyState) {
        store(&self.state, next);
    }
}

/// A launched apply command that has not exited yet. At most one exists per
/// applier: the UI blocks further input behind the waiting indicator.
#[derive(Debug)]
struct PendingApply {
    child: tokio::process::Child,
    report: CompletionReport,
}

impl PendingApply {
    async fn finish(mut self) -> ApplyEvent {
        match self.child.wait().await {
            Err(error) => ApplyEvent::Failed {
                reason: format!("failed to wait for the apply command: {error}"),
            },
            Ok(status) => {
                tracing::debug!(?status, "Apply command exited.");
                match self.report {
                    CompletionReport::AlwaysApplied => ApplyEvent::Applied,
                    CompletionReport::ExitStatus if status.success() => {
                        ApplyEvent::Applied
                    }
                    CompletionReport::ExitStatus => ApplyEvent::Failed {
                        reason: format!("apply command exited with {status}"),
                    },
                }
            }
        }
    }
}

fn store(state: &Mutex<ApplyState>, next: ApplyState) {
    let mut state =
        state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    *state = next;
}

fn notify(events: &mpsc::UnboundedSender<ApplyEvent>, event: ApplyEvent) {
    if events.send(event).is_err() {
        tracing::warn!("Apply event dropped. The listener went away.");
    }
}

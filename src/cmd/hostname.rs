use std::path::PathBuf;

use anyhow::anyhow;

use crate::hostname::{
    Applier, ApplyEvent, CompletionReport, Paths, HOSTNAME_BIN, HOSTNAME_FILE,
};

#[derive(clap::Args, Debug, Clone)]
pub struct Cmd {
    /// File holding the persisted hostname.
    #[clap(long, default_value = HOSTNAME_FILE)]
    file: PathBuf,

    /// Binary invoked to apply the persisted hostname.
    #[clap(long, default_value = HOSTNAME_BIN)]
    binary: PathBuf,

    /// Report success regardless of the apply command's exit status.
    #[clap(long, default_value_t = false)]
    ignore_exit_status: bool,

    #[clap(subcommand)]
    op: Op,
}

#[derive(Debug, Clone, clap::Subcommand)]
enum Op {
    /// Print the persisted hostname.
    Show,

    /// Persist a new hostname and apply it to the running system.
    Set { hostname: String },
}

impl Cmd {
    pub async fn run(&self) -> anyhow::Result<()> {
        let paths = Paths {
            file: self.file.clone(),
            binary: self.binary.clone(),
        };
        let report = if self.ignore_exit_status {
            CompletionReport::AlwaysApplied
        } else {
            CompletionReport::ExitStatus
        };
        let (applier, mut events) = Applier::new(paths, report);
        match &self.op {
            Op::Show => {
                let current = applier.read_current().await?;
                println!("{}", current.trim_end());
                Ok(())
            }
            Op::Set { hostname } => {
                applier.submit(hostname).await?;
                // Closes the channel once the pending apply (if any) is the
                // only sender left, so the loop below cannot hang on an
                // empty submit.
                drop(applier);
                while let Some(event) = events.recv().await {
                    match event {
                        ApplyEvent::Started => {
                            tracing::info!("Apply started. Waiting.");
                        }
                        ApplyEvent::Applied => {
                            println!("Hostname has been applied.");
                            return Ok(());
                        }
                        ApplyEvent::Failed { reason } => {
                            return Err(anyhow!(
                                "hostname apply failed: {reason}"
                            ));
                        }
                    }
                }
                Ok(())
            }
        }
    }
}

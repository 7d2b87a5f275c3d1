use std::path::PathBuf;

use tokio::{
    io::{AsyncBufReadExt, BufReader, Lines, Stdin},
    sync::mpsc,
};

use crate::{
    hostname::{
        Applier, ApplyEvent, CompletionReport, Paths, HOSTNAME_BIN,
        HOSTNAME_FILE,
    },
    menu,
    shell::{ConsoleShell, Shell},
};

#[derive(clap::Args, Debug, Clone)]
pub struct Cmd {
    /// File holding the persisted hostname.
    #[clap(long, default_value = HOSTNAME_FILE)]
    hostname_file: PathBuf,

    /// Binary invoked to apply the persisted hostname.
    #[clap(long, default_value = HOSTNAME_BIN)]
    hostname_bin: PathBuf,

    /// Report success regardless of the apply command's exit status.
    #[clap(long, default_value_t = false)]
    ignore_exit_status: bool,
}

impl Cmd {
    pub async fn run(&self) -> anyhow::Result<()> {
        let paths = Paths {
            file: self.hostname_file.clone(),
            binary: self.hostname_bin.clone(),
        };
        let report = if self.ignore_exit_status {
            CompletionReport::AlwaysApplied
        } else {
            CompletionReport::ExitStatus
        };
        let (applier, mut events) = Applier::new(paths, report);
        let mut shell = ConsoleShell::default();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let entries = menu::entries(applier.check_available());
            println!();
            println!("MountManager");
            for (index, entry) in entries.iter().enumerate() {
                println!(
                    "  {}) {:<30} {}",
                    index + 1,
                    entry.title,
                    entry.description
                );
            }
            prompt("Select an entry (q to close): ")?;
            let Some(line) = lines.next_line().await? else {
                break;
            };
            let choice = line.trim();
            if choice.is_empty() || choice.eq_ignore_ascii_case("q") {
                break;
            }
            let entry = choice
                .parse::<usize>()
                .ok()
                .and_then(|number| number.checked_sub(1))
                .and_then(|index| entries.get(index).copied());
            let Some(entry) = entry else {
                println!("No such entry: {choice}");
                continue;
            };
            match entry.action.screen() {
                Some(screen) => shell.open(screen),
                None => {
                    host_edit(&applier, &mut events, &mut shell, &mut lines)
                        .await?;
                }
            }
        }
        shell.close();
        Ok(())
    }
}

async fn host_edit(
    applier: &Applier,
    events: &mut mpsc::UnboundedReceiver<ApplyEvent>,
    shell: &mut impl Shell,
    lines: &mut Lines<BufReader<Stdin>>,
) -> anyhow::Result<()> {
    let current = match applier.read_current().await {
        Ok(current) => current,
        Err(error) => {
            shell.notify(&format!(
                "Failed to read the current hostname: {error}"
            ));
            return Ok(());
        }
    };
    println!("Current hostname: {}", current.trim_end());
    prompt("Enter new hostname (leave empty to cancel): ")?;
    let Some(line) = lines.next_line().await? else {
        return Ok(());
    };
    apply_flow(applier, events, shell, line.trim()).await;
    Ok(())
}

/// Submits the new hostname and walks the shell through the waiting
/// indicator until the terminal event arrives.
async fn apply_flow(
    applier: &Applier,
    events: &mut mpsc::UnboundedReceiver<ApplyEvent>,
    shell: &mut impl Shell,
    hostname: &str,
) {
    match applier.submit(hostname).await {
        Err(error) => {
            shell.notify(&format!("Failed to save the new hostname: {error}"));
        }
        Ok(()) if hostname.is_empty() => {}
        Ok(()) => loop {
            match events.recv().await {
                Some(ApplyEvent::Started) => {
                    shell.show_waiting(
                        "Please wait while the new hostname is being \
                        applied...",
                    );
                }
                Some(ApplyEvent::Applied) => {
                    shell.hide_waiting();
                    shell.notify("Hostname has been applied.");
                    break;
                }
                Some(ApplyEvent::Failed { reason }) => {
                    shell.hide_waiting();
                    shell.notify(&format!(
                        "Failed to apply the new hostname: {reason}"
                    ));
                    break;
                }
                None => break,
            }
        },
    }
}

fn prompt(text: &str) -> std::io::Result<()> {
    use std::io::Write;

    print!("{text}");
    std::io::stdout().flush()
}

#[cfg(test)]
mod tests {
    use crate::shell::Screen;

    use super::*;

    #[derive(Debug, Default)]
    struct RecordingShell {
        calls: Vec<String>,
    }

    impl Shell for RecordingShell {
        fn open(&mut self, screen: Screen) {
            self.calls.push(format!("open:{screen:?}"));
        }

        fn close(&mut self) {
            self.calls.push("close".to_string());
        }

        fn show_waiting(&mut self, _message: &str) {
            self.calls.push("wait".to_string());
        }

        fn hide_waiting(&mut self) {
            self.calls.push("unwait".to_string());
        }

        fn notify(&mut self, message: &str) {
            self.calls.push(format!("notice:{message}"));
        }
    }

    fn applier_in(
        dir: &std::path::Path,
        binary: &str,
    ) -> (Applier, mpsc::UnboundedReceiver<ApplyEvent>) {
        let paths = Paths {
            file: dir.join("hostname"),
            binary: PathBuf::from(binary),
        };
        Applier::new(paths, CompletionReport::ExitStatus)
    }

    #[tokio::test]
    async fn apply_flow_reports_success() {
        let tmp = tempfile::tempdir().unwrap();
        let (applier, mut events) = applier_in(tmp.path(), "/bin/true");
        let mut shell = RecordingShell::default();
        apply_flow(&applier, &mut events, &mut shell, "newbox").await;
        assert_eq!(
            shell.calls,
            vec!["wait", "unwait", "notice:Hostname has been applied."]
        );
    }

    #[tokio::test]
    async fn apply_flow_reports_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let (applier, mut events) = applier_in(tmp.path(), "/bin/false");
        let mut shell = RecordingShell::default();
        apply_flow(&applier, &mut events, &mut shell, "newbox").await;
        assert_eq!(shell.calls.len(), 3);
        assert_eq!(shell.calls[0], "wait");
        assert_eq!(shell.calls[1], "unwait");
        assert!(shell.calls[2].starts_with("notice:Failed to apply"));
    }

    #[tokio::test]
    async fn apply_flow_cancelled_edit_touches_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let (applier, mut events) = applier_in(tmp.path(), "/bin/true");
        let mut shell = RecordingShell::default();
        apply_flow(&applier, &mut events, &mut shell, "").await;
        assert!(shell.calls.is_empty());
        assert!(!applier.check_available());
    }

    #[tokio::test]
    async fn apply_flow_reports_write_failures() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = Paths {
            file: tmp.path().join("no-such-dir").join("hostname"),
            binary: PathBuf::from("/bin/true"),
        };
        let (applier, mut events) =
            Applier::new(paths, CompletionReport::ExitStatus);
        let mut shell = RecordingShell::default();
        apply_flow(&applier, &mut events, &mut shell, "newbox").await;
        assert_eq!(shell.calls.len(), 1);
        assert!(shell.calls[0].starts_with("notice:Failed to save"));
    }
}

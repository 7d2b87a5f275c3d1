use std::time::Duration;

use futures::{stream, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::nfs;

#[derive(clap::Args, Debug, Clone)]
pub struct Cmd {
    /// Give up on a server after this many seconds.
    #[clap(short, long, default_value_t = 10)]
    timeout: u64,

    /// Print the export lists as JSON.
    #[clap(short, long, default_value_t = false)]
    json: bool,

    /// NFS servers to query.
    hosts: Vec<String>,
}

#[derive(serde::Serialize, Debug)]
struct HostExports {
    host: String,
    exports: Vec<nfs::Export>,
}

impl Cmd {
    pub async fn run(&self) -> anyhow::Result<()> {
        let timeout = Duration::from_secs(self.timeout);
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        stream::iter(self.hosts.clone())
            .for_each_concurrent(None, |host| {
                let results_tx = results_tx.clone();
                async move {
                    match nfs::exports(&host, timeout).await {
                        Ok(exports) => {
                            results_tx
                                .send(HostExports { host, exports })
                                .unwrap_or_else(|_| {
                                    unreachable!(
                                        "results_rx dropped while \
                                        results_tx is still in use"
                                    )
                                });
                        }
                        Err(error) => {
                            tracing::error!(
                                ?host,
                                ?error,
                                "Export query failed."
                            );
                        }
                    }
                }
            })
            .await;
        drop(results_tx);
        let mut results: Vec<HostExports> =
            UnboundedReceiverStream::new(results_rx).collect().await;
        results.sort_by(|a, b| a.host.cmp(&b.host));
        if self.json {
            println!("{}", serde_json::to_string_pretty(&results)?);
        } else {
            for HostExports { host, exports } in &results {
                for export in exports {
                    if export.groups.is_empty() {
                        println!("{host}:{}", export.dir);
                    } else {
                        println!(
                            "{host}:{} {}",
                            export.dir,
                            export.groups.join(",")
                        );
                    }
                }
            }
        }
        Ok(())
    }
}

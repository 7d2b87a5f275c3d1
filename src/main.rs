use clap::Parser;
use tracing::{info_span, Instrument};

#[derive(Parser, Debug)]
struct Cli {
    /// Specify log level.
    #[clap(short, long = "log", default_value_t = tracing::Level::INFO)]
    log_level: tracing::Level,

    #[clap(subcommand)]
    command: Cmd,
}

#[derive(Debug, clap::Subcommand)]
enum Cmd {
    /// Run the MountManager menu screen on the console.
    Menu(mount_manager::cmd::menu::Cmd),

    /// Show or set the persisted system hostname.
    Hostname(mount_manager::cmd::hostname::Cmd),

    /// List the exports of NFS servers.
    Exports(mount_manager::cmd::exports::Cmd),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    mount_manager::tracing_init(Some(cli.log_level))?;
    tracing::debug!(?cli, "Starting");
    match cli.command {
        Cmd::Menu(cmd) => {
            cmd.run().instrument(info_span!("menu")).await?;
        }
        Cmd::Hostname(cmd) => {
            cmd.run().instrument(info_span!("hostname")).await?;
        }
        Cmd::Exports(cmd) => {
            cmd.run().instrument(info_span!("exports")).await?;
        }
    }
    Ok(())
}

pub mod cmd;
pub mod hostname;
pub mod menu;
pub mod nfs;
pub mod shell;

pub fn tracing_init(level: Option<tracing::Level>) -> anyhow::Result<()> {
    use tracing_subscriber::{
        fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
    };

    if let Some(level) = level {
        let layer_stderr = fmt::Layer::new().with_writer(std::io::stderr).with_filter(
            EnvFilter::from_default_env().add_directive(level.into()),
        );
        tracing_subscriber::registry().with(layer_stderr).try_init()?;
    }
    Ok(())
}

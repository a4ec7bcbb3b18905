use anyhow::Result;
use renderer::{Renderer, RendererConfig};
use tracing_subscriber::EnvFilter;

pub fn run() -> Result<()> {
    let config = RendererConfig::default();
    tracing::debug!(
        width = config.surface_size.0,
        height = config.surface_size.1,
        title = %config.title,
        "starting hello-triangle"
    );
    let mut renderer = Renderer::new(config);
    renderer.run()
}

/// Logs go to stderr; stdout is reserved for the adapter summary lines.
pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

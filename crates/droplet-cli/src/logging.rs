use crate::error::{CliError, Result};
use std::fs::File;
use std::path::Path;
use tracing_subscriber::{Layer, Registry, filter::LevelFilter, fmt, prelude::*};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn level_filter(verbosity: u8, quiet: bool) -> LevelFilter {
    match (quiet, verbosity) {
        (true, _) => LevelFilter::ERROR,
        (false, 0) => LevelFilter::WARN,
        (false, 1) => LevelFilter::INFO,
        (false, 2) => LevelFilter::DEBUG,
        (false, _) => LevelFilter::TRACE,
    }
}

/// Plain-text layer for `--log-file`, recording targets and thread ids.
fn file_layer(path: &Path) -> Result<BoxedLayer> {
    let file = File::create(path).map_err(CliError::Io)?;
    Ok(fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .boxed())
}

/// Installs the global subscriber. Both sinks share one level filter; `-q`
/// keeps errors visible.
pub fn setup_logging(verbosity: u8, quiet: bool, log_file: Option<&Path>) -> Result<()> {
    let mut layers: Vec<BoxedLayer> = vec![
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .compact()
            .boxed(),
    ];
    if let Some(path) = log_file {
        layers.push(file_layer(path)?);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(level_filter(verbosity, quiet))
        .try_init()
        .map_err(|e| CliError::Other(anyhow::anyhow!("Failed to install logger: {}", e)))
}

use crate::utils::parser::ParseError;
use dropletbuilder::core::lattice::LatticeError;
use dropletbuilder::core::templates::TemplateError;
use dropletbuilder::engine::config::ValidationError;
use dropletbuilder::engine::error::EngineError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Invalid droplet configuration: {0}")]
    Validation(#[from] ValidationError),

    #[error("Failed to load fluid template: {0}")]
    Template(#[from] TemplateError),

    #[error("Failed to load lattice: {0}")]
    Lattice(#[from] LatticeError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse file '{path}': {source}", path = path.display())]
    FileParsing {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to write '{path}': {source}", path = path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<ParseError> for CliError {
    fn from(e: ParseError) -> Self {
        CliError::Argument(e.to_string())
    }
}

use thiserror::Error;

use crate::core::fill::FillError;
use crate::core::lattice::LatticeError;

/// Failures that can only surface while building geometry from a valid
/// configuration.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Substrate generation failed: {source}")]
    Substrate {
        #[from]
        source: LatticeError,
    },

    #[error("Filling the droplet sphere failed: {source}")]
    Fill {
        #[from]
        source: FillError,
    },
}

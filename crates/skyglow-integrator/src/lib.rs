mod config;
pub use config::*;
mod radiance;
pub use radiance::*;
mod source_integrator;
pub use source_integrator::*;

use skyglow_source::SourceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IntegratorError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("failed to create the worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("line of sight {losidx} references grid point {grid}, the atmosphere has {num_geometry}")]
    GridIndexOutOfRange {
        losidx: usize,
        grid: usize,
        num_geometry: usize,
    },
}

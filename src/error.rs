use std::error::Error as StdError;
use std::io;

use thiserror::Error;

use crate::file::FileError;
use crate::resources::ResourceError;

/// Errors that abort an annotation run
#[derive(Debug, Error)]
pub enum M2Error {
    /// A language resource could not be loaded
    #[error("failed to load resources: {0}")]
    Resource(#[from] ResourceError),

    /// Annotating, aligning or classifying one sentence pair failed
    #[error("sentence {index}: {source}")]
    Annotation {
        index: usize,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    /// Input files differ in length (strict mode only)
    #[error("input length mismatch: {originals} original sentence(s) but {references} reference sentence(s)")]
    InputLengthMismatch { originals: usize, references: usize },

    #[error("failed to start worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    File(#[from] FileError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl M2Error {
    pub fn annotation(index: usize, source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        M2Error::Annotation {
            index,
            source: source.into(),
        }
    }
}

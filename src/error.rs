//! Error taxonomy of the analysis engine.
//!
//! Per-row defects in input files are tolerated (logged and skipped by the
//! reader); everything structural surfaces through [`Error`]. The engine
//! never substitutes defaults for invalid required parameters.

use std::path::PathBuf;

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The input file yielded no usable series values.
    #[error("no series values could be read from '{path}'")]
    EmptySeries { path: PathBuf },

    /// A configuration the optimised engine has no kernel for.
    #[error("unsupported configuration: {reason}")]
    Unsupported { reason: String },

    /// Missing devices, out-of-range device indices, worker pool failures.
    #[error("device error: {reason}")]
    Device { reason: String },

    /// Parameter outside its domain (`m < 1`, `τ < 1`, `N < 1`, minimum
    /// line lengths `< 1`, inverted corridor radii, embedding range overrun).
    #[error("domain error: {reason}")]
    Domain { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),
}

impl Error {
    pub(crate) fn unsupported(reason: impl Into<String>) -> Self {
        Error::Unsupported {
            reason: reason.into(),
        }
    }

    pub(crate) fn device(reason: impl Into<String>) -> Self {
        Error::Device {
            reason: reason.into(),
        }
    }

    pub(crate) fn domain(reason: impl Into<String>) -> Self {
        Error::Domain {
            reason: reason.into(),
        }
    }
}

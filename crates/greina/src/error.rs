//! Errors raised while activating, configuring, and feeding the fractal.
//!
//! Only activation can fail. Once a fractal is active, ticking never returns
//! an error: a missing mesh degrades to zeroed draw arguments and is reported
//! through the log as [`FractalError::MissingMeshBinding`].

use std::fmt;

/// Errors that can occur in the fractal system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FractalError {
    /// Depth outside the supported range, or a sub-mesh the bound mesh does
    /// not have. Activation is rejected before anything is allocated.
    InvalidConfiguration(String),
    /// The backend could not allocate a buffer of the requested size.
    ResourceExhaustion(String),
    /// No mesh is bound. Draws are submitted with zeroed arguments.
    MissingMeshBinding,
    /// A config file could not be read or parsed.
    ConfigLoad(String),
}

impl fmt::Display for FractalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FractalError::InvalidConfiguration(e) => write!(f, "invalid fractal configuration: {e}"),
            FractalError::ResourceExhaustion(e) => write!(f, "buffer allocation failed: {e}"),
            FractalError::MissingMeshBinding => {
                write!(f, "no mesh bound, fractal levels will draw nothing")
            }
            FractalError::ConfigLoad(e) => write!(f, "config load failed: {e}"),
        }
    }
}

impl std::error::Error for FractalError {}

/// Shorthand for results in this crate.
pub type Result<T> = std::result::Result<T, FractalError>;

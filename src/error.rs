use std::path::PathBuf;

use thiserror::Error;

use crate::sys::SysError;

const MODULE_HINT: &str =
    "place the reactor model library next to the executable or set REACTOR_MODEL_DIR";

#[derive(Error, Debug)]
pub enum ReactorError {
    /// Bad sweep bounds or steps. Detected before any native call.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// No candidate library file exists in the module directory.
    #[error("Reactor model library not found in {} (tried: {})", .dir.display(), .tried.join(", "))]
    ModuleNotFound { dir: PathBuf, tried: Vec<String> },

    /// A candidate exists but the OS loader rejected every one of them.
    #[error("Reactor model library could not be loaded: {0}")]
    ModuleLoadFailed(String),

    /// The library loaded but does not export the expected routine.
    #[error("Symbol {symbol} not exported by {}", .module.display())]
    SymbolResolution { symbol: String, module: PathBuf },

    /// The native routine returned a non-finite value.
    #[error("Native computation failed at Q={q}, CA_in={ca_in}: returned {value}")]
    NativeCall { q: f64, ca_in: f64, value: f64 },

    #[error("Sweep cancelled after {completed} points")]
    Cancelled { completed: usize },

    #[error("Raw material not found: {0}")]
    RawMaterialNotFound(String),

    #[error("Raw material already exists: {0}")]
    DuplicateRawMaterial(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ReactorError {
    /// `true` when the native module itself is unusable, as opposed to
    /// a single grid point failing.
    pub fn is_setup_error(&self) -> bool {
        matches!(
            self,
            Self::ModuleNotFound { .. } | Self::ModuleLoadFailed(_) | Self::SymbolResolution { .. }
        )
    }

    /// Guidance for the operator, where one applies.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::ModuleNotFound { .. } | Self::ModuleLoadFailed(_) => Some(MODULE_HINT),
            Self::SymbolResolution { .. } => {
                Some("the library must export `double compute_CB(double, double, double, double, double)`")
            }
            Self::Configuration(_) => Some("dQ and dCAin must be > 0 and each minimum must not exceed its maximum"),
            _ => None,
        }
    }
}

impl From<SysError> for ReactorError {
    fn from(e: SysError) -> Self {
        match e {
            SysError::NotFound { dir, tried } => Self::ModuleNotFound { dir, tried },
            SysError::LoadFailed(msg) => Self::ModuleLoadFailed(msg),
            SysError::SymbolNotFound { symbol, module } => Self::SymbolResolution { symbol, module },
        }
    }
}

pub type Result<T> = std::result::Result<T, ReactorError>;

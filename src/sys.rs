//! Low-level FFI binding for the reactor model module.
//!
//! The module is loaded at runtime via [`libloading`] from one
//! directory, and its single export is resolved once into a typed
//! function pointer.

use std::fmt;
use std::os::raw::c_double;
use std::path::{Path, PathBuf};

use libloading::Library;

/// Name of the exported computation routine (NUL-terminated).
pub const COMPUTE_CB_SYMBOL: &[u8] = b"compute_CB\0";

// ── Error type ──────────────────────────────────────────────────────
#[derive(Debug)]
pub enum SysError {
    /// None of the candidate files exist in the module directory.
    NotFound { dir: PathBuf, tried: Vec<String> },
    /// At least one candidate exists but the OS loader rejected it.
    LoadFailed(String),
    /// The library loaded but does not export the routine.
    SymbolNotFound { symbol: String, module: PathBuf },
}

impl fmt::Display for SysError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { dir, tried } => write!(
                f,
                "No reactor model library found in {} (tried: {tried:?})",
                dir.display()
            ),
            Self::LoadFailed(msg) => write!(f, "Reactor model library load failed: {msg}"),
            Self::SymbolNotFound { symbol, module } => write!(
                f,
                "Symbol {symbol} not found in {}",
                module.display()
            ),
        }
    }
}

impl std::error::Error for SysError {}

// ── Platform strategy table ─────────────────────────────────────────

/// Platform family used to pick candidate library file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Darwin,
    Other,
}

impl Platform {
    /// Platform of the running binary.
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::Darwin
        } else {
            Self::Other
        }
    }

    /// Map an identifier such as `"win32"`, `"darwin"` or `"linux"`.
    pub fn from_identifier(id: &str) -> Self {
        let id = id.trim().to_ascii_lowercase();
        if id.starts_with("win") {
            Self::Windows
        } else if id == "darwin" || id == "macos" {
            Self::Darwin
        } else {
            Self::Other
        }
    }

    /// Candidate file names, in priority order.
    pub fn candidates(self) -> &'static [&'static str] {
        match self {
            Self::Windows => &["reactor_model.dll"],
            Self::Darwin => &["libreactor_model.dylib"],
            Self::Other => &["libreactor_model.so", "reactor_model.so"],
        }
    }
}

// ── Function pointer type ───────────────────────────────────────────

/// `compute_CB(Q, CA_in, k1, k2, Vr) -> CB`
type FnComputeCb =
    unsafe extern "C" fn(c_double, c_double, c_double, c_double, c_double) -> c_double;

// ── Dynamic library wrapper ─────────────────────────────────────────

/// A loaded reactor model library with its routine pre-resolved.
pub struct ReactorLibrary {
    /// Must outlive `fn_compute_cb`.
    _lib: Library,
    path: PathBuf,
    fn_compute_cb: FnComputeCb,
}

impl ReactorLibrary {
    /// Load the first existing candidate from `dir`.
    ///
    /// A candidate that exists but cannot be loaded does not stop the
    /// search; the next one is tried. No system search path is used.
    pub fn load_from_dir(dir: &Path, platform: Platform) -> Result<Self, SysError> {
        let candidates = platform.candidates();
        let mut errors = Vec::new();

        for name in candidates {
            let full = dir.join(name);
            if !full.exists() {
                tracing::debug!(candidate = %full.display(), "reactor model candidate absent");
                continue;
            }
            // SAFETY: loading runs the library's initialisers; the module
            // directory is operator-controlled.
            match unsafe { Library::new(&full) } {
                Ok(lib) => return Self::resolve(lib, full),
                Err(e) => errors.push(format!("{}: {e}", full.display())),
            }
        }

        if errors.is_empty() {
            Err(SysError::NotFound {
                dir: dir.to_path_buf(),
                tried: candidates.iter().map(|c| c.to_string()).collect(),
            })
        } else {
            Err(SysError::LoadFailed(format!(
                "reactor model library found but could not be loaded:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }

    fn resolve(lib: Library, path: PathBuf) -> Result<Self, SysError> {
        // SAFETY: the type alias matches the documented five-double-in,
        // one-double-out C ABI of compute_CB.
        let sym: libloading::Symbol<FnComputeCb> =
            unsafe { lib.get(COMPUTE_CB_SYMBOL) }.map_err(|_| SysError::SymbolNotFound {
                symbol: symbol_display(COMPUTE_CB_SYMBOL),
                module: path.clone(),
            })?;
        let fn_compute_cb = *sym;
        Ok(Self {
            _lib: lib,
            path,
            fn_compute_cb,
        })
    }

    /// File the library was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Call `compute_CB`. The result is returned unmodified.
    pub fn compute_cb(&self, q: f64, ca_in: f64, k1: f64, k2: f64, vr: f64) -> f64 {
        // SAFETY: plain by-value doubles, no pointers cross the boundary.
        unsafe { (self.fn_compute_cb)(q, ca_in, k1, k2, vr) }
    }
}

fn symbol_display(name: &[u8]) -> String {
    String::from_utf8_lossy(&name[..name.len().saturating_sub(1)]).to_string()
}

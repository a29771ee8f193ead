//! Runtime configuration of the native binding.
//!
//! Values come from the process environment, optionally seeded from a
//! `.env` file found in the working directory or next to the executable.

use std::env;
use std::path::PathBuf;
use std::sync::Once;

use crate::sys::Platform;

/// Overrides the directory the reactor model library is loaded from.
pub const ENV_MODULE_DIR: &str = "REACTOR_MODEL_DIR";
/// `1` / `true` declares `compute_CB` safe for concurrent calls.
pub const ENV_REENTRANT: &str = "REACTOR_MODEL_REENTRANT";

/// Where and how to load the reactor model library.
#[derive(Debug, Clone, PartialEq)]
pub struct BindingConfig {
    /// The single directory searched for candidate files.
    pub module_dir: PathBuf,
    /// Selects the candidate file names.
    pub platform: Platform,
    /// Serialize native calls behind one lock.
    pub serialize_calls: bool,
}

impl BindingConfig {
    /// Load from `dir` for the current platform, with serialized calls.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            module_dir: dir.into(),
            platform: Platform::current(),
            serialize_calls: true,
        }
    }

    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn serialize_calls(mut self, serialize: bool) -> Self {
        self.serialize_calls = serialize;
        self
    }

    /// Build from the environment (and `.env`), defaulting to the
    /// directory of the running executable.
    pub fn from_env() -> Self {
        load_dotenv();

        let module_dir = env::var_os(ENV_MODULE_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(application_dir);
        let reentrant = env::var(ENV_REENTRANT)
            .map(|v| parse_flag(&v))
            .unwrap_or(false);

        Self::new(module_dir).serialize_calls(!reentrant)
    }
}

/// Directory containing the running executable, or `.` if unknown.
pub fn application_dir() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn load_dotenv() {
    static DOTENV_INIT: Once = Once::new();
    DOTENV_INIT.call_once(|| {
        if dotenvy::dotenv().is_ok() {
            return;
        }
        let p = application_dir().join(".env");
        if p.exists() {
            let _ = dotenvy::from_path(&p);
        }
    });
}

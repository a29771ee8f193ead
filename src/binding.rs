use std::path::Path;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use crate::config::BindingConfig;
use crate::error::*;
use crate::sys::ReactorLibrary;

// ── Model seam ──────────────────────────────────────────────────────

/// Anything that maps `(Q, CA_in, k1, k2, Vr)` to an output concentration.
///
/// The sweep engine only talks to this trait, so the native module can
/// be swapped for a stub in tests.
pub trait ReactorModel {
    fn compute_cb(&self, q: f64, ca_in: f64, k1: f64, k2: f64, vr: f64) -> Result<f64>;
}

impl<M: ReactorModel + ?Sized> ReactorModel for &M {
    fn compute_cb(&self, q: f64, ca_in: f64, k1: f64, k2: f64, vr: f64) -> Result<f64> {
        (**self).compute_cb(q, ca_in, k1, k2, vr)
    }
}

/// Adapts a plain closure into a [`ReactorModel`].
///
/// ```
/// use reactor_sweep::{FnModel, ReactorModel};
///
/// let model = FnModel(|q, ca_in, _k1, _k2, _vr| q + ca_in);
/// assert_eq!(model.compute_cb(1.0, 0.5, 0.0, 0.0, 0.0).unwrap(), 1.5);
/// ```
pub struct FnModel<F>(pub F);

impl<F> ReactorModel for FnModel<F>
where
    F: Fn(f64, f64, f64, f64, f64) -> f64,
{
    fn compute_cb(&self, q: f64, ca_in: f64, k1: f64, k2: f64, vr: f64) -> Result<f64> {
        Ok((self.0)(q, ca_in, k1, k2, vr))
    }
}

// ── Native binding ──────────────────────────────────────────────────

/// Lazily loaded handle on the native reactor model library.
///
/// The library is resolved on the first computation (or on an explicit
/// [`load`](Self::load)) and then reused for as long as the binding
/// lives. A failed resolution is not cached, so a library placed after
/// the first attempt is picked up by the next one.
pub struct NativeBinding {
    config: BindingConfig,
    lib: OnceLock<ReactorLibrary>,
    init_lock: Mutex<()>,
    /// Present when native calls must not run concurrently.
    call_lock: Option<Mutex<()>>,
}

impl NativeBinding {
    pub fn new(config: BindingConfig) -> Self {
        let call_lock = config.serialize_calls.then(|| Mutex::new(()));
        Self {
            config,
            lib: OnceLock::new(),
            init_lock: Mutex::new(()),
            call_lock,
        }
    }

    /// Binding configured from the environment.
    pub fn from_env() -> Self {
        Self::new(BindingConfig::from_env())
    }

    pub fn config(&self) -> &BindingConfig {
        &self.config
    }

    /// Resolve the library now instead of on first use.
    pub fn load(&self) -> Result<&ReactorLibrary> {
        if let Some(lib) = self.lib.get() {
            return Ok(lib);
        }

        let _guard = lock(&self.init_lock);
        // Another thread may have finished while we waited.
        if let Some(lib) = self.lib.get() {
            return Ok(lib);
        }

        let lib = ReactorLibrary::load_from_dir(&self.config.module_dir, self.config.platform)
            .inspect_err(|e| tracing::warn!(error = %e, "reactor model setup failed"))?;
        tracing::info!(path = %lib.path().display(), "reactor model loaded");
        Ok(self.lib.get_or_init(|| lib))
    }

    pub fn is_loaded(&self) -> bool {
        self.lib.get().is_some()
    }

    /// File the library was loaded from, once loaded.
    pub fn module_path(&self) -> Option<&Path> {
        self.lib.get().map(ReactorLibrary::path)
    }
}

impl ReactorModel for NativeBinding {
    fn compute_cb(&self, q: f64, ca_in: f64, k1: f64, k2: f64, vr: f64) -> Result<f64> {
        let lib = self.load()?;

        let cb = {
            let _guard = self.call_lock.as_ref().map(lock);
            lib.compute_cb(q, ca_in, k1, k2, vr)
        };

        if !cb.is_finite() {
            tracing::warn!(q, ca_in, cb, "reactor model returned a non-finite value");
            return Err(ReactorError::NativeCall { q, ca_in, value: cb });
        }
        Ok(cb)
    }
}

/// The guarded data is `()`, so a poisoned lock carries no broken state.
fn lock(m: &Mutex<()>) -> MutexGuard<'_, ()> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

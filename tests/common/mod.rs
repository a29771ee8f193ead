#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use reactor_sweep::{KineticParameters, Platform, ReactorModel, Result};
use tempfile::TempDir;

/// Fresh empty directory, removed when the returned guard drops.
pub fn scratch_dir(tag: &str) -> TempDir {
    tempfile::Builder::new()
        .prefix(&format!("reactor-sweep-{tag}-"))
        .tempdir()
        .unwrap()
}

/// Directory holding the `reactor_model` cdylib built from
/// `fixtures/reactor-model`, if it has been built for this profile.
pub fn fixture_module_dir() -> Option<PathBuf> {
    // The test binary lives in target/<profile>/deps; the cdylib sits
    // next to it or one level up.
    let exe = std::env::current_exe().ok()?;
    let deps = exe.parent()?;
    [Some(deps), deps.parent()]
        .into_iter()
        .flatten()
        .find(|dir| {
            Platform::current()
                .candidates()
                .iter()
                .any(|name| dir.join(name).is_file())
        })
        .map(|dir| dir.to_path_buf())
}

/// Stub returning `Q + CA_in` and counting its calls.
#[derive(Default)]
pub struct CountingModel {
    calls: AtomicUsize,
}

impl CountingModel {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ReactorModel for CountingModel {
    fn compute_cb(&self, q: f64, ca_in: f64, _k1: f64, _k2: f64, _vr: f64) -> Result<f64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(q + ca_in)
    }
}

/// The reference kinetics of the shipped native module.
pub fn cstr_cb(q: f64, ca_in: f64, k1: f64, k2: f64, vr: f64) -> f64 {
    (2.0 * k1 * vr * q * ca_in) / ((q + k1 * vr) * (q + k2 * vr))
}

pub fn params(
    (q_min, q_max, dq): (f64, f64, f64),
    (ca_in_min, ca_in_max, d_ca_in): (f64, f64, f64),
) -> KineticParameters {
    KineticParameters {
        k1: 0.1,
        k2: 0.2,
        vr: 10.0,
        q_min,
        q_max,
        dq,
        ca_in_min,
        ca_in_max,
        d_ca_in,
    }
}

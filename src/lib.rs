//! # reactor_sweep
//!
//! Output-concentration surface of a continuous stirred-tank reactor,
//! computed by sweeping flow rate `Q` and inlet concentration `CA_in`
//! through a native `compute_CB` routine loaded at runtime.
//!
//! ## Highlights
//!
//! * **Runtime binding** — the reactor model library is looked up in one
//!   directory by a per-platform list of file names, loaded once, and
//!   reused
//! * **Exact grid semantics** — inclusive upper bounds with a fixed
//!   `1e-9` tolerance, Q-major ordering
//! * **Distinct errors** — bad bounds, missing library, missing symbol
//!   and failed points are separate [`ReactorError`] variants
//! * **Optional parallelism** — same output, evaluated on `rayon`
//!
//! ## Quick example
//!
//! ```no_run
//! use reactor_sweep::{KineticParameters, NativeBinding, SweepEngine};
//!
//! let binding = NativeBinding::from_env();
//! let params = KineticParameters {
//!     k1: 0.1, k2: 0.2, vr: 10.0,
//!     q_min: 1.0, q_max: 3.0, dq: 1.0,
//!     ca_in_min: 0.1, ca_in_max: 0.3, d_ca_in: 0.1,
//! };
//!
//! let result = SweepEngine::new(&binding).run(&params)?;
//! for p in result.points() {
//!     println!("{p}");
//! }
//! # Ok::<(), reactor_sweep::ReactorError>(())
//! ```
//!
//! ## Testing without the native module
//!
//! ```
//! use reactor_sweep::{FnModel, KineticParameters, SweepEngine};
//!
//! let stub = FnModel(|q, ca_in, _, _, _| q + ca_in);
//! let params = KineticParameters {
//!     k1: 0.0, k2: 0.0, vr: 0.0,
//!     q_min: 5.0, q_max: 5.0, dq: 1.0,
//!     ca_in_min: 0.5, ca_in_max: 0.5, d_ca_in: 1.0,
//! };
//! let result = SweepEngine::new(&stub).run(&params)?;
//! assert_eq!(result.points()[0].cb, 5.5);
//! # Ok::<(), reactor_sweep::ReactorError>(())
//! ```

// ── Internal modules ─────────────────────────────────────────────────
pub mod binding;
pub mod coefficients;
pub mod config;
pub mod error;
pub mod model;
pub mod report;
pub mod sweep;
pub mod sys;

// ── Public re-exports ────────────────────────────────────────────────
pub use binding::{FnModel, NativeBinding, ReactorModel};
pub use coefficients::{CoefficientProvider, CoefficientStore, JsonStore, MemoryStore, RawMaterial};
pub use config::BindingConfig;
pub use error::{ReactorError, Result};
pub use model::{KineticParameters, SweepPoint};
pub use report::{Report, TableRow, table_rows};
pub use sweep::{
    CancelToken, GRID_EPSILON, InletSeries, MAX_GRID_POINTS, SweepEngine, SweepOptions,
    SweepResult, axis_values, expected_point_count,
};
pub use sys::Platform;

//! Two-dimensional sweep over flow rate and inlet concentration.
//!
//! The grid is walked Q-major, CA_in-minor. The i-th value of an axis is
//! `min + i * step`, and the axis ends at the last value that does not
//! exceed the upper bound by more than [`GRID_EPSILON`], so an upper bound
//! that is reached up to rounding is always included.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use rayon::prelude::*;

use crate::binding::ReactorModel;
use crate::error::*;
use crate::model::{KineticParameters, SweepPoint};

/// Absolute tolerance applied to both upper bounds.
pub const GRID_EPSILON: f64 = 1e-9;

/// Largest grid a sweep accepts.
pub const MAX_GRID_POINTS: usize = 10_000_000;

// ── Cancellation ────────────────────────────────────────────────────

/// Cooperative cancellation flag, checked before each grid point.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SweepOptions {
    /// Evaluate grid points on the rayon thread pool.
    pub parallel: bool,
    pub cancel: Option<CancelToken>,
}

// ── Grid ────────────────────────────────────────────────────────────

/// Values of one axis: `min + i * step` for `i` in `0..n`, where `n` is
/// the closed-form axis length used by [`expected_point_count`].
///
/// `step` must be positive; [`KineticParameters::validate`] guarantees it
/// for the sweep engine.
pub fn axis_values(min: f64, max: f64, step: f64) -> Vec<f64> {
    debug_assert!(step > 0.0);
    (0..axis_count(min, max, step))
        .map(|i| min + i as f64 * step)
        .collect()
}

/// Closed-form number of grid points:
/// `(floor((Q_max - Q_min)/dQ + eps) + 1) * (floor((CAin_max - CAin_min)/dCAin + eps) + 1)`.
///
/// Saturates at `usize::MAX` for grids too large to address.
pub fn expected_point_count(p: &KineticParameters) -> usize {
    axis_count(p.q_min, p.q_max, p.dq).saturating_mul(axis_count(p.ca_in_min, p.ca_in_max, p.d_ca_in))
}

fn axis_count(min: f64, max: f64, step: f64) -> usize {
    // `as` saturates, and a negative span rounds to zero steps.
    let steps = ((max - min) / step + GRID_EPSILON).floor();
    (steps.max(0.0) as usize).saturating_add(1)
}

/// Validate `p` and lay out its grid, refusing grids over [`MAX_GRID_POINTS`].
fn plan(p: &KineticParameters) -> Result<Vec<(f64, f64)>> {
    p.validate()?;
    let count = expected_point_count(p);
    if count > MAX_GRID_POINTS {
        return Err(ReactorError::Configuration(format!(
            "sweep of {count} points exceeds the limit of {MAX_GRID_POINTS}"
        )));
    }
    Ok(grid(p))
}

fn grid(p: &KineticParameters) -> Vec<(f64, f64)> {
    let qs = axis_values(p.q_min, p.q_max, p.dq);
    let cas = axis_values(p.ca_in_min, p.ca_in_max, p.d_ca_in);
    qs.iter()
        .flat_map(|&q| cas.iter().map(move |&ca| (q, ca)))
        .collect()
}

// ── Result ──────────────────────────────────────────────────────────

/// Ordered output of one complete sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepResult {
    pub params: KineticParameters,
    points: Vec<SweepPoint>,
}

impl SweepResult {
    pub fn points(&self) -> &[SweepPoint] {
        &self.points
    }

    pub fn into_points(self) -> Vec<SweepPoint> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points grouped by inlet concentration, for plotting CB(Q) curves.
    ///
    /// Groups appear in order of first occurrence; inside a group the
    /// points keep their Q-ascending order.
    pub fn inlet_series(&self) -> Vec<InletSeries> {
        let mut series: Vec<InletSeries> = Vec::new();
        for p in &self.points {
            match series
                .iter_mut()
                .find(|s| (s.ca_in - p.ca_in).abs() < GRID_EPSILON)
            {
                Some(s) => s.points.push((p.q, p.cb)),
                None => series.push(InletSeries {
                    ca_in: p.ca_in,
                    points: vec![(p.q, p.cb)],
                }),
            }
        }
        series
    }
}

/// `(Q, CB)` pairs sharing one inlet concentration.
#[derive(Debug, Clone, PartialEq)]
pub struct InletSeries {
    pub ca_in: f64,
    pub points: Vec<(f64, f64)>,
}

// ── Engine ──────────────────────────────────────────────────────────

/// Drives a [`ReactorModel`] over the grid described by
/// [`KineticParameters`].
pub struct SweepEngine<'m, M: ?Sized> {
    model: &'m M,
}

impl<'m, M: ReactorModel + ?Sized> SweepEngine<'m, M> {
    pub fn new(model: &'m M) -> Self {
        Self { model }
    }

    /// Sequential sweep without cancellation.
    pub fn run(&self, params: &KineticParameters) -> Result<SweepResult> {
        let cells = plan(params)?;
        let points = self.eval_sequential(params, &cells, None)?;
        Ok(SweepResult {
            params: *params,
            points,
        })
    }

    /// Sweep the full grid, optionally in parallel and cancellable.
    ///
    /// The parallel path yields exactly the sequential output.
    /// Parameters and grid size are validated before the model is touched. The first
    /// failing point aborts the sweep and its error is returned; no
    /// partial result is ever produced.
    pub fn run_with(&self, params: &KineticParameters, opts: &SweepOptions) -> Result<SweepResult>
    where
        M: Sync,
    {
        let cells = plan(params)?;
        tracing::debug!(points = cells.len(), parallel = opts.parallel, "starting sweep");

        let points = if opts.parallel {
            self.eval_parallel(params, &cells, opts.cancel.as_ref())?
        } else {
            self.eval_sequential(params, &cells, opts.cancel.as_ref())?
        };

        tracing::debug!(points = points.len(), "sweep complete");
        Ok(SweepResult {
            params: *params,
            points,
        })
    }

    fn eval_point(&self, p: &KineticParameters, q: f64, ca_in: f64) -> Result<SweepPoint> {
        let cb = self.model.compute_cb(q, ca_in, p.k1, p.k2, p.vr)?;
        Ok(SweepPoint { q, ca_in, cb })
    }

    fn eval_sequential(
        &self,
        p: &KineticParameters,
        cells: &[(f64, f64)],
        cancel: Option<&CancelToken>,
    ) -> Result<Vec<SweepPoint>> {
        let mut points = Vec::with_capacity(cells.len());
        for &(q, ca_in) in cells {
            if cancel.is_some_and(CancelToken::is_cancelled) {
                tracing::warn!(completed = points.len(), "sweep cancelled");
                return Err(ReactorError::Cancelled {
                    completed: points.len(),
                });
            }
            points.push(self.eval_point(p, q, ca_in)?);
        }
        Ok(points)
    }

    fn eval_parallel(
        &self,
        p: &KineticParameters,
        cells: &[(f64, f64)],
        cancel: Option<&CancelToken>,
    ) -> Result<Vec<SweepPoint>>
    where
        M: Sync,
    {
        // Setup errors surface from the first point before fanning out.
        let Some((&(q0, ca0), rest)) = cells.split_first() else {
            return Ok(Vec::new());
        };
        if cancel.is_some_and(CancelToken::is_cancelled) {
            return Err(ReactorError::Cancelled { completed: 0 });
        }
        let first = self.eval_point(p, q0, ca0)?;

        let completed = AtomicUsize::new(1);
        let rest: Vec<SweepPoint> = rest
            .par_iter()
            .map(|&(q, ca_in)| {
                if cancel.is_some_and(CancelToken::is_cancelled) {
                    return Err(ReactorError::Cancelled {
                        completed: completed.load(Ordering::Relaxed),
                    });
                }
                let point = self.eval_point(p, q, ca_in)?;
                completed.fetch_add(1, Ordering::Relaxed);
                Ok(point)
            })
            .collect::<Result<_>>()
            .inspect_err(|e| {
                if let ReactorError::Cancelled { completed } = e {
                    tracing::warn!(completed, "sweep cancelled");
                }
            })?;

        let mut points = Vec::with_capacity(cells.len());
        points.push(first);
        points.extend(rest);
        Ok(points)
    }
}

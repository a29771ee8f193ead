mod common;

use approx::assert_abs_diff_eq;
use common::{CountingModel, cstr_cb, params};
use proptest::prelude::*;
use reactor_sweep::{
    CancelToken, FnModel, MAX_GRID_POINTS, ReactorError, ReactorModel, Result, SweepEngine,
    SweepOptions, axis_values, expected_point_count,
};

// ═══════════════════════════════════════════════════════════════════
//  Grid shape and ordering
// ═══════════════════════════════════════════════════════════════════

#[test]
fn three_by_three_grid_is_q_major() {
    let model = CountingModel::default();
    let p = params((1.0, 3.0, 1.0), (0.1, 0.3, 0.1));

    let result = SweepEngine::new(&model).run(&p).unwrap();
    assert_eq!(result.len(), 9);
    assert_eq!(model.calls(), 9);
    assert_eq!(expected_point_count(&p), 9);

    let expected = [
        (1.0, 0.1),
        (1.0, 0.2),
        (1.0, 0.3),
        (2.0, 0.1),
        (2.0, 0.2),
        (2.0, 0.3),
        (3.0, 0.1),
        (3.0, 0.2),
        (3.0, 0.3),
    ];
    for (pt, (q, ca)) in result.points().iter().zip(expected) {
        assert_abs_diff_eq!(pt.q, q, epsilon = 1e-12);
        assert_abs_diff_eq!(pt.ca_in, ca, epsilon = 1e-12);
    }
}

#[test]
fn degenerate_grid_is_one_point() {
    let model = CountingModel::default();
    let p = params((5.0, 5.0, 1.0), (0.5, 0.5, 1.0));

    let result = SweepEngine::new(&model).run(&p).unwrap();
    assert_eq!(result.len(), 1);
    let pt = result.points()[0];
    assert_eq!((pt.q, pt.ca_in), (5.0, 0.5));
}

#[test]
fn stub_sum_is_passed_through_exactly() {
    let model = CountingModel::default();
    let p = params((1.0, 10.0, 1.0), (0.1, 1.0, 0.1));

    let result = SweepEngine::new(&model).run(&p).unwrap();
    assert_eq!(result.len(), 100);
    for pt in result.points() {
        assert_eq!(pt.cb, pt.q + pt.ca_in);
    }
}

#[test]
fn kinetic_coefficients_reach_the_model() {
    let model = FnModel(cstr_cb);
    let p = params((1.0, 3.0, 1.0), (0.1, 0.3, 0.1));

    let result = SweepEngine::new(&model).run(&p).unwrap();
    // Q=1, CA_in=0.1, k1=0.1, k2=0.2, Vr=10: 0.2 / (2 * 3) = 0.0333..
    assert_abs_diff_eq!(result.points()[0].cb, 0.2 / 6.0, epsilon = 1e-12);
    for pt in result.points() {
        assert_eq!(pt.cb, cstr_cb(pt.q, pt.ca_in, p.k1, p.k2, p.vr));
    }
}

#[test]
fn upper_bound_not_on_step_is_excluded() {
    let model = CountingModel::default();
    let p = params((0.0, 2.5, 1.0), (0.0, 0.25, 0.1));

    let result = SweepEngine::new(&model).run(&p).unwrap();
    // Q in {0, 1, 2}, CA_in in {0, 0.1, 0.2}
    assert_eq!(result.len(), 9);
    assert_eq!(expected_point_count(&p), 9);
}

#[test]
fn long_decimal_range_matches_closed_form() {
    let model = CountingModel::default();
    let p = params((0.0, 10000.0, 0.1), (0.5, 0.5, 1.0));

    let result = SweepEngine::new(&model).run(&p).unwrap();
    assert_eq!(result.len(), 100_001);
    assert_eq!(result.len(), expected_point_count(&p));
    let last = result.points()[100_000];
    assert_abs_diff_eq!(last.q, 10000.0, epsilon = 1e-9);
}

#[test]
fn inlet_series_follow_first_ca_in() {
    let model = CountingModel::default();
    let p = params((1.0, 3.0, 1.0), (0.1, 0.3, 0.1));

    let result = SweepEngine::new(&model).run(&p).unwrap();
    let series = result.inlet_series();
    assert_eq!(series.len(), 3);
    assert_abs_diff_eq!(series[0].ca_in, 0.1);
    let qs: Vec<f64> = series[0].points.iter().map(|(q, _)| *q).collect();
    assert_eq!(qs, vec![1.0, 2.0, 3.0]);
}

// ═══════════════════════════════════════════════════════════════════
//  Configuration errors
// ═══════════════════════════════════════════════════════════════════

#[test]
fn non_positive_steps_fail_before_any_call() {
    let model = CountingModel::default();
    let engine = SweepEngine::new(&model);

    for p in [
        params((1.0, 3.0, 0.0), (0.1, 0.3, 0.1)),
        params((1.0, 3.0, -1.0), (0.1, 0.3, 0.1)),
        params((1.0, 3.0, 1.0), (0.1, 0.3, 0.0)),
        params((1.0, 3.0, 1.0), (0.1, 0.3, -0.1)),
    ] {
        let err = engine.run(&p).unwrap_err();
        assert!(matches!(err, ReactorError::Configuration(_)), "got {err}");
        let err = engine
            .run_with(&p, &SweepOptions { parallel: true, cancel: None })
            .unwrap_err();
        assert!(matches!(err, ReactorError::Configuration(_)), "got {err}");
    }
    assert_eq!(model.calls(), 0);
}

#[test]
fn inverted_bounds_fail_before_any_call() {
    let model = CountingModel::default();
    let err = SweepEngine::new(&model)
        .run(&params((3.0, 1.0, 1.0), (0.1, 0.3, 0.1)))
        .unwrap_err();
    assert!(matches!(err, ReactorError::Configuration(_)));
    assert_eq!(model.calls(), 0);
}

#[test]
fn step_below_resolution_fails_before_any_call() {
    let model = CountingModel::default();
    let engine = SweepEngine::new(&model);

    // 1e16 + 1.0 == 1e16, so the Q axis could never advance.
    for p in [
        params((1e16, 1e16 + 4.0, 1.0), (0.5, 0.5, 1.0)),
        params((1.0, 1.0, 1.0), (1e16, 1e16, 0.5)),
    ] {
        let err = engine.run(&p).unwrap_err();
        assert!(matches!(err, ReactorError::Configuration(_)), "got {err}");
        let err = engine
            .run_with(&p, &SweepOptions { parallel: true, cancel: None })
            .unwrap_err();
        assert!(matches!(err, ReactorError::Configuration(_)), "got {err}");
    }
    assert_eq!(model.calls(), 0);
}

#[test]
fn oversized_grid_fails_before_any_call() {
    let model = CountingModel::default();
    let p = params((0.0, 1e6, 1e-6), (0.0, 1.0, 1e-3));
    assert!(expected_point_count(&p) > MAX_GRID_POINTS);

    let err = SweepEngine::new(&model).run(&p).unwrap_err();
    match err {
        ReactorError::Configuration(msg) => assert!(msg.contains("exceeds the limit")),
        other => panic!("expected Configuration, got {other}"),
    }
    assert_eq!(model.calls(), 0);
}

// ═══════════════════════════════════════════════════════════════════
//  Failure policy: any failing point aborts the sweep
// ═══════════════════════════════════════════════════════════════════

/// Fails with `error` once `fail_from` calls have succeeded.
struct FailingModel {
    inner: CountingModel,
    fail_from: usize,
    setup: bool,
}

impl ReactorModel for FailingModel {
    fn compute_cb(&self, q: f64, ca_in: f64, k1: f64, k2: f64, vr: f64) -> Result<f64> {
        if self.inner.calls() >= self.fail_from {
            self.inner.compute_cb(q, ca_in, k1, k2, vr)?;
            return Err(if self.setup {
                ReactorError::ModuleNotFound {
                    dir: "/nowhere".into(),
                    tried: vec!["libreactor_model.so".into()],
                }
            } else {
                ReactorError::NativeCall { q, ca_in, value: f64::NAN }
            });
        }
        self.inner.compute_cb(q, ca_in, k1, k2, vr)
    }
}

#[test]
fn setup_failure_on_first_call_aborts() {
    let model = FailingModel {
        inner: CountingModel::default(),
        fail_from: 0,
        setup: true,
    };
    let err = SweepEngine::new(&model)
        .run(&params((1.0, 3.0, 1.0), (0.1, 0.3, 0.1)))
        .unwrap_err();
    assert!(err.is_setup_error());
    assert_eq!(model.inner.calls(), 1);
}

#[test]
fn point_failure_aborts_without_partial_result() {
    let model = FailingModel {
        inner: CountingModel::default(),
        fail_from: 4,
        setup: false,
    };
    let err = SweepEngine::new(&model)
        .run(&params((1.0, 3.0, 1.0), (0.1, 0.3, 0.1)))
        .unwrap_err();
    match err {
        ReactorError::NativeCall { q, ca_in, .. } => {
            // Fifth point in Q-major order.
            assert_eq!(q, 2.0);
            assert_abs_diff_eq!(ca_in, 0.2, epsilon = 1e-12);
        }
        other => panic!("expected NativeCall, got {other}"),
    }
    assert_eq!(model.inner.calls(), 5);
}

#[test]
fn parallel_point_failure_aborts() {
    let model = FailingModel {
        inner: CountingModel::default(),
        fail_from: 4,
        setup: false,
    };
    let opts = SweepOptions {
        parallel: true,
        cancel: None,
    };
    let err = SweepEngine::new(&model)
        .run_with(&params((1.0, 3.0, 1.0), (0.1, 0.3, 0.1)), &opts)
        .unwrap_err();
    assert!(matches!(err, ReactorError::NativeCall { .. }));
}

// ═══════════════════════════════════════════════════════════════════
//  Parallel evaluation and cancellation
// ═══════════════════════════════════════════════════════════════════

#[test]
fn parallel_matches_sequential() {
    let model = FnModel(cstr_cb);
    let p = params((1.0, 40.0, 0.5), (0.05, 2.0, 0.05));
    let engine = SweepEngine::new(&model);

    let seq = engine.run(&p).unwrap();
    let par = engine
        .run_with(&p, &SweepOptions { parallel: true, cancel: None })
        .unwrap();
    assert_eq!(seq, par);
    assert_eq!(seq.len(), expected_point_count(&p));
}

#[test]
fn cancelled_token_stops_the_sweep() {
    let model = CountingModel::default();
    let token = CancelToken::new();
    token.cancel();
    let p = params((1.0, 3.0, 1.0), (0.1, 0.3, 0.1));

    for parallel in [false, true] {
        let opts = SweepOptions {
            parallel,
            cancel: Some(token.clone()),
        };
        let err = SweepEngine::new(&model).run_with(&p, &opts).unwrap_err();
        assert!(matches!(err, ReactorError::Cancelled { completed: 0 }));
    }
    assert_eq!(model.calls(), 0);
}

#[test]
fn untouched_token_changes_nothing() {
    let model = CountingModel::default();
    let p = params((1.0, 3.0, 1.0), (0.1, 0.3, 0.1));
    let engine = SweepEngine::new(&model);

    let plain = engine.run(&p).unwrap();
    let with_token = engine
        .run_with(
            &p,
            &SweepOptions {
                parallel: false,
                cancel: Some(CancelToken::new()),
            },
        )
        .unwrap();
    assert_eq!(plain, with_token);
}

// ═══════════════════════════════════════════════════════════════════
//  Properties
// ═══════════════════════════════════════════════════════════════════

proptest! {
    // Dyadic bounds and steps are exact in binary, so the expected count
    // is known without rounding.
    #[test]
    fn point_count_matches_closed_form(
        q0 in 0u32..40, qs in 1u32..16, qn in 0u32..12,
        c0 in 0u32..40, cs in 1u32..16, cn in 0u32..12,
    ) {
        let dq = qs as f64 / 8.0;
        let q_min = q0 as f64 / 4.0;
        let dca = cs as f64 / 64.0;
        let ca_min = c0 as f64 / 32.0;
        let p = params(
            (q_min, q_min + qn as f64 * dq, dq),
            (ca_min, ca_min + cn as f64 * dca, dca),
        );

        let model = CountingModel::default();
        let result = SweepEngine::new(&model).run(&p).unwrap();
        let expected = (qn as usize + 1) * (cn as usize + 1);
        prop_assert_eq!(result.len(), expected);
        prop_assert_eq!(expected_point_count(&p), expected);
        prop_assert_eq!(model.calls(), expected);
    }

    #[test]
    fn decimal_axis_length_matches_closed_form(
        min in -100.0f64..100.0, span in 0.0f64..5000.0, step in 0.01f64..1.0,
    ) {
        let values = axis_values(min, min + span, step);
        let p = params((min, min + span, step), (0.5, 0.5, 1.0));
        prop_assert_eq!(values.len(), expected_point_count(&p));
        prop_assert!(values[values.len() - 1] <= min + span + 1e-8);
    }

    #[test]
    fn output_is_strictly_sorted(
        q_min in 0.0f64..10.0, q_span in 0.0f64..10.0, dq in 0.1f64..3.0,
        ca_min in 0.0f64..1.0, ca_span in 0.0f64..1.0, dca in 0.01f64..0.5,
    ) {
        let p = params((q_min, q_min + q_span, dq), (ca_min, ca_min + ca_span, dca));
        let model = CountingModel::default();
        let result = SweepEngine::new(&model).run(&p).unwrap();

        prop_assert!(!result.is_empty());
        for w in result.points().windows(2) {
            let (a, b) = (w[0], w[1]);
            let ordered = a.q < b.q || (a.q == b.q && a.ca_in < b.ca_in);
            prop_assert!(ordered, "({}, {}) before ({}, {})", a.q, a.ca_in, b.q, b.ca_in);
        }
    }
}

//! Reference implementation of the native reactor model.
//!
//! Built as `libreactor_model.so` / `libreactor_model.dylib` /
//! `reactor_model.dll`, the file names the binding searches for.

use std::os::raw::c_double;

/// Outlet concentration of B for the series reaction A -> B -> C in a CSTR.
///
/// Returns NaN when `Q + k1*Vr` or `Q + k2*Vr` is zero.
#[allow(non_snake_case)]
#[unsafe(no_mangle)]
pub extern "C" fn compute_CB(
    Q: c_double,
    CA_in: c_double,
    k1: c_double,
    k2: c_double,
    Vr: c_double,
) -> c_double {
    (2.0 * k1 * Vr * Q * CA_in) / ((Q + k1 * Vr) * (Q + k2 * Vr))
}

use serde::{Deserialize, Serialize};

use crate::error::*;

// ── Kinetic parameters ──────────────────────────────────────────────

/// Kinetic and process coefficients of one raw material, together with
/// the bounds of the flow / inlet-concentration sweep.
///
/// | Field                         | Unit   |
/// |-------------------------------|--------|
/// | k1, k2                        | 1/min  |
/// | vr                            | L      |
/// | q_min, q_max, dq              | L/min  |
/// | ca_in_min, ca_in_max, d_ca_in | mol/L  |
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KineticParameters {
    pub k1: f64,
    pub k2: f64,
    #[serde(rename = "Vr")]
    pub vr: f64,
    #[serde(rename = "Q_min")]
    pub q_min: f64,
    #[serde(rename = "Q_max")]
    pub q_max: f64,
    #[serde(rename = "dQ")]
    pub dq: f64,
    #[serde(rename = "CAin_min")]
    pub ca_in_min: f64,
    #[serde(rename = "CAin_max")]
    pub ca_in_max: f64,
    #[serde(rename = "dCAin")]
    pub d_ca_in: f64,
}

impl KineticParameters {
    /// Check that the sweep described by these parameters is well formed.
    ///
    /// Steps must be strictly positive and every bound pair ordered. All
    /// nine values must be finite.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in self.named_values() {
            if !value.is_finite() {
                return Err(ReactorError::Configuration(format!(
                    "{name} must be a finite number, got {value}"
                )));
            }
        }
        if self.dq <= 0.0 || self.d_ca_in <= 0.0 {
            return Err(ReactorError::Configuration(format!(
                "steps dQ and dCAin must be > 0, got dQ={} dCAin={}",
                self.dq, self.d_ca_in
            )));
        }
        if self.q_min > self.q_max {
            return Err(ReactorError::Configuration(format!(
                "Q_min ({}) exceeds Q_max ({})",
                self.q_min, self.q_max
            )));
        }
        if self.ca_in_min > self.ca_in_max {
            return Err(ReactorError::Configuration(format!(
                "CAin_min ({}) exceeds CAin_max ({})",
                self.ca_in_min, self.ca_in_max
            )));
        }
        for (axis, min, max, step) in [
            ("Q", self.q_min, self.q_max, self.dq),
            ("CAin", self.ca_in_min, self.ca_in_max, self.d_ca_in),
        ] {
            // A step below half an ulp of either bound cannot move the axis.
            if min + step == min || max + step == max {
                return Err(ReactorError::Configuration(format!(
                    "step {step} is too small to advance {axis} from {min} to {max}"
                )));
            }
        }
        Ok(())
    }

    /// The nine coefficients with their persisted names, in storage order.
    pub fn named_values(&self) -> [(&'static str, f64); 9] {
        [
            ("k1", self.k1),
            ("k2", self.k2),
            ("Vr", self.vr),
            ("Q_min", self.q_min),
            ("Q_max", self.q_max),
            ("dQ", self.dq),
            ("CAin_min", self.ca_in_min),
            ("CAin_max", self.ca_in_max),
            ("dCAin", self.d_ca_in),
        ]
    }
}

impl std::fmt::Display for KineticParameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "k1       = {} 1/min", self.k1)?;
        writeln!(f, "k2       = {} 1/min", self.k2)?;
        writeln!(f, "Vr       = {} L", self.vr)?;
        writeln!(f, "Q        = {} .. {} step {} L/min", self.q_min, self.q_max, self.dq)?;
        write!(
            f,
            "CA_in    = {} .. {} step {} mol/L",
            self.ca_in_min, self.ca_in_max, self.d_ca_in
        )
    }
}

// ── Sweep point ─────────────────────────────────────────────────────

/// One evaluated grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    /// Flow rate (L/min)
    #[serde(rename = "Q")]
    pub q: f64,
    /// Inlet concentration of A (mol/L)
    #[serde(rename = "CA_in")]
    pub ca_in: f64,
    /// Output concentration of B (mol/L)
    #[serde(rename = "CB")]
    pub cb: f64,
}

impl std::fmt::Display for SweepPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Q = {} L/min, CA_in = {} mol/L, CB = {:.6} mol/L", self.q, self.ca_in, self.cb)
    }
}

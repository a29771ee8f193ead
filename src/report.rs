//! Table rows and semicolon-delimited report export.
//!
//! The interactive table and the report use independent precisions:
//!
//! | Column | Table | Report |
//! |--------|-------|--------|
//! | Q      | 3     | 2      |
//! | CA_in  | 3     | 3      |
//! | CB     | 6     | 4      |

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::*;
use crate::model::{KineticParameters, SweepPoint};

const DELIMITER: &str = ";";
const LINE_END: &str = "\r\n";
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

// ── Table ───────────────────────────────────────────────────────────

/// One formatted row of the result table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub q: String,
    pub ca_in: String,
    pub cb: String,
}

pub fn table_rows(points: &[SweepPoint]) -> Vec<TableRow> {
    points
        .iter()
        .map(|p| TableRow {
            q: format!("{:.3}", p.q),
            ca_in: format!("{:.3}", p.ca_in),
            cb: format!("{:.6}", p.cb),
        })
        .collect()
}

// ── Report ──────────────────────────────────────────────────────────

/// A finished sweep together with the inputs that produced it.
#[derive(Debug, Clone)]
pub struct Report<'a> {
    pub raw_material: &'a str,
    pub params: &'a KineticParameters,
    pub points: &'a [SweepPoint],
}

impl Report<'_> {
    /// Write the report body (without BOM). Lines end in CRLF.
    pub fn write_to<W: Write>(&self, mut w: W) -> Result<()> {
        let p = self.params;

        write_row(&mut w, &["Reactor calculation report"])?;
        w.write_all(LINE_END.as_bytes())?;
        write_row(&mut w, &["Raw material", self.raw_material])?;
        let header = [
            ("Vr, L", p.vr),
            ("k1, 1/min", p.k1),
            ("k2, 1/min", p.k2),
            ("Q_min, L/min", p.q_min),
            ("Q_max, L/min", p.q_max),
            ("dQ, L/min", p.dq),
            ("CAin_min, mol/L", p.ca_in_min),
            ("CAin_max, mol/L", p.ca_in_max),
            ("dCAin, mol/L", p.d_ca_in),
        ];
        for (label, value) in header {
            let value = stored_real(value);
            write_row(&mut w, &[label, value.as_str()])?;
        }
        w.write_all(LINE_END.as_bytes())?;
        write_row(&mut w, &["Q, L/min", "CA_in, mol/L", "CB, mol/L"])?;

        for pt in self.points {
            let q = format!("{:.2}", pt.q);
            let ca_in = format!("{:.3}", pt.ca_in);
            let cb = format!("{:.4}", pt.cb);
            write_row(&mut w, &[q.as_str(), ca_in.as_str(), cb.as_str()])?;
        }
        w.flush()?;
        Ok(())
    }

    /// Save to `path`, prefixed with a UTF-8 BOM for spreadsheet tools.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut w = BufWriter::new(File::create(path)?);
        w.write_all(UTF8_BOM)?;
        self.write_to(&mut w)?;
        tracing::info!(path = %path.display(), rows = self.points.len(), "report saved");
        Ok(())
    }
}

fn write_row<W: Write>(w: &mut W, fields: &[&str]) -> std::io::Result<()> {
    let line: Vec<String> = fields.iter().map(|f| quote(f)).collect();
    write!(w, "{}{LINE_END}", line.join(DELIMITER))
}

/// Coefficients are echoed as stored: shortest round-trip form, always
/// with a fractional part (`10.0`, `0.1`).
fn stored_real(value: f64) -> String {
    format!("{value:?}")
}

/// Quote a field that contains the delimiter, a quote or a line break.
fn quote(field: &str) -> String {
    if field.contains(DELIMITER) || field.contains(['"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

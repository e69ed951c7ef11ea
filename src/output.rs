use ndarray::Array2;
use std::fmt;
use std::io::{self, Write};

/// Fixed-point value that spells non-finite numbers `nan`, `-nan`, `inf` and
/// `-inf`.
struct Fixed(f64, usize);

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Fixed(value, precision) = *self;
        let sign = if value.is_sign_negative() { "-" } else { "" };

        if value.is_nan() {
            write!(f, "{}nan", sign)
        } else if value.is_infinite() {
            write!(f, "{}inf", sign)
        } else {
            write!(f, "{:.*}", precision, value)
        }
    }
}

/// Write one snapshot: `|delta|` to 6 decimals, then the grid row by row with
/// every cell to 4 decimals followed by a comma.
///
/// A NaN delta keeps its sign bit, since only values below zero are negated.
pub fn write_snapshot<W: Write>(out: &mut W, grid: &Array2<f64>, delta: f64) -> io::Result<()> {
    let magnitude = if delta < 0.0 { -delta } else { delta };
    writeln!(out, "{}", Fixed(magnitude, 6))?;

    for row in grid.rows() {
        for &cell in row {
            write!(out, "{},", Fixed(cell, 4))?;
        }
        writeln!(out)?;
    }

    Ok(())
}

//! Reader for the line-oriented problem description.
//!
//! ```text
//! 3, 4          grid size "n, m"
//! ----          opens the source section
//! 1, 2, 100.0   "x, y, value", any number of lines
//! ----          closes it
//! 0.001         termination threshold
//! 0             iterations per round, 0 selects the threshold
//! 1             cyclic flag, 0 is clamped
//! ```
//!
//! When the line after the size is not `----` it is skipped and the problem
//! has no sources.

use crate::d2::{try_filled, Boundary, SourcePoint, Sources, Termination};
use ndarray::Array2;
use std::convert::{TryFrom, TryInto};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, warn};

const SEPARATOR: &str = "----";

pub type Result<T> = std::result::Result<T, InputError>;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("line {line}: Error with file format: grid size.")]
    GridSize { line: usize },

    #[error("line {line}: Error with file format: source point.")]
    SourcePoint { line: usize },

    #[error("line {line}: source ({x}, {y}) is outside the {n}x{m} grid.")]
    SourceOutOfRange {
        line: usize,
        x: i64,
        y: i64,
        n: usize,
        m: usize,
    },

    #[error("line {line}: Error with file format: termination value.")]
    Threshold { line: usize },

    #[error("line {line}: Error with file format: n_iter.")]
    Iterations { line: usize },

    #[error("line {line}: Error with file format: is_cyclic.")]
    Cyclic { line: usize },

    #[error("Memory allocation failed.")]
    Memory { n: usize, m: usize },

    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: &'static str },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Everything the relaxation engine needs, as read from one input.
#[derive(Clone, Debug)]
pub struct Problem {
    /// Initial grid, zero everywhere except at the sources.
    pub grid: Array2<f64>,
    pub sources: Sources,
    pub threshold: f64,
    /// Passes per round; 0 means "run until the threshold is met".
    pub max_iterations: usize,
    pub boundary: Boundary,
}

impl Problem {
    pub fn termination(&self) -> Termination {
        Termination::new(self.threshold, self.max_iterations)
    }
}

struct LineReader<R> {
    lines: io::Lines<R>,
    line: usize,
}

impl<R: BufRead> LineReader<R> {
    fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line: 0,
        }
    }

    fn next(&mut self, expected: &'static str) -> Result<String> {
        match self.lines.next() {
            Some(line) => {
                self.line += 1;
                Ok(line?)
            }
            None => Err(InputError::UnexpectedEof { expected }),
        }
    }
}

/// Parse a comma separated line with exactly `N` fields.
fn fields<const N: usize>(line: &str) -> Option<[&str; N]> {
    let mut out = [""; N];
    let mut parts = line.split(',');

    for slot in out.iter_mut() {
        *slot = parts.next()?.trim();
    }

    if parts.next().is_some() {
        return None;
    }
    Some(out)
}

fn scalar<T: FromStr>(line: &str) -> Option<T> {
    line.trim().parse().ok()
}

fn grid_size(line: &str) -> Option<(usize, usize)> {
    let [n, m] = fields::<2>(line)?;
    let n: usize = n.parse::<i64>().ok()?.try_into().ok()?;
    let m: usize = m.parse::<i64>().ok()?.try_into().ok()?;
    Some((n, m))
}

fn source_point(line: &str) -> Option<(i64, i64, f64)> {
    let [x, y, value] = fields::<3>(line)?;
    Some((x.parse().ok()?, y.parse().ok()?, value.parse().ok()?))
}

fn read_sources<R: BufRead>(
    reader: &mut LineReader<R>,
    grid: &mut Array2<f64>,
    sources: &mut Sources,
) -> Result<()> {
    let (n, m) = grid.dim();

    loop {
        let text = reader.next("a source point or the closing separator")?;
        if text == SEPARATOR {
            return Ok(());
        }

        let line = reader.line;
        let (x, y, value) = source_point(&text).ok_or(InputError::SourcePoint { line })?;
        let out_of_range = InputError::SourceOutOfRange { line, x, y, n, m };

        let point = match (usize::try_from(x), usize::try_from(y)) {
            (Ok(x), Ok(y)) => SourcePoint { x, y, value },
            _ => return Err(out_of_range),
        };
        sources.insert(point).map_err(|_| out_of_range)?;
        grid[[point.x, point.y]] = point.value;
    }
}

/// Parse a problem description from `reader`.
pub fn parse<R: BufRead>(reader: R) -> Result<Problem> {
    let mut reader = LineReader::new(reader);

    let text = reader.next("the grid size")?;
    let (n, m) = grid_size(&text).ok_or(InputError::GridSize { line: reader.line })?;

    let (mut grid, mut sources) = try_filled((n, m), 0.0)
        .zip(Sources::try_new((n, m)))
        .ok_or(InputError::Memory { n, m })?;

    let text = reader.next("the source section")?;
    if text == SEPARATOR {
        read_sources(&mut reader, &mut grid, &mut sources)?;
    } else {
        warn!(line = reader.line, "no source separator after the grid size, skipping line");
    }

    let text = reader.next("the termination threshold")?;
    let threshold: f64 = scalar(&text).ok_or(InputError::Threshold { line: reader.line })?;

    let text = reader.next("the iteration count")?;
    let max_iterations = scalar::<i64>(&text)
        .and_then(|k| usize::try_from(k).ok())
        .ok_or(InputError::Iterations { line: reader.line })?;

    let text = reader.next("the cyclic flag")?;
    let flag: i64 = scalar(&text).ok_or(InputError::Cyclic { line: reader.line })?;

    let problem = Problem {
        grid,
        sources,
        threshold,
        max_iterations,
        boundary: Boundary::from_flag(flag),
    };

    debug!(
        n,
        m,
        sources = problem.sources.len(),
        threshold,
        max_iterations,
        boundary = ?problem.boundary,
        "parsed problem"
    );

    Ok(problem)
}

/// Open `path` and [`parse`] it.
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Problem> {
    let file = File::open(path)?;
    parse(BufReader::new(file))
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::io::Write;

    const SAMPLE: &str = "3, 4\n----\n1, 2, 100.0\n0, 0, -5\n----\n0.001\n0\n1\n";

    #[test]
    fn test_parse_sample() {
        let problem = parse(SAMPLE.as_bytes()).unwrap();

        assert_eq!(problem.grid.dim(), (3, 4));
        assert_eq!(problem.sources.len(), 2);
        assert!(problem.sources.is_source(1, 2));
        assert!(problem.sources.is_source(0, 0));
        assert_abs_diff_eq!(problem.grid[[1, 2]], 100.0);
        assert_abs_diff_eq!(problem.grid[[0, 0]], -5.0);
        assert_abs_diff_eq!(problem.grid.sum(), 95.0);
        assert_abs_diff_eq!(problem.threshold, 0.001);
        assert_eq!(problem.max_iterations, 0);
        assert_eq!(problem.boundary, Boundary::Cyclic);
        assert_eq!(problem.termination(), Termination::Threshold(0.001));
    }

    #[test]
    fn test_parse_crlf_and_spacing() {
        let text = "2,2\r\n----\r\n1 , 1 , 3.5\r\n----\r\n 0.5 \r\n7\r\n0\r\n";
        let problem = parse(text.as_bytes()).unwrap();

        assert_eq!(problem.grid.dim(), (2, 2));
        assert_abs_diff_eq!(problem.grid[[1, 1]], 3.5);
        assert_eq!(problem.max_iterations, 7);
        assert_eq!(problem.boundary, Boundary::Clamped);
    }

    #[test]
    fn test_empty_source_section() {
        let problem = parse("2, 2\n----\n----\n0.1\n3\n0\n".as_bytes()).unwrap();

        assert!(problem.sources.is_empty());
        assert_abs_diff_eq!(problem.grid.sum(), 0.0);
    }

    #[test]
    fn test_missing_separator_skips_line() {
        let problem = parse("2, 2\nwhatever\n0.1\n3\n0\n".as_bytes()).unwrap();

        assert!(problem.sources.is_empty());
        assert_abs_diff_eq!(problem.threshold, 0.1);
        assert_eq!(problem.max_iterations, 3);
    }

    #[test]
    fn test_duplicate_source_last_wins() {
        let problem = parse("1, 1\n----\n0, 0, 1\n0, 0, 2\n----\n0\n1\n0\n".as_bytes()).unwrap();

        assert_eq!(problem.sources.len(), 2);
        assert_abs_diff_eq!(problem.grid[[0, 0]], 2.0);
    }

    #[test]
    fn test_bad_size() {
        for text in &["x, 2\n", "2\n", "-1, 2\n", "2, 3, 4\n"] {
            let err = parse(text.as_bytes()).unwrap_err();
            assert!(matches!(err, InputError::GridSize { line: 1 }), "{}", text);
        }
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_unallocatable_grid() {
        let err = parse("3000000000000000000, 3\n----\n----\n0.1\n1\n0\n".as_bytes()).unwrap_err();

        assert!(matches!(
            err,
            InputError::Memory {
                n: 3_000_000_000_000_000_000,
                m: 3
            }
        ));
        assert_eq!(err.to_string(), "Memory allocation failed.");
    }

    #[test]
    fn test_bad_source() {
        let err = parse("2, 2\n----\n1, one, 3\n----\n".as_bytes()).unwrap_err();
        assert!(matches!(err, InputError::SourcePoint { line: 3 }));
    }

    #[test]
    fn test_source_out_of_range() {
        let err = parse("2, 2\n----\n0, 0, 1\n2, 0, 1\n----\n".as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            InputError::SourceOutOfRange { line: 4, x: 2, y: 0, .. }
        ));

        let err = parse("2, 2\n----\n0, -1, 1\n----\n".as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            InputError::SourceOutOfRange { line: 3, y: -1, .. }
        ));

        // Wider than a 32-bit usize and far outside the grid either way.
        let err = parse("2, 2\n----\n4294967296, 0, 1\n----\n".as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            InputError::SourceOutOfRange {
                line: 3,
                x: 4_294_967_296,
                y: 0,
                ..
            }
        ));
    }

    #[test]
    fn test_bad_scalars() {
        let err = parse("1, 1\n----\n----\nabc\n0\n0\n".as_bytes()).unwrap_err();
        assert!(matches!(err, InputError::Threshold { line: 4 }));

        let err = parse("1, 1\n----\n----\n0.1\n-2\n0\n".as_bytes()).unwrap_err();
        assert!(matches!(err, InputError::Iterations { line: 5 }));

        let err = parse("1, 1\n----\n----\n0.1\n2\nyes\n".as_bytes()).unwrap_err();
        assert!(matches!(err, InputError::Cyclic { line: 6 }));
    }

    #[test]
    fn test_unexpected_eof() {
        let err = parse("1, 1\n----\n0, 0, 1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, InputError::UnexpectedEof { .. }));

        let err = parse("".as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            InputError::UnexpectedEof {
                expected: "the grid size"
            }
        ));
    }

    #[test]
    fn test_error_message() {
        let err = parse("1, 1\n----\n----\n0.1\n2\nyes\n".as_bytes()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "line 6: Error with file format: is_cyclic."
        );
    }

    #[test]
    fn test_read_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let problem = read_file(file.path()).unwrap();
        assert_eq!(problem.grid.dim(), (3, 4));

        let err = read_file(file.path().with_extension("missing")).unwrap_err();
        assert!(matches!(err, InputError::Io(_)));
    }
}

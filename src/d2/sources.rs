use ndarray::Array2;
use std::convert::TryFrom;
use std::mem;
use thiserror::Error;

/// An `Array2` of shape `dim` filled with `elem`, or `None` when it cannot be
/// allocated.
pub fn try_filled<T: Clone>(dim: (usize, usize), elem: T) -> Option<Array2<T>> {
    let len = dim.0.checked_mul(dim.1)?;
    let bytes = len.checked_mul(mem::size_of::<T>())?;
    isize::try_from(bytes).ok()?;

    let mut cells = Vec::new();
    cells.try_reserve_exact(len).ok()?;
    cells.resize(len, elem);

    Array2::from_shape_vec(dim, cells).ok()
}

/// A cell pinned to a fixed temperature.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SourcePoint {
    pub x: usize,
    pub y: usize,
    pub value: f64,
}

#[derive(Debug, Error, PartialEq)]
#[error("source ({x}, {y}) lies outside the {n}x{m} grid")]
pub struct SourceOutOfRange {
    pub x: usize,
    pub y: usize,
    pub n: usize,
    pub m: usize,
}

/// The pinned cells of one grid shape.
///
/// Points are kept in insertion order; when the same cell is pinned twice the
/// later value is the one [`Sources::apply`] leaves in the grid.
#[derive(Clone, Debug)]
pub struct Sources {
    points: Vec<SourcePoint>,
    pinned: Array2<bool>,
}

impl Sources {
    pub fn new(dim: (usize, usize)) -> Self {
        Self {
            points: Vec::new(),
            pinned: Array2::from_elem(dim, false),
        }
    }

    /// Like [`Sources::new`], but `None` when the mask cannot be allocated.
    pub fn try_new(dim: (usize, usize)) -> Option<Self> {
        Some(Self {
            points: Vec::new(),
            pinned: try_filled(dim, false)?,
        })
    }

    pub fn dim(&self) -> (usize, usize) {
        self.pinned.dim()
    }

    pub fn insert(&mut self, point: SourcePoint) -> Result<(), SourceOutOfRange> {
        let (n, m) = self.dim();

        if point.x >= n || point.y >= m {
            return Err(SourceOutOfRange {
                x: point.x,
                y: point.y,
                n,
                m,
            });
        }

        self.pinned[[point.x, point.y]] = true;
        self.points.push(point);
        Ok(())
    }

    #[inline]
    pub fn is_source(&self, x: usize, y: usize) -> bool {
        self.pinned[[x, y]]
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourcePoint> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Write every source value into `grid`, in insertion order.
    pub fn apply(&self, grid: &mut Array2<f64>) {
        assert_eq!(grid.dim(), self.dim());

        for p in &self.points {
            grid[[p.x, p.y]] = p.value;
        }
    }
}

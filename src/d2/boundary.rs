use ndarray::Array2;

/// What an off-grid neighbour reads as.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Boundary {
    /// Off-grid neighbours read 0.
    Clamped,
    /// Off-grid neighbours wrap to the opposite edge (torus).
    Cyclic,
}

impl Boundary {
    /// `0` is `Clamped`, anything else is `Cyclic`.
    pub fn from_flag(flag: i64) -> Self {
        if flag == 0 {
            Boundary::Clamped
        } else {
            Boundary::Cyclic
        }
    }
}

/// The four values around a cell, in the order the update function takes them.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Neighbours {
    /// `(x, y + 1)`
    pub right: f64,
    /// `(x - 1, y)`
    pub top: f64,
    /// `(x, y - 1)`
    pub left: f64,
    /// `(x + 1, y)`
    pub bottom: f64,
}

impl Neighbours {
    pub fn sum(&self) -> f64 {
        self.right + self.top + self.left + self.bottom
    }
}

/// Resolve the neighbours of `(x, y)` under `boundary`.
///
/// `x` runs over rows (top/bottom), `y` over columns (left/right). On an axis of
/// length 1 both edge rules hit the same cell.
pub fn neighbours(grid: &Array2<f64>, boundary: Boundary, x: usize, y: usize) -> Neighbours {
    let (n, m) = grid.dim();

    debug_assert!(x < n);
    debug_assert!(y < m);

    let wrap = boundary == Boundary::Cyclic;
    let edge = |i: usize, j: usize| if wrap { grid[[i, j]] } else { 0.0 };

    let top = if x == 0 {
        edge(n - 1, y)
    } else {
        grid[[x - 1, y]]
    };

    let left = if y == 0 {
        edge(x, m - 1)
    } else {
        grid[[x, y - 1]]
    };

    let bottom = if x == n - 1 {
        edge(0, y)
    } else {
        grid[[x + 1, y]]
    };

    let right = if y == m - 1 {
        edge(x, 0)
    } else {
        grid[[x, y + 1]]
    };

    Neighbours {
        right,
        top,
        left,
        bottom,
    }
}

//! Per-axis geometry of the block decomposition.
//!
//! The image is cut along each axis into overlapping tiles of at most `b`
//! cells. Tile interiors partition the axis exactly; the cells of a tile
//! outside its interior (the halo) exist only to support the windows of
//! near-edge interior cells.

/// Layout of one image axis: axis length, window half-width and the
/// resulting tile grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Dim {
    /// Length of this axis of the image.
    pub size: usize,
    /// Window half-width on this axis.
    pub h: usize,
    /// Distance between the leading edges of consecutive tiles.
    pub step: usize,
    /// Number of tiles along this axis.
    pub count: usize,
}

impl Dim {
    /// Computes the tile grid for an axis of length `size` filtered with
    /// half-width `h` using blocks of side `b`.
    ///
    /// Requires `2 * h + 1 < b` and `size > 0`; the public entry points
    /// validate both before construction.
    pub fn new(b: usize, size: usize, h: usize) -> Dim {
        assert!(2 * h + 1 < b);
        assert!(size > 0);
        let step = b - 2 * h;
        let count = if size <= b {
            1
        } else {
            (size - 2 * h).div_ceil(step)
        };
        let dim = Dim {
            size,
            h,
            step,
            count,
        };
        debug_assert!(dim.count >= 1);
        debug_assert!(2 * dim.h + dim.count * dim.step >= dim.size);
        debug_assert!(dim.count == 1 || 2 * dim.h + (dim.count - 1) * dim.step < dim.size);
        dim
    }
}

/// Placement of one tile along its axis.
///
/// The tile covers image coordinates `[start, start + len)`. Medians are
/// emitted for the interior `[b0, b1)` in tile-local coordinates; across
/// all tile indices the interiors cover the axis exactly once.
#[derive(Copy, Clone, Debug)]
pub(crate) struct BlockDim {
    pub dim: Dim,
    /// Image coordinate of the tile's leading edge.
    pub start: usize,
    /// Number of cells in the tile, at most `b`.
    pub len: usize,
    /// First interior cell.
    pub b0: usize,
    /// One past the last interior cell.
    pub b1: usize,
}

impl BlockDim {
    pub fn new(dim: Dim) -> BlockDim {
        let mut bdim = BlockDim {
            dim,
            start: 0,
            len: 0,
            b0: 0,
            b1: 0,
        };
        bdim.set(0);
        bdim
    }

    /// Repositions this tile at index `i` along the axis.
    pub fn set(&mut self, i: usize) {
        debug_assert!(i < self.dim.count);
        let is_first = i == 0;
        let is_last = i + 1 == self.dim.count;
        self.start = self.dim.step * i;
        let end = if is_last {
            self.dim.size
        } else {
            2 * self.dim.h + (i + 1) * self.dim.step
        };
        self.len = end - self.start;
        self.b0 = if is_first { 0 } else { self.dim.h };
        self.b1 = if is_last { self.len } else { self.len - self.dim.h };
    }

    /// First cell of the window around interior cell `v`, clipped to the
    /// tile.
    pub fn window_lo(&self, v: usize) -> usize {
        debug_assert!(self.b0 <= v && v < self.b1);
        v.saturating_sub(self.dim.h)
    }

    /// One past the last cell of the window around interior cell `v`,
    /// clipped to the tile.
    pub fn window_hi(&self, v: usize) -> usize {
        debug_assert!(self.b0 <= v && v < self.b1);
        (v + 1 + self.dim.h).min(self.len)
    }
}

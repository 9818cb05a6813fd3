//! Per-block median computation.
//!
//! A block is processed in two phases: a rank build that sorts the block's
//! samples once, then a serpentine walk over the block interior that keeps
//! the window multiset up to date by adding and dropping only the rows or
//! columns that enter and leave it. Each interior cell therefore costs
//! O(window perimeter) bit updates instead of O(window area).

use std::marker::PhantomData;

use crate::definitions::Sample;
use crate::geometry::{BlockDim, Dim};
use crate::window::{WindowOp, WindowRank};

/// Shared handle to the output buffer, passed to every worker.
///
/// Block interiors partition the image and the traversal emits each
/// interior cell exactly once, so concurrent workers never write the same
/// cell.
pub(crate) struct OutputCells<'a, T> {
    ptr: *mut T,
    len: usize,
    marker: PhantomData<&'a mut [T]>,
}

// JUSTIFICATION
//  Benefit
//      Lets rayon workers write their disjoint interior cells straight
//      into the caller's output buffer, with no per-block staging copies.
//  Correctness
//      Writes go through `OutputCells::write`, whose contract requires
//      in-bounds indices written by exactly one worker; disjointness of
//      block interiors is established in `geometry` and pinned by
//      `test_interiors_partition_axis`.
unsafe impl<T: Send> Send for OutputCells<'_, T> {}
unsafe impl<T: Send> Sync for OutputCells<'_, T> {}

impl<'a, T> OutputCells<'a, T> {
    pub fn new(out: &'a mut [T]) -> OutputCells<'a, T> {
        OutputCells {
            ptr: out.as_mut_ptr(),
            len: out.len(),
            marker: PhantomData,
        }
    }

    /// Writes `value` to cell `index`.
    ///
    /// # Safety
    ///
    /// `index` must be in bounds and no other thread may read or write
    /// cell `index` while this handle exists.
    unsafe fn write(&self, index: usize, value: T) {
        debug_assert!(index < self.len);
        unsafe { *self.ptr.add(index) = value };
    }
}

/// Computes the medians of one block at a time, reusing its scratch
/// buffers across blocks. Each worker owns exactly one.
pub(crate) struct BlockMedian<T> {
    wr: WindowRank<T>,
    bx: BlockDim,
    by: BlockDim,
}

impl<T: Sample> BlockMedian<T> {
    pub fn new(b: usize, dim_x: Dim, dim_y: Dim) -> BlockMedian<T> {
        BlockMedian {
            wr: WindowRank::new(b * b),
            bx: BlockDim::new(dim_x),
            by: BlockDim::new(dim_y),
        }
    }

    /// Computes all interior medians of block `(bx, by)` and writes them
    /// to `output`.
    pub fn run(&mut self, bx: usize, by: usize, input: &[T], output: &OutputCells<'_, T>) {
        self.bx.set(bx);
        self.by.set(by);
        self.build_ranks(input);
        self.medians(output);
    }

    /// Reference traversal that rebuilds the window from scratch at every
    /// interior cell. Exists only to pin down the snake path.
    #[cfg(test)]
    pub fn run_naive(&mut self, bx: usize, by: usize, input: &[T], output: &OutputCells<'_, T>) {
        self.bx.set(bx);
        self.by.set(by);
        self.build_ranks(input);
        for y in self.by.b0..self.by.b1 {
            for x in self.bx.b0..self.bx.b1 {
                self.wr.clear();
                self.update_rect(
                    WindowOp::Insert,
                    self.bx.window_lo(x),
                    self.bx.window_hi(x),
                    self.by.window_lo(y),
                    self.by.window_hi(y),
                );
                self.emit(x, y, output);
            }
        }
    }

    fn build_ranks(&mut self, input: &[T]) {
        self.wr.init_begin();
        for y in 0..self.by.len {
            for x in 0..self.bx.len {
                self.wr.init_feed(input[self.coord(x, y)], self.pack(x, y));
            }
        }
        self.wr.init_finish();
    }

    /// Serpentine walk over the interior: down the first column, one step
    /// right, up the next column, and so on. Every step moves exactly one
    /// cell, swapping the row or column slices that enter and leave the
    /// window.
    fn medians(&mut self, output: &OutputCells<'_, T>) {
        let mut x = self.bx.b0;
        let mut y = self.by.b0;
        self.wr.clear();
        self.update_rect(
            WindowOp::Insert,
            self.bx.window_lo(x),
            self.bx.window_hi(x),
            self.by.window_lo(y),
            self.by.window_hi(y),
        );
        self.emit(x, y, output);

        let mut down = true;
        loop {
            let mut right = false;
            if down {
                if y + 1 == self.by.b1 {
                    right = true;
                    down = false;
                }
            } else if y == self.by.b0 {
                right = true;
                down = true;
            }

            if right {
                if x + 1 == self.bx.b1 {
                    break;
                }
                let y0 = self.by.window_lo(y);
                let y1 = self.by.window_hi(y);
                self.update_rect(
                    WindowOp::Remove,
                    self.bx.window_lo(x),
                    self.bx.window_lo(x + 1),
                    y0,
                    y1,
                );
                x += 1;
                self.update_rect(
                    WindowOp::Insert,
                    self.bx.window_hi(x - 1),
                    self.bx.window_hi(x),
                    y0,
                    y1,
                );
            } else if down {
                let x0 = self.bx.window_lo(x);
                let x1 = self.bx.window_hi(x);
                self.update_rect(
                    WindowOp::Remove,
                    x0,
                    x1,
                    self.by.window_lo(y),
                    self.by.window_lo(y + 1),
                );
                y += 1;
                self.update_rect(
                    WindowOp::Insert,
                    x0,
                    x1,
                    self.by.window_hi(y - 1),
                    self.by.window_hi(y),
                );
            } else {
                let x0 = self.bx.window_lo(x);
                let x1 = self.bx.window_hi(x);
                self.update_rect(
                    WindowOp::Remove,
                    x0,
                    x1,
                    self.by.window_hi(y - 1),
                    self.by.window_hi(y),
                );
                y -= 1;
                self.update_rect(
                    WindowOp::Insert,
                    x0,
                    x1,
                    self.by.window_lo(y),
                    self.by.window_lo(y + 1),
                );
            }
            self.emit(x, y, output);
        }
    }

    /// Applies `op` to every cell of `[x0, x1) x [y0, y1)`. Either range
    /// may be empty on boundary tiles.
    fn update_rect(&mut self, op: WindowOp, x0: usize, x1: usize, y0: usize, y1: usize) {
        for y in y0..y1 {
            for x in x0..x1 {
                self.wr.update(op, self.pack(x, y));
            }
        }
    }

    fn emit(&mut self, x: usize, y: usize, output: &OutputCells<'_, T>) {
        let median = self.wr.median();
        let index = self.coord(x, y);
        // SAFETY: (x, y) is an interior cell of the current block, visited
        // exactly once; interiors of distinct blocks are disjoint.
        unsafe { output.write(index, median) };
    }

    /// Tile-local packed slot of cell `(x, y)`.
    fn pack(&self, x: usize, y: usize) -> u32 {
        (y * self.bx.len + x) as u32
    }

    /// Image buffer index of tile-local cell `(x, y)`.
    fn coord(&self, x: usize, y: usize) -> usize {
        (y + self.by.start) * self.bx.dim.size + (x + self.bx.start)
    }
}

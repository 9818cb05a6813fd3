//! The 2-d sliding-window median filter.
//!
//! The image is tiled into overlapping blocks; every block is an
//! independent unit of work, so the driver here is nothing more than
//! validation, tiling and a data-parallel loop over block indices. The
//! actual median machinery lives in [`crate::block`] and
//! [`crate::window`].

use image::{Luma, Primitive};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::block::{BlockMedian, OutputCells};
use crate::definitions::{Image, Sample};
use crate::error::MedianFilterError;
use crate::geometry::Dim;
use crate::window::WindowRank;

/// Default block side for window half-width `h`.
///
/// Balances the O(b²) per-block rank build against the O(b·h) per-cell
/// window updates; values in this neighbourhood all perform similarly.
fn choose_block_size(h: usize) -> usize {
    4 * (h + 2)
}

/// Filters a `width * height` buffer of samples with a sliding median
/// window of half-widths `x_radius` and `y_radius`, writing the result to
/// `output`.
///
/// The buffers are row-major with x varying fastest: cell `(x, y)` lives
/// at index `y * width + x`. The window around `(x, y)` is the
/// `(2 * x_radius + 1) * (2 * y_radius + 1)` rectangle centred on it,
/// clipped at the image boundary. Windows holding an even number of
/// samples yield the mean of the two middle values. NaN samples are
/// excluded from every window; a window containing nothing but NaNs
/// produces NaN.
///
/// `block_hint` overrides the tile side length used by the block
/// decomposition; pass 0 to let the filter choose. Output does not depend
/// on the block size.
///
/// With the `rayon` feature enabled (the default), blocks are processed
/// in parallel; the output is identical regardless of thread count.
///
/// # Errors
///
/// Returns [`MedianFilterError::EmptyImage`] if `width` or `height` is
/// zero, and [`MedianFilterError::WindowTooLarge`] if the window does not
/// fit inside the resolved block size.
///
/// # Panics
///
/// If `input.len()` or `output.len()` differs from `width * height`.
///
/// # Examples
/// ```
/// use blockmedian::median_filter_2d;
///
/// let input = vec![
///     1.0f64, 2.0, 3.0,
///     4.0, 5.0, 6.0,
///     7.0, 8.0, 9.0,
/// ];
/// let mut output = vec![0.0; 9];
/// median_filter_2d(3, 3, 1, 1, 0, &input, &mut output).unwrap();
///
/// // The centre cell sees the full 3x3 window.
/// assert_eq!(output[4], 5.0);
/// ```
pub fn median_filter_2d<T: Sample>(
    width: usize,
    height: usize,
    x_radius: usize,
    y_radius: usize,
    block_hint: usize,
    input: &[T],
    output: &mut [T],
) -> Result<(), MedianFilterError> {
    if width == 0 || height == 0 {
        return Err(MedianFilterError::EmptyImage);
    }
    assert_eq!(input.len(), width * height);
    assert_eq!(output.len(), width * height);

    let b = if block_hint == 0 {
        choose_block_size(x_radius.max(y_radius))
    } else {
        block_hint
    };
    if 2 * x_radius + 1 >= b {
        return Err(MedianFilterError::WindowTooLarge {
            radius: x_radius,
            block: b,
        });
    }
    if 2 * y_radius + 1 >= b {
        return Err(MedianFilterError::WindowTooLarge {
            radius: y_radius,
            block: b,
        });
    }

    let dim_x = Dim::new(b, width, x_radius);
    let dim_y = Dim::new(b, height, y_radius);
    let blocks = dim_x.count * dim_y.count;
    let cells = OutputCells::new(output);

    // Probe the scratch allocation once up front so that failure is
    // reported before any output cell is written.
    WindowRank::<T>::try_new(b * b)?;

    #[cfg(feature = "rayon")]
    (0..blocks).into_par_iter().for_each_init(
        || BlockMedian::new(b, dim_x, dim_y),
        |worker, i| worker.run(i % dim_x.count, i / dim_x.count, input, &cells),
    );
    #[cfg(not(feature = "rayon"))]
    {
        let mut worker = BlockMedian::new(b, dim_x, dim_y);
        for i in 0..blocks {
            worker.run(i % dim_x.count, i / dim_x.count, input, &cells);
        }
    }
    Ok(())
}

/// Applies a sliding-window median filter to a grayscale floating-point
/// image. Each output pixel is the median of the input pixels in a
/// `(2 * x_radius + 1) * (2 * y_radius + 1)` window centred on it, clipped
/// at the image boundary.
///
/// Windows holding an even number of samples yield the mean of the two
/// middle values. NaN samples are excluded from every window; a window
/// containing nothing but NaNs produces NaN.
///
/// # Examples
/// ```
/// use blockmedian::median_filter;
/// use image::{ImageBuffer, Luma};
///
/// let image =
///     ImageBuffer::<Luma<f32>, Vec<f32>>::from_raw(3, 1, vec![1.0, 5.0, 2.0]).unwrap();
///
/// // Boundary windows are clipped: {1, 5}, {1, 5, 2}, {5, 2}.
/// let filtered = median_filter(&image, 1, 0);
///
/// assert_eq!(filtered.into_raw(), vec![3.0, 2.0, 3.5]);
/// ```
pub fn median_filter<F>(image: &Image<Luma<F>>, x_radius: u32, y_radius: u32) -> Image<Luma<F>>
where
    F: Sample + Primitive,
{
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }

    let mut out = vec![F::zero(); (width as usize) * (height as usize)];
    median_filter_2d(
        width as usize,
        height as usize,
        x_radius as usize,
        y_radius as usize,
        0,
        image.as_raw(),
        &mut out,
    )
    .expect("default block size always fits the window");

    Image::from_raw(width, height, out).unwrap()
}

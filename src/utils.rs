//! Utils for testing and debugging.

use crate::definitions::Sample;
use std::fmt;

/// Implementation detail of the float_image macros.
#[macro_export]
macro_rules! float_image_from_nested_array {
    ($nested_array:tt, $channel_type:ty) => {{
        use image::{ImageBuffer, Luma};
        let height = $nested_array.len() as u32;
        let width = $nested_array[0].len() as u32;

        let flat_array: Vec<$channel_type> = $nested_array.into_iter().flatten().collect();

        ImageBuffer::<Luma<$channel_type>, Vec<$channel_type>>::from_raw(width, height, flat_array)
            .unwrap()
    }};
}

/// Helper for defining greyscale images with f32 subpixels. Columns are
/// separated by commas and rows by semi-colons.
///
/// Calls `ImageBuffer::from_raw`.
///
/// # Examples
/// ```
/// use blockmedian::float_image;
/// use image::{ImageBuffer, Luma};
///
/// let image = float_image!(
///     1.0, 2.0, 3.0;
///     4.0, 5.0, 6.0);
///
/// let equivalent = ImageBuffer::<Luma<f32>, Vec<f32>>::from_raw(3, 2, vec![
///     1.0, 2.0, 3.0,
///     4.0, 5.0, 6.0
/// ]).unwrap();
///
/// assert_eq!(image, equivalent);
/// ```
#[macro_export]
macro_rules! float_image {
    () => {{
        use image::{ImageBuffer, Luma};
        ImageBuffer::<Luma<f32>, Vec<f32>>::new(0, 0)
    }};
    ($( $( $x: expr ),*);*) => {{
        let data_as_nested_array = [ $( [ $($x as f32),* ] ),* ];
        $crate::float_image_from_nested_array!(data_as_nested_array, f32)
    }};
}

/// Helper for defining greyscale images with f64 subpixels. Columns are
/// separated by commas and rows by semi-colons.
///
/// See the [`float_image`](crate::float_image) documentation for examples.
#[macro_export]
macro_rules! float_image_f64 {
    () => {{
        use image::{ImageBuffer, Luma};
        ImageBuffer::<Luma<f64>, Vec<f64>>::new(0, 0)
    }};
    ($( $( $x: expr ),*);*) => {{
        let data_as_nested_array = [ $( [ $($x as f64),* ] ),* ];
        $crate::float_image_from_nested_array!(data_as_nested_array, f64)
    }};
}

/// Panics if any cells differ between the two buffers. NaNs in matching
/// positions count as equal.
#[macro_export]
macro_rules! assert_buffers_eq {
    ($actual:expr, $expected:expr) => {{
        match $crate::utils::buffer_diff_summary(&$actual[..], &$expected[..]) {
            None => {}
            Some(err) => panic!("{}", err),
        }
    }};
}

/// Human readable description of some of the cells that differ between
/// two buffers, or None if all cells match. NaNs in matching positions
/// count as equal.
pub fn buffer_diff_summary<T>(actual: &[T], expected: &[T]) -> Option<String>
where
    T: Sample + fmt::Debug,
{
    if actual.len() != expected.len() {
        return Some(format!(
            "lengths do not match. actual: {}, expected: {}",
            actual.len(),
            expected.len()
        ));
    }

    let diffs = actual
        .iter()
        .zip(expected.iter())
        .enumerate()
        .filter(|(_, (a, e))| !(a == e || (a.is_nan() && e.is_nan())))
        .take(5)
        .map(|(i, (a, e))| format!("\nindex {i}: actual {a:?}, expected {e:?}"))
        .collect::<Vec<_>>();

    if diffs.is_empty() {
        return None;
    }
    Some(format!("buffers do not match. {}", diffs.join("")))
}

/// Floating-point image to use in tests and benchmarks. This is neither
/// noise nor similar to natural images - it's just a convenience method
/// to produce an image that's not constant, with plenty of repeated
/// values.
pub fn float_bench_image(width: usize, height: usize) -> Vec<f32> {
    let mut image = vec![0.0; width * height];
    for y in 0..height {
        for x in 0..width {
            image[y * width + x] = (x % 7 + y % 6) as f32;
        }
    }
    image
}

/// Reference implementation of the median filter - written to be as
/// simple as possible, to validate faster versions against.
///
/// Sorts the full window at every cell. NaN samples are dropped from each
/// window; an empty window yields NaN.
pub fn reference_median_filter_2d<T: Sample>(
    width: usize,
    height: usize,
    x_radius: usize,
    y_radius: usize,
    input: &[T],
) -> Vec<T> {
    assert_eq!(input.len(), width * height);
    let mut out = vec![T::nan(); input.len()];
    let mut neighbours = Vec::with_capacity((2 * x_radius + 1) * (2 * y_radius + 1));

    for y in 0..height {
        for x in 0..width {
            neighbours.clear();
            for wy in y.saturating_sub(y_radius)..(y + y_radius + 1).min(height) {
                for wx in x.saturating_sub(x_radius)..(x + x_radius + 1).min(width) {
                    let v = input[wy * width + wx];
                    if !v.is_nan() {
                        neighbours.push(v);
                    }
                }
            }
            neighbours.sort_unstable_by(|a, b| a.total_order(*b));

            let n = neighbours.len();
            out[y * width + x] = if n == 0 {
                T::nan()
            } else if n % 2 == 1 {
                neighbours[n / 2]
            } else {
                (neighbours[n / 2 - 1] + neighbours[n / 2]) / (T::one() + T::one())
            };
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_image_layout() {
        let image = float_image!(
            1.0, 2.0;
            3.0, 4.0;
            5.0, 6.0);
        assert_eq!(image.dimensions(), (2, 3));
        assert_eq!(image.get_pixel(1, 2)[0], 6.0);
    }

    #[test]
    fn test_buffer_diff_summary_matches() {
        assert_eq!(buffer_diff_summary(&[1.0f32, f32::NAN], &[1.0, f32::NAN]), None);
    }

    #[test]
    fn test_buffer_diff_summary_reports_mismatch() {
        let summary = buffer_diff_summary(&[1.0f32, 2.0], &[1.0, 3.0]).unwrap();
        assert!(summary.contains("index 1"));
    }

    #[test]
    #[should_panic]
    fn test_assert_buffers_eq_fails() {
        assert_buffers_eq!([1.0f64, 2.0], [1.0, 2.5]);
    }

    #[test]
    fn test_reference_median_filter_2d() {
        let out = reference_median_filter_2d(5, 1, 1, 0, &[1.0f64, 5.0, 2.0, 4.0, 3.0]);
        assert_eq!(out, vec![3.0, 2.0, 4.0, 3.0, 3.5]);
    }

    #[test]
    fn test_reference_median_filter_2d_excludes_nans() {
        let out = reference_median_filter_2d(4, 1, 1, 0, &[f32::NAN, 2.0, f32::NAN, 4.0]);
        assert_eq!(out, vec![2.0, 2.0, 3.0, 4.0]);
    }
}

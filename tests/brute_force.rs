//! Compares the block-decomposed filter to a simple sort-based reference
//! through the public API.

use blockmedian::utils::{float_bench_image, reference_median_filter_2d};
use blockmedian::{assert_buffers_eq, median_filter, median_filter_2d};
use image::{ImageBuffer, Luma};

/// Deterministic pseudo-random samples, roughly one in eight NaN.
fn noisy_image(width: usize, height: usize, seed: u64) -> Vec<f64> {
    let mut state = seed.wrapping_mul(0x9e37_79b9_7f4a_7c15) | 1;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        state
    };
    (0..width * height)
        .map(|_| {
            let bits = next();
            if bits % 8 == 0 {
                f64::NAN
            } else {
                // Coarse grid so that equal values are common.
                ((bits >> 32) % 64) as f64 / 4.0 - 8.0
            }
        })
        .collect()
}

#[test]
fn matches_reference_on_small_images() {
    for height in 1..10 {
        for width in 1..12 {
            let input: Vec<f64> = float_bench_image(width, height)
                .iter()
                .map(|&v| f64::from(v))
                .collect();
            for hx in 0..4 {
                for hy in 0..4 {
                    let expected = reference_median_filter_2d(width, height, hx, hy, &input);
                    let mut actual = vec![0.0; input.len()];
                    median_filter_2d(width, height, hx, hy, 0, &input, &mut actual).unwrap();
                    assert_buffers_eq!(actual, expected);
                }
            }
        }
    }
}

#[test]
fn matches_reference_on_noisy_images() {
    for (width, height, hx, hy, seed) in [
        (37, 23, 2, 5, 1),
        (64, 48, 5, 5, 2),
        (30, 30, 7, 1, 3),
        (101, 17, 3, 0, 4),
    ] {
        let input = noisy_image(width, height, seed);
        let expected = reference_median_filter_2d(width, height, hx, hy, &input);
        let mut actual = vec![0.0; input.len()];
        median_filter_2d(width, height, hx, hy, 0, &input, &mut actual).unwrap();
        assert_buffers_eq!(actual, expected);
    }
}

#[test]
fn block_size_matches_default_on_larger_image() {
    let input = noisy_image(120, 90, 5);
    let mut baseline = vec![0.0; input.len()];
    median_filter_2d(120, 90, 7, 7, 0, &input, &mut baseline).unwrap();
    for b in [16, 33, 128] {
        let mut actual = vec![0.0; input.len()];
        median_filter_2d(120, 90, 7, 7, b, &input, &mut actual).unwrap();
        assert_buffers_eq!(actual, baseline);
    }
}

#[test]
fn image_wrapper_matches_raw_buffer_entry_point() {
    let raw = float_bench_image(25, 19);
    let image = ImageBuffer::<Luma<f32>, Vec<f32>>::from_raw(25, 19, raw.clone()).unwrap();

    let filtered = median_filter(&image, 3, 2);
    let mut expected = vec![0.0f32; raw.len()];
    median_filter_2d(25, 19, 3, 2, 0, &raw, &mut expected).unwrap();

    assert_buffers_eq!(filtered.into_raw(), expected);
}

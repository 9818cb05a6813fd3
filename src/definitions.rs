//! Trait definitions and type aliases.

use image::{ImageBuffer, Pixel};
use num::Float;
use std::cmp::Ordering;

/// An `ImageBuffer` containing Pixels of type P with storage `Vec<P::Subpixel>`.
pub type Image<P> = ImageBuffer<P, Vec<<P as Pixel>::Subpixel>>;

/// Floating-point sample types the median engine operates on.
///
/// The engine tracks ranks rather than values, so all it requires of a
/// sample type is NaN detection, arithmetic for the mean of the two middle
/// values of an even-sized window, and a total order under which ranks are
/// reproducible. Implemented for `f32` and `f64`.
pub trait Sample: Float + Send + Sync {
    /// Total ordering consistent with IEEE 754 `totalOrder`.
    ///
    /// Unlike `PartialOrd`, this orders every pair of values, including
    /// `-0.0 < +0.0`, which keeps rank assignment deterministic without
    /// special-casing ties on value.
    fn total_order(self, other: Self) -> Ordering;
}

macro_rules! implement_sample {
    ( $($t:ty),* ) => {
        $(
            impl Sample for $t {
                fn total_order(self, other: $t) -> Ordering {
                    self.total_cmp(&other)
                }
            }
        )*
    };
}

implement_sample!(f32, f64);

#[cfg(test)]
mod tests {
    use super::Sample;
    use std::cmp::Ordering;

    #[test]
    fn test_total_order_orders_zeros() {
        assert_eq!((-0.0f32).total_order(0.0f32), Ordering::Less);
        assert_eq!(0.0f64.total_order(-0.0f64), Ordering::Greater);
    }

    #[test]
    fn test_total_order_agrees_with_partial_ord_on_finite_values() {
        let values = [-3.5f64, -1.0, 0.0, 0.25, 2.0, 1e300];
        for &a in &values {
            for &b in &values {
                assert_eq!(a.total_order(b), a.partial_cmp(&b).unwrap());
            }
        }
    }
}

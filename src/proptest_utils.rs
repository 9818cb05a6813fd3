use proptest::{
    prelude::*,
    sample::SizeRange,
    strategy::{BoxedStrategy, Strategy},
};
use std::{fmt, ops::RangeInclusive};

/// A rectangular sample buffer together with its dimensions, row-major
/// with x fastest.
#[derive(Clone, Debug)]
pub(crate) struct ArbitraryBuffer<T> {
    pub width: usize,
    pub height: usize,
    pub data: Vec<T>,
}

/// Create a strategy to generate arbitrary buffers with dimensions
/// selected within the specified ranges.
///
/// Samples are drawn from a coarse grid of finite values, so that ties
/// occur routinely, with NaNs mixed in.
pub(crate) fn arbitrary_buffer(
    width_range: impl Into<SizeRange>,
    height_range: impl Into<SizeRange>,
) -> BoxedStrategy<ArbitraryBuffer<f64>> {
    let samples = prop_oneof![
        4 => (-24i32..24).prop_map(|v| f64::from(v) / 2.0),
        1 => Just(f64::NAN),
    ];
    arbitrary_buffer_with(samples, width_range, height_range)
}

/// Create a strategy to generate buffers with a given sample strategy and
/// dimensions selected within the specified ranges.
pub(crate) fn arbitrary_buffer_with<T>(
    samples: impl Strategy<Value = T> + Clone + 'static,
    width_range: impl Into<SizeRange>,
    height_range: impl Into<SizeRange>,
) -> BoxedStrategy<ArbitraryBuffer<T>>
where
    T: fmt::Debug + 'static,
{
    dims(width_range, height_range)
        .prop_flat_map(move |(width, height)| {
            let data = proptest::collection::vec(samples.clone(), width * height);
            data.prop_map(move |data| ArbitraryBuffer {
                width,
                height,
                data,
            })
        })
        .boxed()
}

fn dims(
    width: impl Into<SizeRange>,
    height: impl Into<SizeRange>,
) -> BoxedStrategy<(usize, usize)> {
    let width = to_range(width);
    let height = to_range(height);
    width
        .prop_flat_map(move |w| height.clone().prop_map(move |h| (w, h)))
        .boxed()
}

fn to_range(range: impl Into<SizeRange>) -> RangeInclusive<usize> {
    let range = range.into();
    range.start()..=range.end_incl()
}

#[cfg(not(miri))]
mod proptests {
    use super::*;

    proptest! {
        #[test]
        fn test_arbitrary_fixed_buffer(buffer in arbitrary_buffer(3, 7)) {
            assert_eq!(buffer.width, 3);
            assert_eq!(buffer.height, 7);
            assert_eq!(buffer.data.len(), 21);
        }

        #[test]
        fn test_arbitrary_buffer_dims(buffer in arbitrary_buffer(1..30, 2..=15)) {
            assert!((1..30).contains(&buffer.width));
            assert!((2..=15).contains(&buffer.height));
            assert_eq!(buffer.data.len(), buffer.width * buffer.height);
        }
    }
}

//! An efficient 2-d sliding-window median filter for large images and
//! large windows.
//!
//! Each output cell is the median of the input cells inside an
//! axis-aligned window centred on it, clipped at the image boundary. The
//! implementation decomposes the image into overlapping blocks: each
//! block's samples are sorted once, and window membership is then tracked
//! as a bit set over those ranks while a serpentine walk slides the window
//! through the block interior. Per-cell cost is proportional to the window
//! perimeter rather than its area, which is what makes large windows
//! cheap.
//!
//! The main entry points are [`median_filter_2d`] for raw sample buffers
//! and [`median_filter`] for `image` buffers of `f32` or `f64` pixels.
//!
//! # Crate features
//!
//! - `rayon` (enabled by default): processes blocks in parallel. Outputs
//!   are bitwise-identical with and without it, and for every thread
//!   count.

#![deny(missing_docs)]

#[macro_use]
pub mod utils;

mod block;
pub mod definitions;
mod error;
pub mod filter;
mod geometry;
#[cfg(test)]
mod proptest_utils;
mod window;

pub use crate::error::MedianFilterError;
pub use crate::filter::{median_filter, median_filter_2d};

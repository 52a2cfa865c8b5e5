//! Label transforms: joint encoding, offset patterns, pairwise generation,
//! and subsampling.
//!
//! Everything in this module is a pure, stateless transform from input grids
//! to output grids. There is no shared mutable state, so per-image work can
//! run fully in parallel and the two pairwise builds for one image can run
//! concurrently.

pub mod encoder;
pub mod offsets;
pub mod pairwise;
pub mod subsample;

pub use encoder::{decode, encode};
pub use offsets::{Offset, OffsetPattern};
pub use pairwise::generate_pairwise;
pub use subsample::subsample;

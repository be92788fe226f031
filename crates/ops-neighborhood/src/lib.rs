//! Neighborhood mapping over N-dimensional images.
//!
//! A [`Shape`] resolves once per call into relative offsets. For every output
//! position the engine builds a lazy [`Neighborhood`] of the input around
//! that position and stores the reduction's result there. Samples outside the
//! input follow an explicit [`ops_core::BorderMode`].
//!
//! Features:
//! - `rayon`: [`par_map_neighborhood`], a chunked parallel map with
//!   cooperative cancellation. Results are identical to the sequential map.
//! - `serde`: derives for shapes, [`Chunking`] and [`Reducer`].

pub mod chunker;
pub mod map;
pub mod morphology;
pub mod neighborhood;
#[cfg(feature = "rayon")]
pub mod parallel;
pub mod reduce;
pub mod shape;

pub use chunker::{Chunk, ChunkPlan, Chunking};
pub use map::{MapNeighborhood, map_neighborhood, try_map_neighborhood};
pub use morphology::{
    close, close_binary_u8, dilate, dilate_binary_u8, erode, erode_binary_u8, open, open_binary_u8,
};
pub use neighborhood::{Neighborhood, NeighborhoodIter, Sampler};
#[cfg(feature = "rayon")]
pub use parallel::{ParallelMapConfig, par_map_neighborhood};
pub use reduce::{Reducer, map_reduce};
pub use shape::{
    CenteredRectangleShape, DiamondShape, HyperSphereShape, Offsets, RectangleShape, Shape,
};

//! Umbrella crate for the `image-ops` workspace.
//!
//! Re-exports the core array types, convolution, neighborhood mapping and
//! polygon features.

pub use ops_core::*;
pub use ops_fft::*;
pub use ops_geom::*;
pub use ops_neighborhood::*;

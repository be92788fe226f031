//! Foundational primitives for image ops.
//!
//! ## Arrays and Views
//! Images are dense N-dimensional boxes of samples. Axis 0 varies fastest.
//! Views use element strides (not byte strides), so borrowed views over
//! padded buffers, crops and hyperslices share storage with their parent.
//!
//! ## Identity
//! [`ViewHandle`] identifies the storage a view reads from: address, layout
//! and the owning image's stamp. Ops that cache derived data key it on the
//! handle, never on sample values.
//!
//! ## Border Modes
//! Out-of-range sampling is explicit: skip, clamp, constant fill, or
//! reflect-101 (mirror around edge samples without repeating them).

mod border;
mod error;
mod geom;
mod image;
mod interval;
mod real;

pub use border::{BorderMode, map_index};
pub use error::Error;
pub use geom::{Point2, Polygon2, Vec2};
pub use image::{
    Cursor, Img, ImgView, ImgViewMut, ViewHandle, ViewIter, contiguous_strides, convert, to_f64,
};
pub use interval::Interval;
pub use real::RealType;

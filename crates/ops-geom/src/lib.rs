//! Polygon shape descriptors: convex hull, area and perimeter ratios.

pub mod features;
pub mod hull;

pub use features::{
    Convexity, FeatureKind, GeometricFeature, Perimeter, PerimeterConvexHull, Size, SizeConvexHull,
    Solidity, compute_feature,
};
pub use hull::convex_hull;

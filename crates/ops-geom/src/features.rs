//! Scalar shape descriptors of a polygon.
//!
//! Composite features (`Solidity`, `Convexity`) hold their component
//! features, resolved once at construction and reused for every polygon.

use ops_core::Polygon2;

use crate::hull::convex_hull;

pub trait GeometricFeature: Send + Sync {
    fn compute(&self, polygon: &Polygon2) -> f64;
}

/// Enclosed area (shoelace).
#[derive(Debug, Clone, Copy, Default)]
pub struct Size;

impl GeometricFeature for Size {
    fn compute(&self, polygon: &Polygon2) -> f64 {
        polygon.area()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Perimeter;

impl GeometricFeature for Perimeter {
    fn compute(&self, polygon: &Polygon2) -> f64 {
        polygon.perimeter()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SizeConvexHull;

impl GeometricFeature for SizeConvexHull {
    fn compute(&self, polygon: &Polygon2) -> f64 {
        convex_hull(&polygon.vertices).area()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PerimeterConvexHull;

impl GeometricFeature for PerimeterConvexHull {
    fn compute(&self, polygon: &Polygon2) -> f64 {
        convex_hull(&polygon.vertices).perimeter()
    }
}

/// `size / convex hull size`, in `(0, 1]` for simple polygons.
pub struct Solidity {
    size: Box<dyn GeometricFeature>,
    hull_size: Box<dyn GeometricFeature>,
}

impl Solidity {
    pub fn new() -> Self {
        Self::with_features(Box::new(Size), Box::new(SizeConvexHull))
    }

    pub fn with_features(
        size: Box<dyn GeometricFeature>,
        hull_size: Box<dyn GeometricFeature>,
    ) -> Self {
        Self { size, hull_size }
    }
}

impl Default for Solidity {
    fn default() -> Self {
        Self::new()
    }
}

impl GeometricFeature for Solidity {
    fn compute(&self, polygon: &Polygon2) -> f64 {
        ratio(self.size.compute(polygon), self.hull_size.compute(polygon))
    }
}

/// `convex hull perimeter / perimeter`, in `(0, 1]` for simple polygons.
pub struct Convexity {
    perimeter: Box<dyn GeometricFeature>,
    hull_perimeter: Box<dyn GeometricFeature>,
}

impl Convexity {
    pub fn new() -> Self {
        Self::with_features(Box::new(Perimeter), Box::new(PerimeterConvexHull))
    }

    pub fn with_features(
        perimeter: Box<dyn GeometricFeature>,
        hull_perimeter: Box<dyn GeometricFeature>,
    ) -> Self {
        Self {
            perimeter,
            hull_perimeter,
        }
    }
}

impl Default for Convexity {
    fn default() -> Self {
        Self::new()
    }
}

impl GeometricFeature for Convexity {
    fn compute(&self, polygon: &Polygon2) -> f64 {
        ratio(
            self.hull_perimeter.compute(polygon),
            self.perimeter.compute(polygon),
        )
    }
}

fn ratio(num: f64, den: f64) -> f64 {
    if den == 0.0 { f64::NAN } else { num / den }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    Size,
    Perimeter,
    SizeConvexHull,
    PerimeterConvexHull,
    Solidity,
    Convexity,
}

impl FeatureKind {
    pub const ALL: [FeatureKind; 6] = [
        FeatureKind::Size,
        FeatureKind::Perimeter,
        FeatureKind::SizeConvexHull,
        FeatureKind::PerimeterConvexHull,
        FeatureKind::Solidity,
        FeatureKind::Convexity,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FeatureKind::Size => "size",
            FeatureKind::Perimeter => "perimeter",
            FeatureKind::SizeConvexHull => "size_convex_hull",
            FeatureKind::PerimeterConvexHull => "perimeter_convex_hull",
            FeatureKind::Solidity => "solidity",
            FeatureKind::Convexity => "convexity",
        }
    }

    pub fn feature(self) -> Box<dyn GeometricFeature> {
        match self {
            FeatureKind::Size => Box::new(Size),
            FeatureKind::Perimeter => Box::new(Perimeter),
            FeatureKind::SizeConvexHull => Box::new(SizeConvexHull),
            FeatureKind::PerimeterConvexHull => Box::new(PerimeterConvexHull),
            FeatureKind::Solidity => Box::new(Solidity::new()),
            FeatureKind::Convexity => Box::new(Convexity::new()),
        }
    }
}

pub fn compute_feature(kind: FeatureKind, polygon: &Polygon2) -> f64 {
    kind.feature().compute(polygon)
}

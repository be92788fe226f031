//! Neighborhood shapes.
//!
//! A shape is a dimension-agnostic description that resolves, once per
//! operation, into the concrete list of relative [`Offsets`] for a given
//! dimensionality. Offsets are enumerated over the shape's bounding box in
//! flat order (axis 0 fastest), so every shape visits its samples in a
//! deterministic order.

use ops_core::Error;

/// Relative sample offsets of a resolved shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Offsets {
    num_dims: usize,
    flat: Vec<isize>,
    min: Vec<isize>,
    max: Vec<isize>,
}

impl Offsets {
    /// Builds offsets from `num_dims`-long coordinate tuples laid out back to
    /// back.
    pub fn from_flat(num_dims: usize, flat: Vec<isize>) -> Result<Self, Error> {
        if num_dims == 0 {
            return Err(Error::InvalidParameter("shape needs at least one axis"));
        }
        if flat.len() % num_dims != 0 {
            return Err(Error::SizeMismatch {
                expected: flat.len().div_ceil(num_dims) * num_dims,
                actual: flat.len(),
            });
        }

        let mut min = vec![0isize; num_dims];
        let mut max = vec![0isize; num_dims];
        if !flat.is_empty() {
            min.copy_from_slice(&flat[..num_dims]);
            max.copy_from_slice(&flat[..num_dims]);
        }
        for off in flat.chunks_exact(num_dims) {
            for d in 0..num_dims {
                min[d] = min[d].min(off[d]);
                max[d] = max[d].max(off[d]);
            }
        }

        Ok(Self {
            num_dims,
            flat,
            min,
            max,
        })
    }

    pub fn num_dims(&self) -> usize {
        self.num_dims
    }

    /// Number of offsets.
    pub fn len(&self) -> usize {
        self.flat.len() / self.num_dims
    }

    pub fn is_empty(&self) -> bool {
        self.flat.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&[isize]> {
        let start = i.checked_mul(self.num_dims)?;
        self.flat.get(start..start + self.num_dims)
    }

    pub fn iter(&self) -> impl Iterator<Item = &[isize]> {
        self.flat.chunks_exact(self.num_dims)
    }

    /// Per-axis minimum offset (zero for an empty shape).
    pub fn min(&self) -> &[isize] {
        &self.min
    }

    /// Per-axis maximum offset (zero for an empty shape).
    pub fn max(&self) -> &[isize] {
        &self.max
    }

    /// Linear storage offsets for the given strides.
    pub fn linear(&self, strides: &[usize]) -> Vec<isize> {
        self.iter()
            .map(|off| {
                off.iter()
                    .zip(strides)
                    .map(|(&o, &s)| o * s as isize)
                    .sum()
            })
            .collect()
    }
}

pub trait Shape {
    /// Resolves the shape for arrays of `num_dims` dimensions.
    fn resolve(&self, num_dims: usize) -> Result<Offsets, Error>;
}

impl<S: Shape + ?Sized> Shape for &S {
    fn resolve(&self, num_dims: usize) -> Result<Offsets, Error> {
        (**self).resolve(num_dims)
    }
}

/// Hypercube with the same half-width on every axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RectangleShape {
    pub span: usize,
    pub skip_center: bool,
}

impl RectangleShape {
    pub const fn new(span: usize, skip_center: bool) -> Self {
        Self { span, skip_center }
    }
}

impl Shape for RectangleShape {
    fn resolve(&self, num_dims: usize) -> Result<Offsets, Error> {
        box_offsets(&vec![self.span; num_dims], |off| {
            !(self.skip_center && off.iter().all(|&o| o == 0))
        })
    }
}

/// Box with one half-width per axis. `spans.len()` must match the array
/// dimensionality.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CenteredRectangleShape {
    pub spans: Vec<usize>,
    pub skip_center: bool,
}

impl CenteredRectangleShape {
    pub fn new(spans: &[usize], skip_center: bool) -> Self {
        Self {
            spans: spans.to_vec(),
            skip_center,
        }
    }
}

impl Shape for CenteredRectangleShape {
    fn resolve(&self, num_dims: usize) -> Result<Offsets, Error> {
        Error::check_dims(num_dims, self.spans.len())?;
        box_offsets(&self.spans, |off| {
            !(self.skip_center && off.iter().all(|&o| o == 0))
        })
    }
}

/// Euclidean ball: `sum(o^2) <= radius^2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HyperSphereShape {
    pub radius: usize,
}

impl HyperSphereShape {
    pub const fn new(radius: usize) -> Self {
        Self { radius }
    }
}

impl Shape for HyperSphereShape {
    fn resolve(&self, num_dims: usize) -> Result<Offsets, Error> {
        let r2 = (self.radius * self.radius) as isize;
        box_offsets(&vec![self.radius; num_dims], |off| {
            off.iter().map(|&o| o * o).sum::<isize>() <= r2
        })
    }
}

/// L1 ball: `sum(|o|) <= radius`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiamondShape {
    pub radius: usize,
}

impl DiamondShape {
    pub const fn new(radius: usize) -> Self {
        Self { radius }
    }
}

impl Shape for DiamondShape {
    fn resolve(&self, num_dims: usize) -> Result<Offsets, Error> {
        let r = self.radius as isize;
        box_offsets(&vec![self.radius; num_dims], |off| {
            off.iter().map(|o| o.abs()).sum::<isize>() <= r
        })
    }
}

fn box_offsets(spans: &[usize], keep: impl Fn(&[isize]) -> bool) -> Result<Offsets, Error> {
    let num_dims = spans.len();
    if num_dims == 0 {
        return Err(Error::InvalidParameter("shape needs at least one axis"));
    }

    let mut flat = Vec::new();
    let mut off: Vec<isize> = spans.iter().map(|&s| -(s as isize)).collect();
    'outer: loop {
        if keep(&off) {
            flat.extend_from_slice(&off);
        }
        for d in 0..num_dims {
            off[d] += 1;
            if off[d] <= spans[d] as isize {
                continue 'outer;
            }
            off[d] = -(spans[d] as isize);
        }
        break;
    }
    Offsets::from_flat(num_dims, flat)
}

#[cfg(test)]
mod tests {
    use ops_core::Error;

    use super::{CenteredRectangleShape, DiamondShape, HyperSphereShape, RectangleShape, Shape};

    #[test]
    fn rectangle_enumerates_axis0_first() {
        let offsets = RectangleShape::new(1, false).resolve(2).expect("valid shape");
        assert_eq!(offsets.len(), 9);
        assert_eq!(offsets.get(0), Some(&[-1, -1][..]));
        assert_eq!(offsets.get(1), Some(&[0, -1][..]));
        assert_eq!(offsets.get(4), Some(&[0, 0][..]));
        assert_eq!(offsets.get(8), Some(&[1, 1][..]));
        assert_eq!(offsets.get(9), None);
        assert_eq!(offsets.min(), &[-1, -1]);
        assert_eq!(offsets.max(), &[1, 1]);
    }

    #[test]
    fn skip_center_drops_origin() {
        let offsets = RectangleShape::new(1, true).resolve(3).expect("valid shape");
        assert_eq!(offsets.len(), 26);
        assert!(offsets.iter().all(|o| o.iter().any(|&v| v != 0)));

        let single = RectangleShape::new(0, true).resolve(2).expect("valid shape");
        assert!(single.is_empty());
        assert_eq!(single.min(), &[0, 0]);
    }

    #[test]
    fn centered_rectangle_checks_dimensionality() {
        let shape = CenteredRectangleShape::new(&[2, 0], false);
        let offsets = shape.resolve(2).expect("valid shape");
        assert_eq!(offsets.len(), 5);
        assert_eq!(offsets.max(), &[2, 0]);
        assert_eq!(
            shape.resolve(3),
            Err(Error::InvalidDimensionality {
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn sphere_and_diamond_sizes() {
        assert_eq!(HyperSphereShape::new(1).resolve(2).expect("valid").len(), 5);
        assert_eq!(HyperSphereShape::new(2).resolve(2).expect("valid").len(), 13);
        assert_eq!(HyperSphereShape::new(1).resolve(3).expect("valid").len(), 7);
        assert_eq!(DiamondShape::new(2).resolve(2).expect("valid").len(), 13);
        assert_eq!(DiamondShape::new(1).resolve(1).expect("valid").len(), 3);
        assert!(DiamondShape::new(1).resolve(0).is_err());
    }

    #[test]
    fn linear_offsets_follow_strides() {
        let offsets = RectangleShape::new(1, false).resolve(2).expect("valid shape");
        let linear = offsets.linear(&[1, 10]);
        assert_eq!(linear[0], -11);
        assert_eq!(linear[4], 0);
        assert_eq!(linear[5], 1);
        assert_eq!(linear[8], 11);
    }
}

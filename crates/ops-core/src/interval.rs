use crate::Error;

/// Axis-aligned box with inclusive integer bounds.
///
/// An axis with `max == min - 1` has extent zero, so an interval built from
/// dims containing `0` is representable and empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Interval {
    min: Vec<i64>,
    max: Vec<i64>,
}

impl Interval {
    pub fn new(min: Vec<i64>, max: Vec<i64>) -> Result<Self, Error> {
        Error::check_dims(min.len(), max.len())?;
        if min.is_empty() {
            return Err(Error::InvalidParameter("interval needs at least one axis"));
        }
        if min.iter().zip(&max).any(|(&lo, &hi)| hi < lo - 1) {
            return Err(Error::InvalidParameter("interval max must be >= min - 1"));
        }
        Ok(Self { min, max })
    }

    /// Interval `[0, d - 1]` per axis.
    pub fn from_dims(dims: &[usize]) -> Self {
        Self {
            min: vec![0; dims.len()],
            max: dims.iter().map(|&d| d as i64 - 1).collect(),
        }
    }

    pub fn num_dims(&self) -> usize {
        self.min.len()
    }

    pub fn min(&self, d: usize) -> i64 {
        self.min[d]
    }

    pub fn max(&self, d: usize) -> i64 {
        self.max[d]
    }

    pub fn mins(&self) -> &[i64] {
        &self.min
    }

    pub fn maxs(&self) -> &[i64] {
        &self.max
    }

    /// Extent along axis `d`.
    pub fn dimension(&self, d: usize) -> usize {
        (self.max[d] - self.min[d] + 1) as usize
    }

    pub fn dims(&self) -> Vec<usize> {
        (0..self.num_dims()).map(|d| self.dimension(d)).collect()
    }

    pub fn num_elements(&self) -> usize {
        (0..self.num_dims()).map(|d| self.dimension(d)).product()
    }

    pub fn is_empty(&self) -> bool {
        self.num_elements() == 0
    }

    pub fn contains(&self, pos: &[i64]) -> bool {
        pos.len() == self.num_dims()
            && pos
                .iter()
                .zip(self.min.iter().zip(&self.max))
                .all(|(&p, (&lo, &hi))| p >= lo && p <= hi)
    }

    /// Returns `None` when the intervals do not overlap.
    pub fn intersect(&self, other: &Interval) -> Result<Option<Interval>, Error> {
        Error::check_dims(self.num_dims(), other.num_dims())?;
        let min: Vec<i64> = self.min.iter().zip(&other.min).map(|(a, b)| *a.max(b)).collect();
        let max: Vec<i64> = self.max.iter().zip(&other.max).map(|(a, b)| *a.min(b)).collect();
        if min.iter().zip(&max).any(|(lo, hi)| hi < lo) {
            return Ok(None);
        }
        Ok(Some(Interval { min, max }))
    }
}

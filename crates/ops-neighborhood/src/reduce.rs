//! Common reductions over a neighborhood.
//!
//! Reductions run in `f64`. Empty neighborhoods (possible with
//! [`BorderMode::Skip`] and `skip_center` shapes) reduce to `0` for `sum` and
//! `count` and to `NaN` otherwise; `NaN` written to an integer output becomes
//! zero.

use ops_core::{BorderMode, Error, ImgView, ImgViewMut, RealType};

use crate::map::map_neighborhood;
use crate::neighborhood::Neighborhood;
use crate::shape::Shape;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Reducer {
    Sum,
    Mean,
    Min,
    Max,
    Median,
    Count,
}

impl Reducer {
    pub fn apply<T: RealType>(self, nb: &Neighborhood<'_, T>) -> f64 {
        self.apply_with(nb, &mut Vec::new())
    }

    /// Same as [`Reducer::apply`]; `scratch` is reused by `Median`.
    pub fn apply_with<T: RealType>(self, nb: &Neighborhood<'_, T>, scratch: &mut Vec<f64>) -> f64 {
        match self {
            Reducer::Sum => sum(nb),
            Reducer::Mean => mean(nb),
            Reducer::Min => min(nb).map_or(f64::NAN, RealType::as_f64),
            Reducer::Max => max(nb).map_or(f64::NAN, RealType::as_f64),
            Reducer::Median => median_with(nb, scratch),
            Reducer::Count => count(nb) as f64,
        }
    }
}

pub fn sum<T: RealType>(nb: &Neighborhood<'_, T>) -> f64 {
    nb.iter().map(|v| v.as_f64()).sum()
}

pub fn mean<T: RealType>(nb: &Neighborhood<'_, T>) -> f64 {
    let (acc, n) = nb
        .iter()
        .fold((0.0f64, 0usize), |(acc, n), v| (acc + v.as_f64(), n + 1));
    if n == 0 { f64::NAN } else { acc / n as f64 }
}

pub fn min<T: RealType>(nb: &Neighborhood<'_, T>) -> Option<T> {
    nb.iter()
        .copied()
        .reduce(|a, b| if b < a { b } else { a })
}

pub fn max<T: RealType>(nb: &Neighborhood<'_, T>) -> Option<T> {
    nb.iter()
        .copied()
        .reduce(|a, b| if b > a { b } else { a })
}

pub fn median<T: RealType>(nb: &Neighborhood<'_, T>) -> f64 {
    median_with(nb, &mut Vec::new())
}

/// Middle sample; the mean of the two middle samples for even counts.
pub fn median_with<T: RealType>(nb: &Neighborhood<'_, T>, scratch: &mut Vec<f64>) -> f64 {
    scratch.clear();
    scratch.extend(nb.iter().map(|v| v.as_f64()));
    let n = scratch.len();
    if n == 0 {
        return f64::NAN;
    }

    let mid = n / 2;
    let (lower, upper, _) = scratch.select_nth_unstable_by(mid, f64::total_cmp);
    let upper = *upper;
    if n % 2 == 1 {
        return upper;
    }
    let below = lower.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    0.5 * (below + upper)
}

pub fn count<T>(nb: &Neighborhood<'_, T>) -> usize {
    nb.iter().count()
}

/// Maps `reducer` over every output position.
pub fn map_reduce<I, O, S>(
    input: &ImgView<'_, I>,
    output: &mut ImgViewMut<'_, O>,
    shape: &S,
    border: &BorderMode<I>,
    reducer: Reducer,
) -> Result<(), Error>
where
    I: RealType,
    O: RealType,
    S: Shape + ?Sized,
{
    let mut scratch = Vec::new();
    map_neighborhood(input, output, shape, border, |nb| {
        O::from_f64(reducer.apply_with(nb, &mut scratch))
    })
}

//! Sequential neighborhood mapping.
//!
//! The output defines the iteration domain: every output position `c` is
//! visited exactly once, in flat order (axis 0 fastest), and receives
//! `func(neighborhood of input centered at c)`.

use ops_core::{BorderMode, Error, ImgView, ImgViewMut};

use crate::neighborhood::{Neighborhood, Sampler};
use crate::shape::Shape;

pub fn map_neighborhood<I, O, S, F>(
    input: &ImgView<'_, I>,
    output: &mut ImgViewMut<'_, O>,
    shape: &S,
    border: &BorderMode<I>,
    mut func: F,
) -> Result<(), Error>
where
    S: Shape + ?Sized,
    F: FnMut(&Neighborhood<'_, I>) -> O,
{
    try_map_neighborhood(input, output, shape, border, |nb| Ok::<O, Error>(func(nb)))
}

/// Fallible variant of [`map_neighborhood`].
///
/// The first error returned by `func` stops the walk. Positions written
/// before it keep their new values.
pub fn try_map_neighborhood<I, O, S, F, E>(
    input: &ImgView<'_, I>,
    output: &mut ImgViewMut<'_, O>,
    shape: &S,
    border: &BorderMode<I>,
    mut func: F,
) -> Result<(), E>
where
    S: Shape + ?Sized,
    F: FnMut(&Neighborhood<'_, I>) -> Result<O, E>,
    E: From<Error>,
{
    Error::check_dims(input.num_dims(), output.num_dims())?;
    let sampler = Sampler::new(input, shape.resolve(input.num_dims())?, border)?;
    log::trace!(
        "neighborhood map: {} positions, {} offsets",
        output.num_elements(),
        sampler.offsets().len()
    );

    let mut cursor = output.cursor();
    let storage = output.storage_mut();
    while !cursor.is_done() {
        let value = func(&sampler.at(cursor.position()))?;
        storage[cursor.offset()] = value;
        cursor.fwd();
    }
    Ok(())
}

/// Neighborhood map as a reusable op: shape, border and reduction are bound
/// once, [`MapNeighborhood::compute`] runs it on any input/output pair.
#[derive(Debug, Clone)]
pub struct MapNeighborhood<S, T, F> {
    shape: S,
    border: BorderMode<T>,
    func: F,
}

impl<S: Shape, T, F> MapNeighborhood<S, T, F> {
    pub fn new(shape: S, border: BorderMode<T>, func: F) -> Self {
        Self {
            shape,
            border,
            func,
        }
    }

    pub fn shape(&self) -> &S {
        &self.shape
    }

    pub fn border(&self) -> &BorderMode<T> {
        &self.border
    }

    pub fn function(&self) -> &F {
        &self.func
    }

    pub fn set_function(&mut self, func: F) {
        self.func = func;
    }

    pub fn compute<O>(
        &mut self,
        input: &ImgView<'_, T>,
        output: &mut ImgViewMut<'_, O>,
    ) -> Result<(), Error>
    where
        F: FnMut(&Neighborhood<'_, T>) -> O,
    {
        map_neighborhood(input, output, &self.shape, &self.border, &mut self.func)
    }
}

#[cfg(test)]
mod tests {
    use ops_core::{BorderMode, Error, Img};

    use super::{MapNeighborhood, map_neighborhood, try_map_neighborhood};
    use crate::neighborhood::Neighborhood;
    use crate::shape::{CenteredRectangleShape, RectangleShape};

    #[test]
    fn sum_with_skip_border() {
        let img = Img::from_vec(&[5], vec![1i32, 2, 3, 4, 5]).expect("valid image");
        let mut out = Img::new_fill(&[5], 0i32);
        map_neighborhood(
            &img.as_view(),
            &mut out.as_view_mut(),
            &RectangleShape::new(1, false),
            &BorderMode::Skip,
            |nb| nb.iter().sum(),
        )
        .expect("valid map");
        assert_eq!(out.data(), &[3, 6, 9, 12, 9]);
    }

    #[test]
    fn visits_in_flat_order_once() {
        let img = Img::new_fill(&[3, 2], 0u8);
        let mut out = Img::new_fill(&[3, 2], usize::MAX);
        let mut seen = Vec::new();
        let mut counter = 0usize;
        map_neighborhood(
            &img.as_view(),
            &mut out.as_view_mut(),
            &RectangleShape::new(0, false),
            &BorderMode::Skip,
            |nb| {
                seen.push(nb.center().to_vec());
                counter += 1;
                counter - 1
            },
        )
        .expect("valid map");
        assert_eq!(out.data(), &[0, 1, 2, 3, 4, 5]);
        assert_eq!(seen[1], vec![1, 0]);
        assert_eq!(seen[3], vec![0, 1]);
    }

    #[test]
    fn output_may_be_a_strided_crop() {
        let img = Img::from_fn(&[4, 4], |p| (p[0] + 4 * p[1]) as f32).expect("valid image");
        let mut out = Img::new_fill(&[4, 4], -1.0f32);
        let mut full = out.as_view_mut();
        let interval = ops_core::Interval::new(vec![0, 0], vec![1, 1]).expect("valid interval");
        let mut crop = full.crop_mut(&interval).expect("valid crop");
        map_neighborhood(
            &img.as_view(),
            &mut crop,
            &RectangleShape::new(0, false),
            &BorderMode::Skip,
            |nb| *nb.iter().next().expect("center sample"),
        )
        .expect("valid map");
        assert_eq!(&out.data()[..6], &[0.0, 1.0, -1.0, -1.0, 4.0, 5.0]);
    }

    #[test]
    fn errors_stop_without_rollback() {
        #[derive(Debug, PartialEq)]
        enum ReduceError {
            Core(Error),
            Negative(usize),
        }
        impl From<Error> for ReduceError {
            fn from(e: Error) -> Self {
                ReduceError::Core(e)
            }
        }

        let img = Img::from_vec(&[4], vec![1i32, 2, -3, 4]).expect("valid image");
        let mut out = Img::new_fill(&[4], 0i32);
        let err = try_map_neighborhood(
            &img.as_view(),
            &mut out.as_view_mut(),
            &RectangleShape::new(0, false),
            &BorderMode::Skip,
            |nb| {
                let v = *nb.iter().next().expect("center sample");
                if v < 0 {
                    Err(ReduceError::Negative(nb.center()[0]))
                } else {
                    Ok(v * 10)
                }
            },
        );
        assert_eq!(err, Err(ReduceError::Negative(2)));
        assert_eq!(out.data(), &[10, 20, 0, 0]);

        let bad = try_map_neighborhood(
            &img.as_view(),
            &mut out.as_view_mut(),
            &CenteredRectangleShape::new(&[1, 1], false),
            &BorderMode::Skip,
            |_| Ok::<i32, ReduceError>(0),
        );
        assert_eq!(
            bad,
            Err(ReduceError::Core(Error::InvalidDimensionality {
                expected: 1,
                actual: 2
            }))
        );
    }

    #[test]
    fn dimensionality_mismatch() {
        let img = Img::new_fill(&[4, 4], 1u8);
        let mut out = Img::new_fill(&[16], 0u8);
        let err = map_neighborhood(
            &img.as_view(),
            &mut out.as_view_mut(),
            &RectangleShape::new(1, false),
            &BorderMode::Skip,
            |_| 1u8,
        );
        assert_eq!(
            err,
            Err(Error::InvalidDimensionality {
                expected: 2,
                actual: 1
            })
        );
        assert!(out.data().iter().all(|&v| v == 0));
    }

    fn sum(nb: &Neighborhood<'_, f64>) -> f64 {
        nb.iter().sum()
    }

    fn max(nb: &Neighborhood<'_, f64>) -> f64 {
        nb.iter().copied().fold(f64::MIN, f64::max)
    }

    #[test]
    fn op_struct_swaps_function() {
        let img = Img::from_vec(&[3], vec![1.0f64, 2.0, 3.0]).expect("valid image");
        let mut out = Img::new_fill(&[3], 0.0f64);
        let mut op = MapNeighborhood::new(
            RectangleShape::new(1, false),
            BorderMode::Clamp,
            sum as fn(&Neighborhood<'_, f64>) -> f64,
        );
        op.compute(&img.as_view(), &mut out.as_view_mut())
            .expect("valid map");
        assert_eq!(out.data(), &[4.0, 6.0, 8.0]);

        op.set_function(max);
        op.compute(&img.as_view(), &mut out.as_view_mut())
            .expect("valid map");
        assert_eq!(out.data(), &[2.0, 3.0, 3.0]);
        assert_eq!(op.shape().span, 1);
    }
}

use ops_core::{BorderMode, Error, ImgView, map_index};

use crate::shape::Offsets;

/// Resolves neighborhoods of one input for a fixed shape and border.
///
/// Built once per operation; [`Sampler::at`] is cheap and allocation free.
#[derive(Debug)]
pub struct Sampler<'a, T> {
    storage: &'a [T],
    dims: Vec<usize>,
    strides: Vec<usize>,
    offsets: Offsets,
    linear: Vec<isize>,
    border: &'a BorderMode<T>,
}

impl<'a, T> Sampler<'a, T> {
    pub fn new(
        input: &ImgView<'a, T>,
        offsets: Offsets,
        border: &'a BorderMode<T>,
    ) -> Result<Self, Error> {
        Error::check_dims(input.num_dims(), offsets.num_dims())?;
        let linear = offsets.linear(input.strides());
        Ok(Self {
            storage: input.storage(),
            dims: input.dims().to_vec(),
            strides: input.strides().to_vec(),
            offsets,
            linear,
            border,
        })
    }

    pub fn offsets(&self) -> &Offsets {
        &self.offsets
    }

    pub fn num_dims(&self) -> usize {
        self.dims.len()
    }

    /// Neighborhood centered at `center` (input coordinates). Centers outside
    /// the input are allowed; every sample then goes through the border.
    pub fn at<'s>(&'s self, center: &'s [usize]) -> Neighborhood<'s, T> {
        debug_assert_eq!(center.len(), self.dims.len());
        let interior = center
            .iter()
            .zip(&self.dims)
            .zip(self.offsets.min().iter().zip(self.offsets.max()))
            .all(|((&c, &n), (&lo, &hi))| {
                let c = c as isize;
                c + lo >= 0 && c + hi < n as isize
            });
        let center_offset = if interior {
            center.iter().zip(&self.strides).map(|(&c, &s)| c * s).sum()
        } else {
            0
        };

        Neighborhood {
            sampler: self,
            center,
            center_offset,
            interior,
        }
    }
}

/// Lazy, read-only view of the samples around one center.
///
/// Nothing is copied: iteration yields references into the input storage, or
/// to the border constant for [`BorderMode::Constant`]. With
/// [`BorderMode::Skip`] out-of-range samples are left out, so the number of
/// yielded samples can be smaller than the shape.
#[derive(Debug)]
pub struct Neighborhood<'s, T> {
    sampler: &'s Sampler<'s, T>,
    center: &'s [usize],
    center_offset: usize,
    interior: bool,
}

impl<T> Clone for Neighborhood<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Neighborhood<'_, T> {}

impl<'s, T> Neighborhood<'s, T> {
    pub fn center(&self) -> &'s [usize] {
        self.center
    }

    /// True when the whole shape lies inside the input.
    pub fn is_interior(&self) -> bool {
        self.interior
    }

    /// Number of offsets in the shape, independent of the border.
    pub fn shape_len(&self) -> usize {
        self.sampler.offsets.len()
    }

    pub fn iter(&self) -> NeighborhoodIter<'s, T> {
        NeighborhoodIter {
            nb: *self,
            next: 0,
        }
    }
}

impl<'s, T> IntoIterator for &Neighborhood<'s, T> {
    type Item = &'s T;
    type IntoIter = NeighborhoodIter<'s, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct NeighborhoodIter<'s, T> {
    nb: Neighborhood<'s, T>,
    next: usize,
}

impl<'s, T> Iterator for NeighborhoodIter<'s, T> {
    type Item = &'s T;

    fn next(&mut self) -> Option<Self::Item> {
        let s = self.nb.sampler;
        while self.next < s.offsets.len() {
            let i = self.next;
            self.next += 1;

            if self.nb.interior {
                let idx = self.nb.center_offset as isize + s.linear[i];
                return s.storage.get(idx as usize);
            }

            let off = s.offsets.get(i)?;
            let mut idx = Some(0usize);
            for (d, &o) in off.iter().enumerate() {
                let p = self.nb.center[d] as isize + o;
                idx = match (idx, map_index(p, s.dims[d], s.border)) {
                    (Some(acc), Some(j)) => Some(acc + j * s.strides[d]),
                    _ => None,
                };
            }
            match idx {
                Some(idx) => return s.storage.get(idx),
                None => {
                    if let BorderMode::Constant(v) = s.border {
                        return Some(v);
                    }
                }
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rem = self.nb.sampler.offsets.len() - self.next;
        if self.nb.interior {
            (rem, Some(rem))
        } else {
            (0, Some(rem))
        }
    }
}

#[cfg(test)]
mod tests {
    use ops_core::{BorderMode, Img};

    use super::Sampler;
    use crate::shape::{RectangleShape, Shape};

    fn values(sampler: &Sampler<'_, i32>, center: &[usize]) -> Vec<i32> {
        sampler.at(center).iter().copied().collect()
    }

    #[test]
    fn border_modes_at_left_edge() {
        let img = Img::from_vec(&[4], vec![1, 2, 3, 4]).expect("valid image");
        let view = img.as_view();
        let offsets = RectangleShape::new(1, false).resolve(1).expect("valid shape");

        let skip = BorderMode::Skip;
        let s = Sampler::new(&view, offsets.clone(), &skip).expect("valid sampler");
        assert_eq!(values(&s, &[0]), vec![1, 2]);
        assert!(!s.at(&[0]).is_interior());
        assert!(s.at(&[1]).is_interior());
        assert_eq!(values(&s, &[1]), vec![1, 2, 3]);

        let clamp = BorderMode::Clamp;
        let s = Sampler::new(&view, offsets.clone(), &clamp).expect("valid sampler");
        assert_eq!(values(&s, &[0]), vec![1, 1, 2]);

        let constant = BorderMode::Constant(-7);
        let s = Sampler::new(&view, offsets.clone(), &constant).expect("valid sampler");
        assert_eq!(values(&s, &[3]), vec![3, 4, -7]);

        let reflect = BorderMode::Reflect101;
        let s = Sampler::new(&view, offsets, &reflect).expect("valid sampler");
        assert_eq!(values(&s, &[0]), vec![2, 1, 2]);
    }

    #[test]
    fn interior_path_uses_linear_offsets() {
        let img = Img::from_fn(&[6, 5], |p| (p[0] * 10 + p[1]) as i32).expect("valid image");
        let view = img.as_view();
        let offsets = RectangleShape::new(1, true).resolve(2).expect("valid shape");
        let border = BorderMode::Skip;
        let s = Sampler::new(&view, offsets, &border).expect("valid sampler");

        let nb = s.at(&[2, 2]);
        assert!(nb.is_interior());
        assert_eq!(nb.shape_len(), 8);
        assert_eq!(
            nb.iter().copied().collect::<Vec<_>>(),
            vec![11, 21, 31, 12, 32, 13, 23, 33]
        );
    }

    #[test]
    fn strided_crop_samples_parent_storage() {
        let img = Img::from_fn(&[5, 5], |p| (p[0] + 5 * p[1]) as i32).expect("valid image");
        let view = img.as_view();
        let crop = view
            .crop(&ops_core::Interval::new(vec![1, 1], vec![3, 3]).expect("valid interval"))
            .expect("valid crop");
        let offsets = RectangleShape::new(1, false).resolve(2).expect("valid shape");
        let border = BorderMode::Skip;
        let s = Sampler::new(&crop, offsets, &border).expect("valid sampler");
        // Center of the crop is (2, 2) in the parent.
        let sum: i32 = s.at(&[1, 1]).iter().sum();
        assert_eq!(sum, 9 * 12);
        // Corner only sees the crop, never the parent outside it.
        assert_eq!(values(&s, &[0, 0]), vec![6, 7, 11, 12]);
    }

    #[test]
    fn dimensionality_must_match() {
        let img = Img::new_fill(&[3, 3], 0i32);
        let view = img.as_view();
        let offsets = RectangleShape::new(1, false).resolve(3).expect("valid shape");
        let border = BorderMode::Skip;
        assert!(Sampler::new(&view, offsets, &border).is_err());
    }
}

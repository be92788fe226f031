use std::sync::atomic::{AtomicU64, Ordering};

use crate::{Error, Interval, RealType};

static NEXT_STAMP: AtomicU64 = AtomicU64::new(1);

fn next_stamp() -> u64 {
    NEXT_STAMP.fetch_add(1, Ordering::Relaxed)
}

/// Identity of the storage a view reads from.
///
/// Two handles are equal iff they address the same memory with the same
/// layout and stamp. Sample values are never compared.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ViewHandle {
    addr: usize,
    dims: Vec<usize>,
    strides: Vec<usize>,
    stamp: u64,
}

/// Owned, contiguous N-dimensional image. Axis 0 is the fastest varying.
///
/// Every image carries a process-unique stamp. Handing out mutable access
/// renews the stamp, so views taken before and after a mutation have
/// different [`ViewHandle`]s.
#[derive(Debug)]
pub struct Img<T> {
    dims: Vec<usize>,
    data: Vec<T>,
    stamp: u64,
}

impl<T> Img<T> {
    pub fn from_vec(dims: &[usize], data: Vec<T>) -> Result<Self, Error> {
        if dims.is_empty() {
            return Err(Error::InvalidParameter("image needs at least one axis"));
        }

        let expected = checked_product(dims).ok_or(Error::SizeMismatch {
            expected: usize::MAX,
            actual: data.len(),
        })?;

        if data.len() != expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            dims: dims.to_vec(),
            data,
            stamp: next_stamp(),
        })
    }

    pub fn from_fn(dims: &[usize], mut f: impl FnMut(&[usize]) -> T) -> Result<Self, Error> {
        let len = checked_product(dims).ok_or(Error::InvalidParameter("image size overflow"))?;
        let mut data = Vec::with_capacity(len);
        let mut cursor = Cursor::new(dims, &contiguous_strides(dims));
        while !cursor.is_done() {
            data.push(f(cursor.position()));
            cursor.fwd();
        }
        Self::from_vec(dims, data)
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn num_dims(&self) -> usize {
        self.dims.len()
    }

    pub fn dimension(&self, d: usize) -> usize {
        self.dims[d]
    }

    pub fn num_elements(&self) -> usize {
        self.data.len()
    }

    pub fn interval(&self) -> Interval {
        Interval::from_dims(&self.dims)
    }

    pub fn stamp(&self) -> u64 {
        self.stamp
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        self.stamp = next_stamp();
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    pub fn get(&self, pos: &[usize]) -> Option<&T> {
        let idx = contiguous_index(&self.dims, pos)?;
        self.data.get(idx)
    }

    pub fn get_mut(&mut self, pos: &[usize]) -> Option<&mut T> {
        let idx = contiguous_index(&self.dims, pos)?;
        self.stamp = next_stamp();
        self.data.get_mut(idx)
    }

    pub fn as_view(&self) -> ImgView<'_, T> {
        ImgView {
            strides: contiguous_strides(&self.dims),
            dims: self.dims.clone(),
            data: &self.data,
            stamp: self.stamp,
        }
    }

    pub fn as_view_mut(&mut self) -> ImgViewMut<'_, T> {
        self.stamp = next_stamp();
        ImgViewMut {
            strides: contiguous_strides(&self.dims),
            dims: self.dims.clone(),
            data: &mut self.data,
        }
    }
}

impl<T: Clone> Img<T> {
    /// Image of extent `dims` with every sample set to `value`.
    ///
    /// # Panics
    /// If `dims` is empty or the element count overflows `usize`. Use
    /// [`Img::try_new_fill`] for caller-supplied extents.
    pub fn new_fill(dims: &[usize], value: T) -> Self {
        match Self::try_new_fill(dims, value) {
            Ok(img) => img,
            Err(e) => panic!("invalid image extent {dims:?}: {e}"),
        }
    }

    pub fn try_new_fill(dims: &[usize], value: T) -> Result<Self, Error> {
        if dims.is_empty() {
            return Err(Error::InvalidParameter("image needs at least one axis"));
        }
        let len = checked_product(dims).ok_or(Error::InvalidParameter("image size overflow"))?;
        Ok(Self {
            dims: dims.to_vec(),
            data: vec![value; len],
            stamp: next_stamp(),
        })
    }
}

impl<T: Clone> Clone for Img<T> {
    fn clone(&self) -> Self {
        Self {
            dims: self.dims.clone(),
            data: self.data.clone(),
            stamp: next_stamp(),
        }
    }
}

impl<T: PartialEq> PartialEq for Img<T> {
    fn eq(&self, other: &Self) -> bool {
        self.dims == other.dims && self.data == other.data
    }
}

/// Borrowed, strided, read-only N-dimensional view.
///
/// `data` starts at the sample addressed by the all-zero position; strides
/// are in elements.
#[derive(Debug, Clone)]
pub struct ImgView<'a, T> {
    dims: Vec<usize>,
    strides: Vec<usize>,
    data: &'a [T],
    stamp: u64,
}

impl<'a, T> ImgView<'a, T> {
    pub fn from_slice(dims: &[usize], data: &'a [T]) -> Result<Self, Error> {
        Self::from_slice_strided(dims, &contiguous_strides(dims), data)
    }

    /// Every call yields a new identity; clones of the returned view share it.
    pub fn from_slice_strided(
        dims: &[usize],
        strides: &[usize],
        data: &'a [T],
    ) -> Result<Self, Error> {
        validate_layout(dims, strides, data.len())?;
        Ok(Self {
            dims: dims.to_vec(),
            strides: strides.to_vec(),
            data,
            stamp: next_stamp(),
        })
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    pub fn num_dims(&self) -> usize {
        self.dims.len()
    }

    pub fn dimension(&self, d: usize) -> usize {
        self.dims[d]
    }

    pub fn num_elements(&self) -> usize {
        self.dims.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.num_elements() == 0
    }

    pub fn interval(&self) -> Interval {
        Interval::from_dims(&self.dims)
    }

    pub fn handle(&self) -> ViewHandle {
        ViewHandle {
            addr: self.data.as_ptr() as usize,
            dims: self.dims.clone(),
            strides: self.strides.clone(),
            stamp: self.stamp,
        }
    }

    /// Backing storage. Position `p` lives at `sum(p[d] * strides[d])`.
    pub fn storage(&self) -> &'a [T] {
        self.data
    }

    pub fn offset_of(&self, pos: &[usize]) -> Option<usize> {
        if pos.len() != self.dims.len() || pos.iter().zip(&self.dims).any(|(&p, &d)| p >= d) {
            return None;
        }
        Some(pos.iter().zip(&self.strides).map(|(p, s)| p * s).sum())
    }

    pub fn get(&self, pos: &[usize]) -> Option<&'a T> {
        let idx = self.offset_of(pos)?;
        self.data.get(idx)
    }

    /// Returns a sample reference without bounds checks.
    ///
    /// # Safety
    /// Caller must guarantee `pos.len() == self.num_dims()` and
    /// `pos[d] < self.dimension(d)` for every axis.
    pub unsafe fn get_unchecked(&self, pos: &[usize]) -> &'a T {
        let idx: usize = pos.iter().zip(&self.strides).map(|(p, s)| p * s).sum();
        // SAFETY: Caller guarantees `pos` is inside the view. With view
        // invariants this implies `idx` is in bounds of `data`.
        unsafe { self.data.get_unchecked(idx) }
    }

    pub fn cursor(&self) -> Cursor {
        Cursor::new(&self.dims, &self.strides)
    }

    /// Samples in flat order (axis 0 fastest).
    pub fn iter(&self) -> ViewIter<'a, T> {
        ViewIter {
            cursor: self.cursor(),
            data: self.data,
        }
    }

    /// Sub-view over `interval`, keeping dimensionality.
    pub fn crop(&self, interval: &Interval) -> Result<ImgView<'a, T>, Error> {
        Error::check_dims(self.num_dims(), interval.num_dims())?;
        let start = crop_start(&self.dims, &self.strides, interval)?;
        let dims = interval.dims();
        let len = min_required_len(&dims, &self.strides).ok_or(Error::OutOfBounds)?;
        let data = if len == 0 {
            &self.data[..0]
        } else {
            let tail = self.data.get(start..).ok_or(Error::OutOfBounds)?;
            if tail.len() < len {
                return Err(Error::OutOfBounds);
            }
            tail
        };

        Ok(ImgView {
            dims,
            strides: self.strides.clone(),
            data,
            stamp: self.stamp,
        })
    }

    /// Crops to `interval` and drops every axis of extent 1, highest axis
    /// first. At least one axis always remains.
    pub fn hyperslice(&self, interval: &Interval) -> Result<ImgView<'a, T>, Error> {
        let mut out = self.crop(interval)?;
        for d in (0..out.dims.len()).rev() {
            if out.dims[d] == 1 && out.dims.len() > 1 {
                out.dims.remove(d);
                out.strides.remove(d);
            }
        }
        Ok(out)
    }

    pub fn is_contiguous(&self) -> bool {
        self.strides == contiguous_strides(&self.dims)
    }

    pub fn as_contiguous_slice(&self) -> Option<&'a [T]> {
        if !self.is_contiguous() {
            return None;
        }
        self.data.get(0..self.num_elements())
    }
}

impl<T: Clone> ImgView<'_, T> {
    pub fn to_img(&self) -> Img<T> {
        Img {
            dims: self.dims.clone(),
            data: self.iter().cloned().collect(),
            stamp: next_stamp(),
        }
    }
}

/// Borrowed, strided, mutable N-dimensional view.
#[derive(Debug)]
pub struct ImgViewMut<'a, T> {
    dims: Vec<usize>,
    strides: Vec<usize>,
    data: &'a mut [T],
}

impl<'a, T> ImgViewMut<'a, T> {
    pub fn from_slice_mut(dims: &[usize], data: &'a mut [T]) -> Result<Self, Error> {
        Self::from_slice_strided_mut(dims, &contiguous_strides(dims), data)
    }

    pub fn from_slice_strided_mut(
        dims: &[usize],
        strides: &[usize],
        data: &'a mut [T],
    ) -> Result<Self, Error> {
        validate_layout(dims, strides, data.len())?;
        Ok(Self {
            dims: dims.to_vec(),
            strides: strides.to_vec(),
            data,
        })
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    pub fn num_dims(&self) -> usize {
        self.dims.len()
    }

    pub fn dimension(&self, d: usize) -> usize {
        self.dims[d]
    }

    pub fn num_elements(&self) -> usize {
        self.dims.iter().product()
    }

    pub fn storage(&self) -> &[T] {
        self.data
    }

    /// Backing storage. Position `p` lives at `sum(p[d] * strides[d])`.
    pub fn storage_mut(&mut self) -> &mut [T] {
        self.data
    }

    pub fn offset_of(&self, pos: &[usize]) -> Option<usize> {
        if pos.len() != self.dims.len() || pos.iter().zip(&self.dims).any(|(&p, &d)| p >= d) {
            return None;
        }
        Some(pos.iter().zip(&self.strides).map(|(p, s)| p * s).sum())
    }

    pub fn get(&self, pos: &[usize]) -> Option<&T> {
        let idx = self.offset_of(pos)?;
        self.data.get(idx)
    }

    pub fn get_mut(&mut self, pos: &[usize]) -> Option<&mut T> {
        let idx = self.offset_of(pos)?;
        self.data.get_mut(idx)
    }

    pub fn cursor(&self) -> Cursor {
        Cursor::new(&self.dims, &self.strides)
    }

    /// Read-only view with a fresh identity on every call.
    pub fn as_view(&self) -> ImgView<'_, T> {
        ImgView {
            dims: self.dims.clone(),
            strides: self.strides.clone(),
            data: self.data,
            stamp: next_stamp(),
        }
    }

    pub fn crop_mut(&mut self, interval: &Interval) -> Result<ImgViewMut<'_, T>, Error> {
        Error::check_dims(self.num_dims(), interval.num_dims())?;
        let start = crop_start(&self.dims, &self.strides, interval)?;
        let dims = interval.dims();
        let len = min_required_len(&dims, &self.strides).ok_or(Error::OutOfBounds)?;
        if len == 0 {
            return Ok(ImgViewMut {
                dims,
                strides: self.strides.clone(),
                data: &mut self.data[..0],
            });
        }
        if start > self.data.len() {
            return Err(Error::OutOfBounds);
        }

        let (_, tail) = self.data.split_at_mut(start);
        if tail.len() < len {
            return Err(Error::OutOfBounds);
        }

        Ok(ImgViewMut {
            dims,
            strides: self.strides.clone(),
            data: tail,
        })
    }

    pub fn is_contiguous(&self) -> bool {
        self.strides == contiguous_strides(&self.dims)
    }

    pub fn as_contiguous_slice_mut(&mut self) -> Option<&mut [T]> {
        if !self.is_contiguous() {
            return None;
        }
        let len = self.num_elements();
        self.data.get_mut(0..len)
    }
}

impl<T: Clone> ImgViewMut<'_, T> {
    pub fn fill(&mut self, value: T) {
        let mut cursor = self.cursor();
        while !cursor.is_done() {
            self.data[cursor.offset()] = value.clone();
            cursor.fwd();
        }
    }
}

/// Walks positions of a box in flat order (axis 0 fastest), tracking the
/// storage offset for a given stride set.
#[derive(Debug, Clone)]
pub struct Cursor {
    dims: Vec<usize>,
    strides: Vec<usize>,
    pos: Vec<usize>,
    offset: usize,
    index: usize,
    total: usize,
}

impl Cursor {
    pub fn new(dims: &[usize], strides: &[usize]) -> Self {
        assert_eq!(dims.len(), strides.len(), "dims and strides must match");
        Self {
            dims: dims.to_vec(),
            strides: strides.to_vec(),
            pos: vec![0; dims.len()],
            offset: 0,
            index: 0,
            total: dims.iter().product(),
        }
    }

    pub fn position(&self) -> &[usize] {
        &self.pos
    }

    /// Storage offset of the current position.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Flat index of the current position.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_done(&self) -> bool {
        self.index >= self.total
    }

    pub fn fwd(&mut self) {
        self.index += 1;
        if self.index >= self.total {
            return;
        }
        for d in 0..self.dims.len() {
            self.pos[d] += 1;
            self.offset += self.strides[d];
            if self.pos[d] < self.dims[d] {
                return;
            }
            self.offset -= self.pos[d] * self.strides[d];
            self.pos[d] = 0;
        }
    }

    pub fn jump_fwd(&mut self, steps: usize) {
        if steps == 1 {
            self.fwd();
        } else {
            self.set_index(self.index.saturating_add(steps));
        }
    }

    /// Moves to flat index `index`; past-the-end marks the cursor done.
    pub fn set_index(&mut self, index: usize) {
        self.index = index;
        if index >= self.total {
            return;
        }
        let mut rem = index;
        self.offset = 0;
        for d in 0..self.dims.len() {
            self.pos[d] = rem % self.dims[d];
            rem /= self.dims[d];
            self.offset += self.pos[d] * self.strides[d];
        }
    }
}

pub struct ViewIter<'a, T> {
    cursor: Cursor,
    data: &'a [T],
}

impl<'a, T> Iterator for ViewIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor.is_done() {
            return None;
        }
        let item = self.data.get(self.cursor.offset());
        self.cursor.fwd();
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rem = self.cursor.total().saturating_sub(self.cursor.index());
        (rem, Some(rem))
    }
}

impl<T> ExactSizeIterator for ViewIter<'_, T> {}

pub fn contiguous_strides(dims: &[usize]) -> Vec<usize> {
    let mut strides = Vec::with_capacity(dims.len());
    let mut acc = 1usize;
    for &d in dims {
        strides.push(acc);
        acc = acc.saturating_mul(d);
    }
    strides
}

fn contiguous_index(dims: &[usize], pos: &[usize]) -> Option<usize> {
    if pos.len() != dims.len() {
        return None;
    }
    let mut idx = 0usize;
    let mut stride = 1usize;
    for (&p, &d) in pos.iter().zip(dims) {
        if p >= d {
            return None;
        }
        idx += p * stride;
        stride *= d;
    }
    Some(idx)
}

fn checked_product(dims: &[usize]) -> Option<usize> {
    dims.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
}

fn validate_layout(dims: &[usize], strides: &[usize], len: usize) -> Result<(), Error> {
    if dims.is_empty() {
        return Err(Error::InvalidParameter("view needs at least one axis"));
    }
    Error::check_dims(dims.len(), strides.len())?;

    // Axis d must step over the whole extent of axes below it.
    let mut span = 1usize;
    for (&d, &s) in dims.iter().zip(strides) {
        if d > 1 && s < span {
            return Err(Error::InvalidStride);
        }
        span = s.saturating_mul(d).max(span);
    }

    let min_len = min_required_len(dims, strides).ok_or(Error::SizeMismatch {
        expected: usize::MAX,
        actual: len,
    })?;
    if len < min_len {
        return Err(Error::SizeMismatch {
            expected: min_len,
            actual: len,
        });
    }
    Ok(())
}

fn min_required_len(dims: &[usize], strides: &[usize]) -> Option<usize> {
    if dims.contains(&0) {
        return Some(0);
    }

    let mut last = 0usize;
    for (&d, &s) in dims.iter().zip(strides) {
        last = last.checked_add((d - 1).checked_mul(s)?)?;
    }
    last.checked_add(1)
}

fn crop_start(dims: &[usize], strides: &[usize], interval: &Interval) -> Result<usize, Error> {
    let mut start = 0usize;
    for d in 0..dims.len() {
        let (lo, hi) = (interval.min(d), interval.max(d));
        if lo < 0 || hi >= dims[d] as i64 {
            if interval.dimension(d) == 0 && lo >= 0 && lo <= dims[d] as i64 {
                continue;
            }
            return Err(Error::OutOfBounds);
        }
        start = (lo as usize)
            .checked_mul(strides[d])
            .and_then(|v| v.checked_add(start))
            .ok_or(Error::OutOfBounds)?;
    }
    Ok(start)
}

pub fn convert<T: RealType, U: RealType>(img: &ImgView<'_, T>) -> Img<U> {
    Img {
        dims: img.dims().to_vec(),
        data: img.iter().map(|&v| U::from_f64(v.as_f64())).collect(),
        stamp: next_stamp(),
    }
}

pub fn to_f64<T: RealType>(img: &ImgView<'_, T>) -> Img<f64> {
    convert(img)
}

#[cfg(test)]
mod tests {
    use super::{Cursor, Img, ImgView, ImgViewMut, convert, to_f64};
    use crate::{Error, Interval};

    #[test]
    fn view_indexing_with_stride() {
        let data = vec![1u8, 2, 3, 99, 4, 5, 6, 88];
        let view = ImgView::from_slice_strided(&[3, 2], &[1, 4], &data).expect("valid view");

        assert_eq!(view.get(&[0, 1]), Some(&4));
        assert_eq!(view.get(&[2, 1]), Some(&6));
        assert_eq!(view.get(&[3, 1]), None);
        assert_eq!(view.get(&[0]), None);
        assert_eq!(view.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5, 6]);
        assert!(!view.is_contiguous());
        assert!(view.as_contiguous_slice().is_none());
    }

    #[test]
    fn layout_validation() {
        let data = [0u8; 6];
        assert_eq!(
            ImgView::from_slice(&[4, 2], &data).err(),
            Some(Error::SizeMismatch {
                expected: 8,
                actual: 6
            })
        );
        assert_eq!(
            ImgView::from_slice_strided(&[3, 2], &[1, 2], &data).err(),
            Some(Error::InvalidStride)
        );
        assert!(ImgView::<u8>::from_slice(&[], &data).is_err());
        assert!(ImgView::from_slice(&[3, 2], &data).expect("valid").is_contiguous());
    }

    #[test]
    fn crop_non_contiguous_parent() {
        let data = vec![
            10u8, 11, 12, 13, 99, // row 0
            20, 21, 22, 23, 98, // row 1
            30, 31, 32, 33, 97, // row 2
        ];
        let parent = ImgView::from_slice_strided(&[4, 3], &[1, 5], &data).expect("valid parent");
        let iv = Interval::new(vec![1, 1], vec![3, 2]).expect("valid interval");
        let sub = parent.crop(&iv).expect("valid crop");

        assert_eq!(sub.dims(), &[3, 2]);
        assert_eq!(sub.strides(), &[1, 5]);
        assert_eq!(sub.iter().copied().collect::<Vec<_>>(), vec![21, 22, 23, 31, 32, 33]);
        assert_eq!(sub.get(&[2, 1]), Some(&33));

        let outside = Interval::new(vec![2, 0], vec![4, 0]).expect("valid interval");
        assert_eq!(parent.crop(&outside).err(), Some(Error::OutOfBounds));
    }

    #[test]
    fn hyperslice_drops_singleton_axes() {
        let img = Img::from_fn(&[4, 3, 2], |p| (p[0] + 10 * p[1] + 100 * p[2]) as u16)
            .expect("valid image");
        let view = img.as_view();

        // Row y = 1 of plane z = 1.
        let iv = Interval::new(vec![0, 1, 1], vec![3, 1, 1]).expect("valid interval");
        let row = view.hyperslice(&iv).expect("valid slice");
        assert_eq!(row.dims(), &[4]);
        assert_eq!(row.iter().copied().collect::<Vec<_>>(), vec![110, 111, 112, 113]);

        // Plane z = 0 keeps both spatial axes.
        let iv = Interval::new(vec![0, 0, 0], vec![3, 2, 0]).expect("valid interval");
        let plane = view.hyperslice(&iv).expect("valid slice");
        assert_eq!(plane.dims(), &[4, 3]);
        assert_eq!(plane.get(&[3, 2]), Some(&23));

        // A single sample keeps one axis.
        let iv = Interval::new(vec![2, 2, 1], vec![2, 2, 1]).expect("valid interval");
        let point = view.hyperslice(&iv).expect("valid slice");
        assert_eq!(point.dims(), &[1]);
        assert_eq!(point.get(&[0]), Some(&122));

        let wrong = Interval::from_dims(&[4, 3]);
        assert!(matches!(
            view.hyperslice(&wrong),
            Err(Error::InvalidDimensionality { .. })
        ));
    }

    #[test]
    fn crop_mut_writes_through() {
        let mut data = vec![
            1u8, 2, 3, 4, 0, // row 0
            5, 6, 7, 8, 0, // row 1
            9, 10, 11, 12, 0, // row 2
        ];

        let mut parent =
            ImgViewMut::from_slice_strided_mut(&[4, 3], &[1, 5], &mut data).expect("valid parent");
        let iv = Interval::new(vec![1, 0], vec![2, 2]).expect("valid interval");
        let mut sub = parent.crop_mut(&iv).expect("valid crop");
        *sub.get_mut(&[0, 2]).expect("in bounds") = 42;
        sub.fill(7);
        *sub.get_mut(&[1, 1]).expect("in bounds") = 1;

        assert_eq!(sub.get(&[0, 2]), Some(&7));
        assert_eq!(parent.get(&[2, 1]), Some(&1));
        assert_eq!(parent.get(&[3, 1]), Some(&8));
        assert_eq!(data[4], 0);
    }

    #[test]
    fn handles_track_identity_not_content() {
        let mut img = Img::new_fill(&[4, 4], 1.0f32);
        let twin = Img::new_fill(&[4, 4], 1.0f32);
        assert_eq!(img, twin);

        let h0 = img.as_view().handle();
        assert_eq!(h0, img.as_view().handle());
        assert_ne!(h0, twin.as_view().handle());

        *img.get_mut(&[1, 1]).expect("in bounds") = 2.0;
        assert_ne!(h0, img.as_view().handle());

        let copy = img.clone();
        assert_ne!(copy.as_view().handle(), img.as_view().handle());
    }

    #[test]
    fn slice_views_get_fresh_identity() {
        let data = vec![1.0f64; 16];
        let view = ImgView::from_slice(&[4, 4], &data).expect("valid view");
        assert_eq!(view.handle(), view.clone().handle());
        let again = ImgView::from_slice(&[4, 4], &data).expect("valid view");
        assert_ne!(view.handle(), again.handle());

        let mut buf = vec![0u8; 6];
        let mut target = ImgViewMut::from_slice_mut(&[3, 2], &mut buf).expect("valid view");
        let before = target.as_view().handle();
        target.fill(7);
        assert_ne!(before, target.as_view().handle());
    }

    #[test]
    fn try_new_fill_rejects_bad_extents() {
        assert_eq!(
            Img::try_new_fill(&[], 0u8).err(),
            Some(Error::InvalidParameter("image needs at least one axis"))
        );
        assert_eq!(
            Img::try_new_fill(&[usize::MAX, 2], 0u8).err(),
            Some(Error::InvalidParameter("image size overflow"))
        );
        let img = Img::try_new_fill(&[2, 3], 4u16).expect("valid extent");
        assert_eq!(img.data(), &[4; 6]);
    }

    #[test]
    fn cursor_walks_and_jumps() {
        let mut c = Cursor::new(&[3, 2], &[1, 4]);
        let mut offsets = Vec::new();
        while !c.is_done() {
            offsets.push(c.offset());
            c.fwd();
        }
        assert_eq!(offsets, vec![0, 1, 2, 4, 5, 6]);

        let mut c = Cursor::new(&[3, 2], &[1, 4]);
        c.jump_fwd(4);
        assert_eq!(c.position(), &[1, 1]);
        assert_eq!(c.offset(), 5);
        c.jump_fwd(2);
        assert!(c.is_done());
    }

    #[test]
    fn convert_variants() {
        let img8 = Img::from_vec(&[2, 2], vec![1u8, 2, 3, 4]).expect("valid image");
        let out = to_f64(&img8.as_view());
        assert_eq!(out.data(), &[1.0, 2.0, 3.0, 4.0]);

        let f = Img::from_vec(&[3], vec![-1.0f64, 0.4, 400.0]).expect("valid image");
        let back: Img<u8> = convert(&f.as_view());
        assert_eq!(back.data(), &[0, 0, 255]);
    }
}

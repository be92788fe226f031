//! Grayscale and binary morphology on top of the neighborhood map.
//!
//! Grayscale ops skip out-of-range samples. Binary ops treat samples `> 0` as
//! set and write `0` or `255`; binary erosion treats the outside as unset, so
//! foreground touching the border erodes.

use ops_core::{BorderMode, Error, Img, ImgView, RealType};

use crate::map::map_neighborhood;
use crate::reduce;
use crate::shape::Shape;

fn map_to_img<T, S>(
    src: &ImgView<'_, T>,
    shape: &S,
    border: &BorderMode<T>,
    pick: impl Fn(&crate::Neighborhood<'_, T>) -> T,
) -> Result<Img<T>, Error>
where
    T: RealType,
    S: Shape + ?Sized,
{
    let mut out = Img::new_fill(src.dims(), T::zero());
    map_neighborhood(src, &mut out.as_view_mut(), shape, border, |nb| pick(nb))?;
    Ok(out)
}

pub fn erode<T: RealType, S: Shape + ?Sized>(src: &ImgView<'_, T>, shape: &S) -> Result<Img<T>, Error> {
    map_to_img(src, shape, &BorderMode::Skip, |nb| {
        reduce::min(nb).unwrap_or_else(T::max_value)
    })
}

pub fn dilate<T: RealType, S: Shape + ?Sized>(src: &ImgView<'_, T>, shape: &S) -> Result<Img<T>, Error> {
    map_to_img(src, shape, &BorderMode::Skip, |nb| {
        reduce::max(nb).unwrap_or_else(T::min_value)
    })
}

pub fn open<T: RealType, S: Shape + ?Sized>(src: &ImgView<'_, T>, shape: &S) -> Result<Img<T>, Error> {
    let eroded = erode(src, shape)?;
    dilate(&eroded.as_view(), shape)
}

pub fn close<T: RealType, S: Shape + ?Sized>(src: &ImgView<'_, T>, shape: &S) -> Result<Img<T>, Error> {
    let dilated = dilate(src, shape)?;
    erode(&dilated.as_view(), shape)
}

pub fn erode_binary_u8<S: Shape + ?Sized>(src: &ImgView<'_, u8>, shape: &S) -> Result<Img<u8>, Error> {
    map_to_img(src, shape, &BorderMode::Constant(0), |nb| {
        if nb.iter().all(|&v| v > 0) { 255 } else { 0 }
    })
}

pub fn dilate_binary_u8<S: Shape + ?Sized>(src: &ImgView<'_, u8>, shape: &S) -> Result<Img<u8>, Error> {
    map_to_img(src, shape, &BorderMode::Skip, |nb| {
        if nb.iter().any(|&v| v > 0) { 255 } else { 0 }
    })
}

pub fn open_binary_u8<S: Shape + ?Sized>(src: &ImgView<'_, u8>, shape: &S) -> Result<Img<u8>, Error> {
    let eroded = erode_binary_u8(src, shape)?;
    dilate_binary_u8(&eroded.as_view(), shape)
}

pub fn close_binary_u8<S: Shape + ?Sized>(src: &ImgView<'_, u8>, shape: &S) -> Result<Img<u8>, Error> {
    let dilated = dilate_binary_u8(src, shape)?;
    erode_binary_u8(&dilated.as_view(), shape)
}

use ops_core::{BorderMode, Cursor, Error, ImgView, ImgViewMut, RealType, contiguous_strides};

use crate::layout::{ConvolutionLayout, extend_input};

/// Direct spatial convolution, `O(N * K)`.
///
/// Same semantics as [`crate::FftConvolver::run`]: the output extent selects
/// [`crate::OutputSize`], samples outside the input follow `border`
/// (`Skip` contributes nothing). On error `out` is untouched.
pub fn convolve_naive<I, K, O>(
    input: &ImgView<'_, I>,
    kernel: &ImgView<'_, K>,
    out: &mut ImgViewMut<'_, O>,
    border: &BorderMode<f64>,
) -> Result<(), Error>
where
    I: RealType,
    K: RealType,
    O: RealType,
{
    let layout = ConvolutionLayout::resolve(input.dims(), kernel.dims(), out.dims())?;
    if out.num_elements() == 0 {
        return Ok(());
    }

    let ext = extend_input(input, &layout, border, &layout.ext_dims);
    let ext_strides = contiguous_strides(&layout.ext_dims);

    // Tap `j` reads E[x + k - 1 - j]; store it as an offset from E[x].
    let mut taps = Vec::with_capacity(kernel.num_elements());
    let kstorage = kernel.storage();
    let mut kc = kernel.cursor();
    while !kc.is_done() {
        let w = kstorage[kc.offset()].as_f64();
        if w != 0.0 {
            let delta: usize = kc
                .position()
                .iter()
                .zip(&layout.kernel_dims)
                .zip(&ext_strides)
                .map(|((&j, &k), &s)| (k - 1 - j) * s)
                .sum();
            taps.push((delta, w));
        }
        kc.fwd();
    }

    let mut src = Cursor::new(&layout.out_dims, &ext_strides);
    let mut dst = out.cursor();
    let storage = out.storage_mut();
    while !dst.is_done() {
        let base = src.offset();
        let acc: f64 = taps.iter().map(|&(delta, w)| ext[base + delta] * w).sum();
        storage[dst.offset()] = O::from_f64(acc);
        src.fwd();
        dst.fwd();
    }

    log::trace!(
        "naive convolution: out {:?}, kernel {:?}, {} taps",
        layout.out_dims,
        layout.kernel_dims,
        taps.len()
    );
    Ok(())
}

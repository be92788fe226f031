//! Output sizing and padding shared by the naive and Fourier paths.
//!
//! Both paths compute
//!
//! ```text
//! out[x] = sum_j kernel[j] * ext(input)[x + o - j]
//! ```
//!
//! where `o = k / 2` per axis for [`OutputSize::Same`] and `o = 0` for
//! [`OutputSize::Full`], and `ext` applies the border mode. The extended
//! input `E[t] = ext(input)[t + o - (k - 1)]` has extent `out + k - 1`, so
//! `out[x] = (E * kernel)[x + k - 1]` is a plain linear convolution.

use ops_core::{BorderMode, Cursor, Error, ImgView, RealType, contiguous_strides, map_index};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OutputSize {
    /// Output has the input's extent; the kernel origin sits at `k / 2`.
    #[default]
    Same,
    /// Output has extent `input + kernel - 1`.
    Full,
}

/// Output extent a caller should allocate for `size`.
pub fn output_dims(input: &[usize], kernel: &[usize], size: OutputSize) -> Result<Vec<usize>, Error> {
    Error::check_dims(input.len(), kernel.len())?;
    match size {
        OutputSize::Same => Ok(input.to_vec()),
        OutputSize::Full => Ok(input
            .iter()
            .zip(kernel)
            .map(|(&n, &k)| (n + k).saturating_sub(1))
            .collect()),
    }
}

/// Smallest `2^a * 3^b * 5^c >= n`.
pub fn good_size(n: usize) -> usize {
    if n <= 1 {
        return 1;
    }
    let mut m = n;
    loop {
        let mut r = m;
        for p in [2usize, 3, 5] {
            while r % p == 0 {
                r /= p;
            }
        }
        if r == 1 {
            return m;
        }
        m += 1;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ConvolutionLayout {
    pub size: OutputSize,
    pub out_dims: Vec<usize>,
    pub kernel_dims: Vec<usize>,
    /// First extended-input coordinate, relative to the input origin.
    pub ext_start: Vec<isize>,
    pub ext_dims: Vec<usize>,
    pub fft_dims: Vec<usize>,
}

impl ConvolutionLayout {
    /// Validates dimensionality and picks the output size from `out`.
    pub fn resolve(input: &[usize], kernel: &[usize], out: &[usize]) -> Result<Self, Error> {
        Error::check_dims(input.len(), kernel.len())?;
        Error::check_dims(input.len(), out.len())?;
        if kernel.contains(&0) {
            return Err(Error::InvalidParameter("kernel must not be empty"));
        }
        if input.contains(&0) {
            return Err(Error::InvalidParameter("convolution input must not be empty"));
        }

        let size = if out == input {
            OutputSize::Same
        } else if out == output_dims(input, kernel, OutputSize::Full)? {
            OutputSize::Full
        } else {
            return Err(Error::ShapeMismatch {
                expected: input.to_vec(),
                actual: out.to_vec(),
            });
        };

        let mut ext_start = Vec::with_capacity(input.len());
        let mut ext_dims = Vec::with_capacity(input.len());
        for (&n_out, &k) in out.iter().zip(kernel) {
            let origin = match size {
                OutputSize::Same => (k / 2) as isize,
                OutputSize::Full => 0,
            };
            ext_start.push(origin - (k as isize - 1));
            ext_dims.push(
                n_out
                    .checked_add(k - 1)
                    .ok_or_else(|| Error::TransformFailure("padded size overflow".into()))?,
            );
        }
        let fft_dims = ext_dims.iter().map(|&n| good_size(n)).collect();

        Ok(Self {
            size,
            out_dims: out.to_vec(),
            kernel_dims: kernel.to_vec(),
            ext_start,
            ext_dims,
            fft_dims,
        })
    }

    /// Offset, in a contiguous buffer of extent `dims`, of the sample that
    /// lands on output position zero.
    pub fn result_origin(&self, dims: &[usize]) -> usize {
        contiguous_strides(dims)
            .iter()
            .zip(&self.kernel_dims)
            .map(|(s, k)| s * (k - 1))
            .sum()
    }
}

/// Materializes the border-extended input into a zeroed contiguous buffer of
/// extent `target_dims` (`>= ext_dims` per axis).
///
/// Samples excluded by [`BorderMode::Skip`] contribute zero.
pub(crate) fn extend_input<I: RealType>(
    input: &ImgView<'_, I>,
    layout: &ConvolutionLayout,
    border: &BorderMode<f64>,
    target_dims: &[usize],
) -> Vec<f64> {
    let fill = border.constant().copied().unwrap_or(0.0);
    let maps: Vec<Vec<Option<usize>>> = (0..input.num_dims())
        .map(|d| {
            (0..layout.ext_dims[d])
                .map(|t| map_index(t as isize + layout.ext_start[d], input.dimension(d), border))
                .collect()
        })
        .collect();

    let mut buf = vec![0.0f64; target_dims.iter().product()];
    let storage = input.storage();
    let strides = input.strides();
    let mut cursor = Cursor::new(&layout.ext_dims, &contiguous_strides(target_dims));
    while !cursor.is_done() {
        let mut src = Some(0usize);
        for (d, &p) in cursor.position().iter().enumerate() {
            src = match (src, maps[d][p]) {
                (Some(acc), Some(i)) => Some(acc + i * strides[d]),
                _ => None,
            };
        }
        buf[cursor.offset()] = match src {
            Some(i) => storage[i].as_f64(),
            None => fill,
        };
        cursor.fwd();
    }
    buf
}

/// Copies the kernel into a zeroed contiguous buffer of extent `target_dims`.
pub(crate) fn pad_kernel<K: RealType>(kernel: &ImgView<'_, K>, target_dims: &[usize]) -> Vec<f64> {
    let mut buf = vec![0.0f64; target_dims.iter().product()];
    let storage = kernel.storage();
    let mut src = kernel.cursor();
    let mut dst = Cursor::new(kernel.dims(), &contiguous_strides(target_dims));
    while !src.is_done() {
        buf[dst.offset()] = storage[src.offset()].as_f64();
        src.fwd();
        dst.fwd();
    }
    buf
}

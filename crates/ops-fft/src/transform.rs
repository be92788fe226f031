//! N-dimensional complex DFT built from 1D `rustfft` passes, one axis at a
//! time. Axis 0 lines are contiguous and transformed in a single batched call;
//! other axes are gathered into a line buffer.

use num_complex::Complex64;
use ops_core::{Error, contiguous_strides};
use rustfft::FftPlanner;

/// Complex spectrum over a contiguous N-D box, axis 0 fastest.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    dims: Vec<usize>,
    data: Vec<Complex64>,
}

impl Spectrum {
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn data(&self) -> &[Complex64] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Point-wise product, the frequency-domain form of convolution.
    pub fn multiply_assign(&mut self, other: &Spectrum) -> Result<(), Error> {
        if self.dims != other.dims {
            return Err(Error::TransformFailure(format!(
                "spectrum extents differ: {:?} vs {:?}",
                self.dims, other.dims
            )));
        }
        for (a, b) in self.data.iter_mut().zip(&other.data) {
            *a *= *b;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Inverse,
}

/// Forward/inverse transform engine. Plans are cached by the planner, line
/// and scratch buffers are reused across calls.
pub struct FftEngine {
    planner: FftPlanner<f64>,
    line: Vec<Complex64>,
    scratch: Vec<Complex64>,
}

impl Default for FftEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl FftEngine {
    pub fn new() -> Self {
        Self {
            planner: FftPlanner::new(),
            line: Vec::new(),
            scratch: Vec::new(),
        }
    }

    /// Transforms real samples laid out contiguously over `dims`.
    pub fn forward_real(&mut self, dims: &[usize], samples: Vec<f64>) -> Result<Spectrum, Error> {
        validate_extent(dims, samples.len())?;
        let mut data: Vec<Complex64> = samples.into_iter().map(|v| Complex64::new(v, 0.0)).collect();
        self.process(dims, &mut data, Direction::Forward);
        Ok(Spectrum {
            dims: dims.to_vec(),
            data,
        })
    }

    /// Inverse transform, normalized by the element count; returns the real
    /// part.
    pub fn inverse_real(&mut self, spectrum: Spectrum) -> Result<Vec<f64>, Error> {
        let Spectrum { dims, mut data } = spectrum;
        validate_extent(&dims, data.len())?;
        self.process(&dims, &mut data, Direction::Inverse);
        let scale = 1.0 / data.len() as f64;
        Ok(data.into_iter().map(|c| c.re * scale).collect())
    }

    fn process(&mut self, dims: &[usize], data: &mut [Complex64], dir: Direction) {
        let strides = contiguous_strides(dims);
        let total = data.len();

        for (axis, (&n, &stride)) in dims.iter().zip(&strides).enumerate() {
            if n <= 1 {
                continue;
            }
            let fft = match dir {
                Direction::Forward => self.planner.plan_fft_forward(n),
                Direction::Inverse => self.planner.plan_fft_inverse(n),
            };
            let scratch_len = fft.get_inplace_scratch_len();
            if self.scratch.len() < scratch_len {
                self.scratch.resize(scratch_len, Complex64::default());
            }
            let scratch = &mut self.scratch[..scratch_len];

            if axis == 0 {
                // Rows are contiguous, rustfft batches consecutive chunks.
                fft.process_with_scratch(data, scratch);
                continue;
            }

            self.line.resize(n, Complex64::default());
            let block = n * stride;
            for outer in (0..total).step_by(block) {
                for inner in 0..stride {
                    let base = outer + inner;
                    for (k, v) in self.line.iter_mut().enumerate() {
                        *v = data[base + k * stride];
                    }
                    fft.process_with_scratch(&mut self.line, scratch);
                    for (k, v) in self.line.iter().enumerate() {
                        data[base + k * stride] = *v;
                    }
                }
            }
        }
    }
}

fn validate_extent(dims: &[usize], len: usize) -> Result<(), Error> {
    if dims.is_empty() {
        return Err(Error::TransformFailure("transform needs at least one axis".into()));
    }
    if dims.contains(&0) {
        return Err(Error::TransformFailure(format!("empty transform extent {dims:?}")));
    }
    let expected = dims
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or_else(|| Error::TransformFailure(format!("transform extent {dims:?} overflows")))?;
    if expected != len {
        return Err(Error::TransformFailure(format!(
            "transform extent {dims:?} needs {expected} samples, got {len}"
        )));
    }
    Ok(())
}

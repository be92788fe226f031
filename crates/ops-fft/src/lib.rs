//! N-dimensional convolution, direct and in the Fourier domain.
//!
//! [`FftConvolver`] keeps the transform of the last input and reuses it while
//! the same view is convolved with different kernels. [`ConvolutionPolicy`]
//! decides when the Fourier path pays off; [`Convolver`] applies it.
//!
//! Both paths share one definition: for an output position `x`,
//! `out[x] = sum_j kernel[j] * ext(input)[x + o - j]`, with `o = k / 2`
//! ([`OutputSize::Same`]) or `o = 0` ([`OutputSize::Full`]).

pub mod convolve;
pub mod fft_conv;
pub mod kernels;
mod layout;
pub mod naive;
pub mod policy;
pub mod transform;

pub use convolve::{ConvolveFourier, Convolver};
pub use fft_conv::{ConvolverStats, FftConvolver, FftConvolverConfig};
pub use kernels::{box_kernel, gaussian_1d, gaussian_kernel};
pub use layout::{OutputSize, good_size, output_dims};
pub use naive::convolve_naive;
pub use policy::{ConvolutionPath, ConvolutionPolicy};
pub use transform::{FftEngine, Spectrum};

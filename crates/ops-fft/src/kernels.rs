//! Convolution kernel builders.
//!
//! Gaussian conventions:
//! - `radius = ceil(3*sigma)`, minimum 1, per axis.
//! - Each 1D profile is normalized such that `sum(g) ~= 1`; the N-D kernel is
//!   their outer product, so it sums to one as well.

use ops_core::{Error, Img};

/// Averaging kernel: every element is `1 / n`.
pub fn box_kernel(dims: &[usize]) -> Result<Img<f64>, Error> {
    if dims.is_empty() || dims.contains(&0) {
        return Err(Error::InvalidParameter("box kernel needs non-empty extents"));
    }
    let n: usize = dims.iter().product();
    Img::from_vec(dims, vec![1.0 / n as f64; n])
}

/// Normalized 1D Gaussian of length `2 * radius + 1`.
pub fn gaussian_1d(sigma: f64) -> Result<Vec<f64>, Error> {
    if !(sigma.is_finite() && sigma > 0.0) {
        return Err(Error::InvalidParameter("sigma must be > 0 and finite"));
    }

    let radius = ((3.0 * sigma).ceil() as usize).max(1);
    let sigma2 = sigma * sigma;
    let mut g: Vec<f64> = (0..2 * radius + 1)
        .map(|i| {
            let x = i as f64 - radius as f64;
            (-(x * x) / (2.0 * sigma2)).exp()
        })
        .collect();

    let sum: f64 = g.iter().sum();
    for gi in &mut g {
        *gi /= sum;
    }
    Ok(g)
}

/// Separable N-D Gaussian, one sigma per axis.
pub fn gaussian_kernel(sigmas: &[f64]) -> Result<Img<f64>, Error> {
    if sigmas.is_empty() {
        return Err(Error::InvalidParameter("gaussian kernel needs at least one axis"));
    }
    let profiles = sigmas
        .iter()
        .map(|&s| gaussian_1d(s))
        .collect::<Result<Vec<_>, _>>()?;
    let dims: Vec<usize> = profiles.iter().map(Vec::len).collect();
    Img::from_fn(&dims, |p| {
        p.iter()
            .zip(&profiles)
            .map(|(&i, g)| g[i])
            .product::<f64>()
    })
}

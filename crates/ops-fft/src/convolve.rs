use ops_core::{BorderMode, Error, ImgView, ImgViewMut, RealType};

use crate::fft_conv::{FftConvolver, FftConvolverConfig};
use crate::naive::convolve_naive;
use crate::policy::{ConvolutionPath, ConvolutionPolicy};

/// Fourier convolution op: the executor plus its applicability check.
///
/// Callers ask [`ConvolveFourier::conforms`] before committing to
/// [`ConvolveFourier::run`]; `run` itself does not re-check.
#[derive(Debug, Default)]
pub struct ConvolveFourier {
    executor: FftConvolver,
    policy: ConvolutionPolicy,
}

impl ConvolveFourier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: FftConvolverConfig, policy: ConvolutionPolicy) -> Self {
        Self {
            executor: FftConvolver::with_config(config),
            policy,
        }
    }

    pub fn policy(&self) -> ConvolutionPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: ConvolutionPolicy) {
        self.policy = policy;
    }

    pub fn executor(&self) -> &FftConvolver {
        &self.executor
    }

    pub fn executor_mut(&mut self) -> &mut FftConvolver {
        &mut self.executor
    }

    pub fn conforms<K>(&self, kernel: &ImgView<'_, K>) -> bool {
        self.policy.conforms(kernel)
    }

    pub fn run<I, K, O>(
        &mut self,
        input: &ImgView<'_, I>,
        kernel: &ImgView<'_, K>,
        out: &mut ImgViewMut<'_, O>,
    ) -> Result<(), Error>
    where
        I: RealType,
        K: RealType,
        O: RealType,
    {
        self.executor.run(input, kernel, out)
    }
}

/// Convolution front end: small kernels go through the direct sum, large
/// ones through [`ConvolveFourier`]. Both paths use the executor's border.
#[derive(Debug, Default)]
pub struct Convolver {
    fourier: ConvolveFourier,
}

impl Convolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: FftConvolverConfig, policy: ConvolutionPolicy) -> Self {
        Self {
            fourier: ConvolveFourier::with_config(config, policy),
        }
    }

    pub fn fourier(&self) -> &ConvolveFourier {
        &self.fourier
    }

    pub fn fourier_mut(&mut self) -> &mut ConvolveFourier {
        &mut self.fourier
    }

    pub fn border(&self) -> &BorderMode<f64> {
        &self.fourier.executor().config().border
    }

    pub fn convolve<I, K, O>(
        &mut self,
        input: &ImgView<'_, I>,
        kernel: &ImgView<'_, K>,
        out: &mut ImgViewMut<'_, O>,
    ) -> Result<ConvolutionPath, Error>
    where
        I: RealType,
        K: RealType,
        O: RealType,
    {
        let path = self.fourier.policy().select(kernel);
        log::debug!(
            "convolution path {:?} for kernel {:?} ({} elements)",
            path,
            kernel.dims(),
            kernel.num_elements()
        );
        match path {
            ConvolutionPath::Naive => convolve_naive(input, kernel, out, self.border())?,
            ConvolutionPath::Fourier => self.fourier.run(input, kernel, out)?,
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use ops_core::{BorderMode, Img};

    use super::{ConvolveFourier, Convolver};
    use crate::fft_conv::FftConvolverConfig;
    use crate::policy::{ConvolutionPath, ConvolutionPolicy};

    #[test]
    fn dispatch_follows_policy() {
        let img = Img::from_fn(&[9, 7], |p| (p[0] * p[1]) as u16).expect("valid image");
        let small = Img::new_fill(&[3, 3], 1.0f64 / 9.0);
        let large = Img::new_fill(&[5, 5], 1.0f64 / 25.0);

        let mut conv = Convolver::new();
        let mut out = Img::new_fill(&[9, 7], 0.0f32);
        let path = conv
            .convolve(&img.as_view(), &small.as_view(), &mut out.as_view_mut())
            .expect("valid convolution");
        assert_eq!(path, ConvolutionPath::Naive);
        assert_eq!(conv.fourier().executor().stats().runs, 0);

        let path = conv
            .convolve(&img.as_view(), &large.as_view(), &mut out.as_view_mut())
            .expect("valid convolution");
        assert_eq!(path, ConvolutionPath::Fourier);
        assert_eq!(conv.fourier().executor().stats().runs, 1);
    }

    #[test]
    fn paths_agree_when_forced() {
        let img = Img::from_fn(&[11], |p| (p[0] % 4) as f64).expect("valid image");
        let kernel = Img::from_vec(&[3], vec![0.25f64, 0.5, 0.25]).expect("valid kernel");
        let config = FftConvolverConfig {
            border: BorderMode::Clamp,
            ..FftConvolverConfig::default()
        };

        let mut naive = Img::new_fill(&[11], 0.0f64);
        Convolver::with_config(config.clone(), ConvolutionPolicy::default())
            .convolve(&img.as_view(), &kernel.as_view(), &mut naive.as_view_mut())
            .expect("valid convolution");

        let mut fourier = Img::new_fill(&[11], 0.0f64);
        let mut conv = Convolver::with_config(config, ConvolutionPolicy::with_threshold(0));
        let path = conv
            .convolve(&img.as_view(), &kernel.as_view(), &mut fourier.as_view_mut())
            .expect("valid convolution");
        assert_eq!(path, ConvolutionPath::Fourier);

        for (a, b) in naive.data().iter().zip(fourier.data()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn conforms_is_a_pure_query() {
        let op = ConvolveFourier::new();
        let k = Img::new_fill(&[2, 2, 3], 1.0f32);
        assert!(op.conforms(&k.as_view()));
        assert_eq!(op.executor().stats().runs, 0);
    }
}

//! Fourier-domain convolution with a reusable image transform.
//!
//! Cache rules:
//! - One slot for the image spectrum, keyed by the input's [`ViewHandle`],
//!   the padded layout and the border mode. A hit skips extension and the
//!   forward transform entirely; sample values are never compared.
//! - Optionally one slot for the kernel spectrum, keyed the same way.
//! - Mutating an owned [`ops_core::Img`] renews its stamp, so a view taken
//!   afterwards misses the cache. Every view built from a raw slice gets its
//!   own stamp; only that view and its clones hit the cache, even when a
//!   later buffer reuses the same address.

use std::fmt;

use ops_core::{BorderMode, Cursor, Error, ImgView, ImgViewMut, RealType, ViewHandle, contiguous_strides};

use crate::layout::{ConvolutionLayout, extend_input, pad_kernel};
use crate::transform::{FftEngine, Spectrum};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FftConvolverConfig {
    pub border: BorderMode<f64>,
    pub keep_image_fft: bool,
    pub keep_kernel_fft: bool,
}

impl Default for FftConvolverConfig {
    fn default() -> Self {
        Self {
            border: BorderMode::Reflect101,
            keep_image_fft: true,
            keep_kernel_fft: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConvolverStats {
    pub runs: usize,
    pub image_transforms: usize,
    pub kernel_transforms: usize,
}

#[derive(Debug, Clone, PartialEq)]
struct ImageKey {
    handle: ViewHandle,
    ext_start: Vec<isize>,
    ext_dims: Vec<usize>,
    fft_dims: Vec<usize>,
    border: BorderMode<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct KernelKey {
    handle: ViewHandle,
    fft_dims: Vec<usize>,
}

struct Cached<K> {
    key: K,
    spectrum: Spectrum,
}

pub struct FftConvolver {
    config: FftConvolverConfig,
    engine: FftEngine,
    image: Option<Cached<ImageKey>>,
    kernel: Option<Cached<KernelKey>>,
    stats: ConvolverStats,
}

impl Default for FftConvolver {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FftConvolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FftConvolver")
            .field("config", &self.config)
            .field("cached_image", &self.image.as_ref().map(|c| c.spectrum.dims()))
            .field("cached_kernel", &self.kernel.as_ref().map(|c| c.spectrum.dims()))
            .field("stats", &self.stats)
            .finish()
    }
}

impl FftConvolver {
    pub fn new() -> Self {
        Self::with_config(FftConvolverConfig::default())
    }

    pub fn with_config(config: FftConvolverConfig) -> Self {
        Self {
            config,
            engine: FftEngine::new(),
            image: None,
            kernel: None,
            stats: ConvolverStats::default(),
        }
    }

    pub fn config(&self) -> &FftConvolverConfig {
        &self.config
    }

    /// Replaces the configuration. Cached spectra are dropped when their
    /// retention gets switched off.
    pub fn set_config(&mut self, config: FftConvolverConfig) {
        if !config.keep_image_fft {
            self.image = None;
        }
        if !config.keep_kernel_fft {
            self.kernel = None;
        }
        self.config = config;
    }

    pub fn stats(&self) -> ConvolverStats {
        self.stats
    }

    pub fn has_cached_image(&self) -> bool {
        self.image.is_some()
    }

    pub fn has_cached_kernel(&self) -> bool {
        self.kernel.is_some()
    }

    /// Drops both cache slots. Counters are kept.
    pub fn clear(&mut self) {
        self.image = None;
        self.kernel = None;
    }

    /// Convolves `input` with `kernel` into `out`.
    ///
    /// `out` must have the input's extent (same-size output) or
    /// `input + kernel - 1` per axis (full output). On error `out` is left
    /// untouched.
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
        let layout = ConvolutionLayout::resolve(input.dims(), kernel.dims(), out.dims())?;
        log::trace!(
            "fft convolution: {:?} layout, ext {:?}, fft {:?}",
            layout.size,
            layout.ext_dims,
            layout.fft_dims
        );
        self.stats.runs += 1;

        let key = ImageKey {
            handle: input.handle(),
            ext_start: layout.ext_start.clone(),
            ext_dims: layout.ext_dims.clone(),
            fft_dims: layout.fft_dims.clone(),
            border: self.config.border.clone(),
        };
        let image = match self.image.take() {
            Some(cached) if cached.key == key => {
                log::debug!("reusing image spectrum {:?}", layout.fft_dims);
                cached
            }
            _ => {
                log::debug!("transforming image, fft extent {:?}", layout.fft_dims);
                let samples = extend_input(input, &layout, &self.config.border, &layout.fft_dims);
                let spectrum = self.engine.forward_real(&layout.fft_dims, samples)?;
                self.stats.image_transforms += 1;
                Cached { key, spectrum }
            }
        };

        let product = self.kernel_spectrum(kernel, &layout).and_then(|mut p| {
            p.multiply_assign(&image.spectrum)?;
            Ok(p)
        });
        if self.config.keep_image_fft {
            self.image = Some(image);
        }
        let values = self.engine.inverse_real(product?)?;

        let fft_strides = contiguous_strides(&layout.fft_dims);
        let origin = layout.result_origin(&layout.fft_dims);
        let mut src = Cursor::new(&layout.out_dims, &fft_strides);
        let mut dst = out.cursor();
        let storage = out.storage_mut();
        while !dst.is_done() {
            storage[dst.offset()] = O::from_f64(values[origin + src.offset()]);
            src.fwd();
            dst.fwd();
        }
        Ok(())
    }

    fn kernel_spectrum<K: RealType>(
        &mut self,
        kernel: &ImgView<'_, K>,
        layout: &ConvolutionLayout,
    ) -> Result<Spectrum, Error> {
        let key = KernelKey {
            handle: kernel.handle(),
            fft_dims: layout.fft_dims.clone(),
        };
        if let Some(cached) = &self.kernel
            && cached.key == key
        {
            log::debug!("reusing kernel spectrum {:?}", layout.kernel_dims);
            return Ok(cached.spectrum.clone());
        }

        let spectrum = self
            .engine
            .forward_real(&layout.fft_dims, pad_kernel(kernel, &layout.fft_dims))?;
        self.stats.kernel_transforms += 1;
        if self.config.keep_kernel_fft {
            self.kernel = Some(Cached {
                key,
                spectrum: spectrum.clone(),
            });
        }
        Ok(spectrum)
    }
}

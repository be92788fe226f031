//! Kernel-size rule deciding between direct and Fourier convolution.

use ops_core::ImgView;

/// Which convolution path a call took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConvolutionPath {
    Naive,
    Fourier,
}

/// Picks the Fourier path for large kernels only.
///
/// Naive convolution costs `O(N * K)`; the Fourier path costs `O(N log N)`
/// plus a fixed overhead of two forward and one inverse transform. The
/// threshold is a heuristic and can be recalibrated per deployment, but the
/// comparison stays "element count strictly above threshold".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConvolutionPolicy {
    pub threshold: usize,
}

impl ConvolutionPolicy {
    pub const DEFAULT_THRESHOLD: usize = 9;

    pub const fn with_threshold(threshold: usize) -> Self {
        Self { threshold }
    }

    /// True iff `kernel_elements > threshold`, independent of shape and
    /// dimensionality.
    pub fn conforms_len(&self, kernel_elements: usize) -> bool {
        kernel_elements > self.threshold
    }

    pub fn conforms<K>(&self, kernel: &ImgView<'_, K>) -> bool {
        self.conforms_len(kernel.num_elements())
    }

    pub fn select<K>(&self, kernel: &ImgView<'_, K>) -> ConvolutionPath {
        if self.conforms(kernel) {
            ConvolutionPath::Fourier
        } else {
            ConvolutionPath::Naive
        }
    }
}

impl Default for ConvolutionPolicy {
    fn default() -> Self {
        Self::with_threshold(Self::DEFAULT_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use ops_core::Img;

    use super::{ConvolutionPath, ConvolutionPolicy};

    #[test]
    fn default_threshold_examples() {
        let policy = ConvolutionPolicy::default();
        let k33 = Img::new_fill(&[3, 3], 1.0f32);
        let k43 = Img::new_fill(&[4, 3], 1.0f32);
        assert!(!policy.conforms(&k33.as_view()));
        assert!(policy.conforms(&k43.as_view()));
        assert_eq!(policy.select(&k33.as_view()), ConvolutionPath::Naive);
        assert_eq!(policy.select(&k43.as_view()), ConvolutionPath::Fourier);
    }

    #[test]
    fn threshold_is_tunable() {
        let policy = ConvolutionPolicy::with_threshold(30);
        assert!(!policy.conforms(&Img::new_fill(&[5, 5], 0u8).as_view()));
        assert!(policy.conforms(&Img::new_fill(&[31], 0u8).as_view()));
        assert!(ConvolutionPolicy::with_threshold(0).conforms_len(1));
        assert!(!ConvolutionPolicy::with_threshold(0).conforms_len(0));
    }
}

//! Example: Gaussian scale sweep through one reusable FFT convolver.
//!
//! Loads a grayscale PNG and convolves it with a series of Gaussian kernels of
//! increasing sigma. All runs share one `FftConvolver`, so the image is
//! transformed once per padded layout and only the kernel transform is
//! recomputed per sigma. Kernels at or below the policy threshold go through
//! the direct path instead.
//!
//! Results (timings, chosen path, transform counts) are written to a JSON
//! file next to the input image; optionally each blurred image is saved as
//! PNG.
//!
//! Run from the workspace root:
//!   cargo run -p image-ops --example kernel_sweep -- --help
//!   RUST_LOG=debug cargo run -p image-ops --example kernel_sweep -- --input data/part.png

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::Parser;
use image::{GrayImage, ImageReader};
use image_ops::{
    ConvolutionPath, ConvolutionPolicy, Convolver, FftConvolverConfig, Img, gaussian_kernel,
};
use serde::Serialize;

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(about = "Blur one image with a sweep of Gaussian kernels, reusing its FFT")]
struct Args {
    /// Path to the input PNG
    #[arg(long)]
    input: PathBuf,

    /// Smallest sigma in the sweep
    #[arg(long, default_value_t = 0.5)]
    sigma_min: f64,

    /// Largest sigma in the sweep
    #[arg(long, default_value_t = 8.0)]
    sigma_max: f64,

    /// Number of sigmas, spaced geometrically
    #[arg(long, default_value_t = 8)]
    steps: usize,

    /// Kernel element count above which the FFT path is taken
    #[arg(long, default_value_t = ConvolutionPolicy::DEFAULT_THRESHOLD)]
    threshold: usize,

    /// Also write each blurred image as `<stem>_sigma<k>.png`
    #[arg(long)]
    save_images: bool,

    /// Output JSON path (default: <input stem>_sweep.json next to input)
    #[arg(long)]
    out: Option<PathBuf>,
}

// ── JSON DTOs ─────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct RunResult {
    sigma: f64,
    kernel_dims: Vec<usize>,
    path: &'static str,
    /// Wall-clock time for the convolution, in milliseconds.
    elapsed_ms: f64,
}

#[derive(Serialize)]
struct SweepReport {
    input: String,
    dims: Vec<usize>,
    runs: Vec<RunResult>,
    fft_runs: usize,
    image_transforms: usize,
    kernel_transforms: usize,
    total_ms: f64,
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn sigmas(min: f64, max: f64, steps: usize) -> Vec<f64> {
    if steps <= 1 {
        return vec![min];
    }
    let ratio = (max / min).powf(1.0 / (steps - 1) as f64);
    (0..steps).map(|i| min * ratio.powi(i as i32)).collect()
}

fn save_png(img: &Img<f32>, path: &Path) -> Result<()> {
    let (w, h) = (img.dimension(0), img.dimension(1));
    let pixels = img.data().iter().map(|&v| v.round().clamp(0.0, 255.0) as u8).collect();
    let out = GrayImage::from_raw(w as u32, h as u32, pixels).context("building output PNG")?;
    out.save(path)
        .with_context(|| format!("writing {}", path.display()))
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if !(args.sigma_min > 0.0 && args.sigma_max >= args.sigma_min) {
        bail!(
            "invalid sigma range [{}, {}]",
            args.sigma_min,
            args.sigma_max
        );
    }

    let out_path = args.out.clone().unwrap_or_else(|| {
        let stem = args.input.file_stem().unwrap_or_default().to_string_lossy();
        let dir = args.input.parent().unwrap_or(Path::new("."));
        dir.join(format!("{stem}_sweep.json"))
    });

    let gray = ImageReader::open(&args.input)
        .with_context(|| format!("opening {}", args.input.display()))?
        .decode()
        .with_context(|| format!("decoding {}", args.input.display()))?
        .into_luma8();
    let dims = vec![gray.width() as usize, gray.height() as usize];
    let img = Img::from_vec(&dims, gray.into_raw()).context("building input Img")?;
    let view = img.as_view();
    println!("loaded {}: {}x{}", args.input.display(), dims[0], dims[1]);

    let mut conv = Convolver::with_config(
        FftConvolverConfig::default(),
        ConvolutionPolicy::with_threshold(args.threshold),
    );
    let mut out = Img::new_fill(&dims, 0.0f32);
    let mut runs = Vec::with_capacity(args.steps);
    let total_start = Instant::now();

    for (k, sigma) in sigmas(args.sigma_min, args.sigma_max, args.steps)
        .into_iter()
        .enumerate()
    {
        let kernel = gaussian_kernel(&[sigma, sigma])
            .with_context(|| format!("building kernel for sigma {sigma}"))?;

        let t0 = Instant::now();
        let path = conv
            .convolve(&view, &kernel.as_view(), &mut out.as_view_mut())
            .with_context(|| format!("convolving with sigma {sigma}"))?;
        let elapsed_ms = t0.elapsed().as_secs_f64() * 1e3;

        let path = match path {
            ConvolutionPath::Naive => "naive",
            ConvolutionPath::Fourier => "fourier",
        };
        println!(
            "  sigma {sigma:.2}: kernel {:?}, {path} ({elapsed_ms:.2} ms)",
            kernel.dims()
        );

        if args.save_images {
            let stem = args.input.file_stem().unwrap_or_default().to_string_lossy();
            let dir = args.input.parent().unwrap_or(Path::new("."));
            save_png(&out, &dir.join(format!("{stem}_sigma{k}.png")))?;
        }

        runs.push(RunResult {
            sigma,
            kernel_dims: kernel.dims().to_vec(),
            path,
            elapsed_ms,
        });
    }

    let total_ms = total_start.elapsed().as_secs_f64() * 1e3;
    let stats = conv.fourier().executor().stats();
    println!(
        "total {total_ms:.2} ms: {} fft runs, {} image transforms, {} kernel transforms",
        stats.runs, stats.image_transforms, stats.kernel_transforms
    );

    let report = SweepReport {
        input: args.input.display().to_string(),
        dims,
        runs,
        fft_runs: stats.runs,
        image_transforms: stats.image_transforms,
        kernel_transforms: stats.kernel_transforms,
        total_ms,
    };
    let out_file = std::fs::File::create(&out_path)
        .with_context(|| format!("creating {}", out_path.display()))?;
    serde_json::to_writer_pretty(out_file, &report)
        .with_context(|| format!("writing JSON to {}", out_path.display()))?;

    println!("results written to {}", out_path.display());
    Ok(())
}

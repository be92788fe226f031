use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use image::GrayImage;
use image_ops::{
    BorderMode, ConvolutionPath, ConvolutionPolicy, Convolver, DiamondShape, FftConvolverConfig,
    HyperSphereShape, Img, Interval, ParallelMapConfig, Point2, RectangleShape, Reducer, Shape,
    close_binary_u8, convert, convex_hull, gaussian_kernel, map_reduce, open_binary_u8,
    par_map_neighborhood,
};
use serde::{Deserialize, Serialize};

#[derive(Parser, Debug)]
#[command(name = "ops_gallery")]
#[command(about = "Run image-ops algorithms on external fixtures")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(name = "convolve")]
    Convolve(ConvolveArgs),
    #[command(name = "neighborhood")]
    Neighborhood(NeighborhoodArgs),
    #[command(name = "morphology")]
    Morphology(MorphologyArgs),
    #[command(name = "slice")]
    Slice(SliceArgs),
}

#[derive(Args, Debug, Clone)]
struct CommonArgs {
    #[arg(long, required = true)]
    input: PathBuf,
    #[arg(long, default_value = "docs/fig/raw")]
    out: PathBuf,
}

#[derive(Args, Debug, Clone)]
struct ConvolveArgs {
    #[command(flatten)]
    common: CommonArgs,
    #[arg(long, default_value_t = 2.0)]
    sigma: f64,
    #[arg(long, default_value_t = ConvolutionPolicy::DEFAULT_THRESHOLD)]
    threshold: usize,
    /// JSON file with an `FftConvolverConfig`; missing fields keep defaults
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
struct NeighborhoodArgs {
    #[command(flatten)]
    common: CommonArgs,
    #[arg(long, value_enum, default_value_t = ShapeKind::Rectangle)]
    shape: ShapeKind,
    #[arg(long, default_value_t = 2)]
    radius: usize,
    #[arg(long, value_enum, default_value_t = ReducerKind::Median)]
    reducer: ReducerKind,
    /// Map with the chunked rayon executor
    #[arg(long)]
    parallel: bool,
}

#[derive(Args, Debug, Clone)]
struct MorphologyArgs {
    #[command(flatten)]
    common: CommonArgs,
    #[arg(long, value_enum, default_value_t = ShapeKind::Rectangle)]
    shape: ShapeKind,
    #[arg(long, default_value_t = 1)]
    radius: usize,
}

#[derive(Args, Debug, Clone)]
struct SliceArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// Axis held fixed: 0 keeps a column, 1 keeps a row
    #[arg(long, default_value_t = 1)]
    axis: usize,
    #[arg(long)]
    index: usize,
}

#[derive(ValueEnum, Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
enum ShapeKind {
    Rectangle,
    Sphere,
    Diamond,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum ReducerKind {
    Sum,
    Mean,
    Min,
    Max,
    Median,
    Count,
}

impl ShapeKind {
    fn build(self, radius: usize) -> Box<dyn Shape + Sync> {
        match self {
            ShapeKind::Rectangle => Box::new(RectangleShape::new(radius, false)),
            ShapeKind::Sphere => Box::new(HyperSphereShape::new(radius)),
            ShapeKind::Diamond => Box::new(DiamondShape::new(radius)),
        }
    }
}

impl From<ReducerKind> for Reducer {
    fn from(kind: ReducerKind) -> Self {
        match kind {
            ReducerKind::Sum => Reducer::Sum,
            ReducerKind::Mean => Reducer::Mean,
            ReducerKind::Min => Reducer::Min,
            ReducerKind::Max => Reducer::Max,
            ReducerKind::Median => Reducer::Median,
            ReducerKind::Count => Reducer::Count,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct MetaConvolve {
    sigma: f64,
    kernel_dims: Vec<usize>,
    threshold: usize,
    config: FftConvolverConfig,
    path: ConvolutionPath,
    elapsed_ms: f64,
    image_transforms: usize,
    kernel_transforms: usize,
}

#[derive(Debug, Clone, Serialize)]
struct MetaNeighborhood {
    shape: ShapeKind,
    radius: usize,
    shape_len: usize,
    reducer: Reducer,
    border: BorderMode<u8>,
    parallel: bool,
    elapsed_ms: f64,
}

#[derive(Debug, Clone, Serialize)]
struct MetaMorphology {
    operation: &'static str,
    structuring_element: ShapeKind,
    radius: usize,
    pixel_rule: &'static str,
    foreground: ForegroundDto,
}

#[derive(Debug, Clone, Serialize)]
struct ForegroundDto {
    pixels: usize,
    hull_vertices: Vec<Point2>,
    hull_area: f64,
    hull_perimeter: f64,
}

#[derive(Debug, Clone, Serialize)]
struct MetaSlice {
    axis: usize,
    index: usize,
    interval_min: Vec<i64>,
    interval_max: Vec<i64>,
    len: usize,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.cmd {
        Command::Convolve(args) => run_convolve(args),
        Command::Neighborhood(args) => run_neighborhood(args),
        Command::Morphology(args) => run_morphology(args),
        Command::Slice(args) => run_slice(args),
    }
}

fn run_convolve(args: ConvolveArgs) -> Result<()> {
    let case_dir = prepare_case(&args.common, "convolve")?;
    let img = load_input_u8(&args.common.input)?;

    let config = match &args.config {
        Some(path) => read_json::<FftConvolverConfig>(path)?,
        None => FftConvolverConfig::default(),
    };
    let kernel = gaussian_kernel(&[args.sigma, args.sigma])
        .with_context(|| format!("building gaussian kernel for sigma {}", args.sigma))?;

    let mut conv = Convolver::with_config(
        config.clone(),
        ConvolutionPolicy::with_threshold(args.threshold),
    );
    let mut out = Img::new_fill(img.dims(), 0.0f32);
    let t0 = Instant::now();
    let path = conv
        .convolve(&img.as_view(), &kernel.as_view(), &mut out.as_view_mut())
        .context("convolving input")?;
    let elapsed_ms = t0.elapsed().as_secs_f64() * 1e3;
    log::info!("convolve: {path:?} path in {elapsed_ms:.2} ms");

    save_luma_raw(
        case_dir.join("blurred.png"),
        out.dimension(0),
        out.dimension(1),
        f32_to_u8_vis(out.data()),
    )?;

    let stats = conv.fourier().executor().stats();
    write_json(
        case_dir.join("meta.json"),
        &MetaConvolve {
            sigma: args.sigma,
            kernel_dims: kernel.dims().to_vec(),
            threshold: args.threshold,
            config,
            path,
            elapsed_ms,
            image_transforms: stats.image_transforms,
            kernel_transforms: stats.kernel_transforms,
        },
    )?;

    Ok(())
}

fn run_neighborhood(args: NeighborhoodArgs) -> Result<()> {
    let case_dir = prepare_case(&args.common, "neighborhood")?;
    let img = load_input_u8(&args.common.input)?;

    let shape = args.shape.build(args.radius);
    let shape_len = shape
        .resolve(img.num_dims())
        .context("resolving neighborhood shape")?
        .len();
    let reducer = Reducer::from(args.reducer);
    let border = BorderMode::Skip;

    let mut out = Img::new_fill(img.dims(), 0.0f32);
    let t0 = Instant::now();
    if args.parallel {
        par_map_neighborhood(
            &img.as_view(),
            &mut out.as_view_mut(),
            &*shape,
            &border,
            &ParallelMapConfig::default(),
            |nb| reducer.apply(nb) as f32,
        )
        .context("parallel neighborhood map")?;
    } else {
        map_reduce(
            &img.as_view(),
            &mut out.as_view_mut(),
            &*shape,
            &border,
            reducer,
        )
        .context("neighborhood map")?;
    }
    let elapsed_ms = t0.elapsed().as_secs_f64() * 1e3;

    save_luma_raw(
        case_dir.join("reduced.png"),
        out.dimension(0),
        out.dimension(1),
        f32_to_u8_vis(out.data()),
    )?;

    write_json(
        case_dir.join("meta.json"),
        &MetaNeighborhood {
            shape: args.shape,
            radius: args.radius,
            shape_len,
            reducer,
            border,
            parallel: args.parallel,
            elapsed_ms,
        },
    )?;

    Ok(())
}

fn run_morphology(args: MorphologyArgs) -> Result<()> {
    let case_dir = prepare_case(&args.common, "morphology")?;
    let img = load_input_u8(&args.common.input)?;

    let shape = args.shape.build(args.radius);
    let opened = open_binary_u8(&img.as_view(), &*shape).context("binary open")?;
    let closed = close_binary_u8(&img.as_view(), &*shape).context("binary close")?;

    save_u8_image(case_dir.join("open.png"), &opened)?;
    save_u8_image(case_dir.join("close.png"), &closed)?;

    write_json(
        case_dir.join("meta.json"),
        &MetaMorphology {
            operation: "open+close",
            structuring_element: args.shape,
            radius: args.radius,
            pixel_rule: "binary pixel set iff value > 0",
            foreground: foreground_dto(&opened),
        },
    )?;

    Ok(())
}

fn run_slice(args: SliceArgs) -> Result<()> {
    let case_dir = prepare_case(&args.common, "slice")?;
    let img = load_input_u8(&args.common.input)?;

    if args.axis > 1 {
        bail!("slice axis must be 0 or 1, got {}.", args.axis);
    }
    if args.index >= img.dimension(args.axis) {
        bail!(
            "slice index {} out of range for axis {} of extent {}.",
            args.index,
            args.axis,
            img.dimension(args.axis)
        );
    }

    let mut min = vec![0i64; 2];
    let mut max: Vec<i64> = img.dims().iter().map(|&n| n as i64 - 1).collect();
    min[args.axis] = args.index as i64;
    max[args.axis] = args.index as i64;
    let interval = Interval::new(min.clone(), max.clone()).context("building slice interval")?;

    let view = img.as_view();
    let line = view.hyperslice(&interval).context("slicing input")?;
    let profile: Img<f32> = convert(&line);
    write_csv(case_dir.join("profile.csv"), profile.data())?;

    write_json(
        case_dir.join("meta.json"),
        &MetaSlice {
            axis: args.axis,
            index: args.index,
            interval_min: min,
            interval_max: max,
            len: line.num_elements(),
        },
    )?;

    Ok(())
}

fn prepare_case(common: &CommonArgs, case_name: &str) -> Result<PathBuf> {
    ensure_file_exists(&common.input, "input")?;

    let case_dir = common.out.join(case_name);
    fs::create_dir_all(&case_dir)
        .with_context(|| format!("creating output directory {}", case_dir.display()))?;

    fs::copy(&common.input, case_dir.join("input.png")).with_context(|| {
        format!(
            "copying input {} -> {}",
            common.input.display(),
            case_dir.join("input.png").display()
        )
    })?;

    Ok(case_dir)
}

fn load_input_u8(path: &Path) -> Result<Img<u8>> {
    let dyn_img =
        image::open(path).with_context(|| format!("opening input image {}", path.display()))?;
    let luma = dyn_img.to_luma8();
    let (w, h) = luma.dimensions();
    let data = luma.into_raw();

    Img::from_vec(&[w as usize, h as usize], data)
        .with_context(|| format!("constructing image from {}", path.display()))
}

fn foreground_dto(mask: &Img<u8>) -> ForegroundDto {
    let width = mask.dimension(0);
    let points: Vec<Point2> = mask
        .data()
        .iter()
        .enumerate()
        .filter(|&(_, &v)| v > 0)
        .map(|(i, _)| Point2::new((i % width) as f64, (i / width) as f64))
        .collect();
    let hull = convex_hull(&points);

    ForegroundDto {
        pixels: points.len(),
        hull_area: hull.area(),
        hull_perimeter: hull.perimeter(),
        hull_vertices: hull.vertices,
    }
}

fn save_u8_image(path: PathBuf, img: &Img<u8>) -> Result<()> {
    save_luma_raw(path, img.dimension(0), img.dimension(1), img.data().to_vec())
}

fn save_luma_raw(path: PathBuf, width: usize, height: usize, data: Vec<u8>) -> Result<()> {
    let gray = GrayImage::from_raw(width as u32, height as u32, data)
        .context("constructing GrayImage from raw bytes")?;
    gray.save(&path)
        .with_context(|| format!("saving image {}", path.display()))
}

/// Min/max stretch to `0..=255`; NaN samples map to 0.
fn f32_to_u8_vis(data: &[f32]) -> Vec<u8> {
    let (min_v, max_v) = data
        .iter()
        .filter(|v| v.is_finite())
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });

    if !(max_v - min_v > 1e-12) {
        return vec![0u8; data.len()];
    }

    let scale = 255.0 / (max_v - min_v);
    data.iter()
        .map(|&v| {
            if v.is_finite() {
                ((v - min_v) * scale).round().clamp(0.0, 255.0) as u8
            } else {
                0
            }
        })
        .collect()
}

fn write_json(path: PathBuf, value: &impl Serialize) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value).context("serializing json")?;
    fs::write(&path, bytes).with_context(|| format!("writing json {}", path.display()))
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&data).with_context(|| format!("parsing json {}", path.display()))
}

fn write_csv(path: PathBuf, values: &[f32]) -> Result<()> {
    let mut file =
        fs::File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    writeln!(file, "index,value").context("writing csv header")?;
    for (i, v) in values.iter().enumerate() {
        writeln!(file, "{i},{v}").context("writing csv row")?;
    }
    Ok(())
}

fn ensure_file_exists(path: &Path, what: &str) -> Result<()> {
    if !path.is_file() {
        bail!("{} file not found: {}", what, path.display());
    }
    Ok(())
}

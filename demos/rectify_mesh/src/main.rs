use argh::FromArgs;
use std::path::{Path, PathBuf};

use rectify::image::{Image, ImageSize};
use rectify::imgproc::parallel::ExecutionStrategy;
use rectify::{rectify, RectifyError, RectifyOptions, RectifyRequest};

#[derive(FromArgs)]
/// Rectify a raster through a triangulated mesh and write the result as PNG
struct Args {
    /// path to the JSON request body
    #[argh(option, short = 'r')]
    request: PathBuf,

    /// path to the raster warped through the mesh
    #[argh(option, short = 's')]
    stitch: PathBuf,

    /// path to the raster drawn untransformed under the warped one
    #[argh(option, short = 'c')]
    canvas: Option<PathBuf>,

    /// path of the output PNG
    #[argh(option, short = 'o')]
    output: PathBuf,

    /// number of worker threads, all cores if omitted
    #[argh(option)]
    threads: Option<usize>,
}

fn read_rgba8(path: &Path) -> Result<Image<u8, 4>, RectifyError> {
    let decoded = image::open(path)
        .map_err(|e| RectifyError::RasterLoad(format!("{}: {e}", path.display())))?
        .into_rgba8();
    let size = ImageSize {
        width: decoded.width() as usize,
        height: decoded.height() as usize,
    };
    Ok(Image::new(size, decoded.into_raw())?)
}

fn write_rgba8(path: &Path, img: &Image<u8, 4>) -> Result<(), Box<dyn std::error::Error>> {
    let [width, height]: [u32; 2] = img.size().into();
    image::save_buffer(path, img.as_slice(), width, height, image::ColorType::Rgba8)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let request: RectifyRequest = serde_json::from_slice(&std::fs::read(&args.request)?)?;
    request.validate()?;

    let stitch = read_rgba8(&args.stitch)?;
    let canvas = match &args.canvas {
        Some(path) => read_rgba8(path)?,
        None => Image::from_size_val(ImageSize { width: 1, height: 1 }, 0)?,
    };

    let options = RectifyOptions {
        strategy: args
            .threads
            .map_or(ExecutionStrategy::Parallel, ExecutionStrategy::Fixed),
        ..Default::default()
    };

    log::info!(
        "warping {} through {} triangles onto {}x{}",
        stitch.size(),
        request.triangulation.len(),
        request.canvas_size.width,
        request.canvas_size.height
    );
    let output = rectify(&request, &canvas, &stitch, &options)?;
    write_rgba8(&args.output, &output)?;
    log::info!("wrote {}", args.output.display());

    Ok(())
}

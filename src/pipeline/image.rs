//! Image chain: compression and fitted thumbnails.
//!
//! | Extension      | Treatment                                |
//! |----------------|------------------------------------------|
//! | `png`          | re-encoded, best compression             |
//! | `jpg`, `jpeg`  | re-encoded at `image.jpeg_quality`       |
//! | `svg`          | normalized and minified through usvg     |
//! | anything else  | copied                                   |
//!
//! The smaller of original and re-encoded bytes is written.

use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};

use super::{FileOutcome, TransformError, read_bytes, with_stem_suffix, write_file};
use crate::config::ImageConfig;
use crate::core::PipelineContext;
use crate::freshness::is_output_fresh;
use crate::registry::Route;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Raster {
    Png,
    Jpeg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Raster(Raster),
    Svg,
    Other,
}

impl Format {
    fn of(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "png" => Self::Raster(Raster::Png),
            "jpg" | "jpeg" => Self::Raster(Raster::Jpeg),
            "svg" => Self::Svg,
            _ => Self::Other,
        }
    }
}

pub(super) fn compress(
    route: &Route,
    ctx: &PipelineContext,
    src: &Path,
) -> Result<FileOutcome, TransformError> {
    let options = &ctx.config.image;
    let dest = route.output_path(ctx.root(), src);
    let format = Format::of(src);

    let thumb = match format {
        Format::Raster(raster) if route.thumbnails => {
            Some((with_stem_suffix(&dest, &options.thumb_suffix), raster))
        }
        _ => None,
    };

    let thumb_fresh = thumb
        .as_ref()
        .is_none_or(|(path, _)| is_output_fresh(path, src));
    if is_output_fresh(&dest, src) && thumb_fresh {
        return Ok(FileOutcome::Skipped);
    }

    let original = read_bytes(src)?;
    let (compressed, decoded) = match format {
        Format::Raster(raster) => {
            let img = image::load_from_memory_with_format(&original, raster.image_format())?;
            (Some(encode(&img, raster, options)?), Some(img))
        }
        Format::Svg => (Some(optimize_svg(&original)?), None),
        Format::Other => (None, None),
    };

    let mut written = Vec::with_capacity(2);

    let bytes = match compressed {
        Some(bytes) if bytes.len() < original.len() => bytes,
        _ => original,
    };
    write_file(&dest, bytes)?;
    written.push(dest);

    if let (Some((thumb_path, raster)), Some(img)) = (thumb, decoded) {
        let fitted = fit(img, options.thumb_width, options.thumb_height);
        write_file(&thumb_path, encode(&fitted, raster, options)?)?;
        written.push(thumb_path);
    }

    Ok(FileOutcome::Written(written))
}

impl Raster {
    const fn image_format(self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Jpeg => ImageFormat::Jpeg,
        }
    }
}

fn encode(
    img: &DynamicImage,
    raster: Raster,
    options: &ImageConfig,
) -> Result<Vec<u8>, TransformError> {
    let mut buf = Vec::new();
    match raster {
        Raster::Png => img.write_with_encoder(PngEncoder::new_with_quality(
            &mut buf,
            CompressionType::Best,
            PngFilter::Adaptive,
        ))?,
        Raster::Jpeg => {
            img.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, options.jpeg_quality))?
        }
    }
    Ok(buf)
}

/// Scale down to fit inside `width`x`height`, keeping aspect ratio. Never upscales.
fn fit(img: DynamicImage, width: u32, height: u32) -> DynamicImage {
    if img.width() <= width && img.height() <= height {
        img
    } else {
        img.resize(width, height, FilterType::Lanczos3)
    }
}

fn optimize_svg(content: &[u8]) -> Result<Vec<u8>, TransformError> {
    let tree = usvg::Tree::from_data(content, &usvg::Options::default())?;
    let write_options = usvg::WriteOptions {
        indent: usvg::Indent::None,
        ..Default::default()
    };
    Ok(tree.to_string(&write_options).into_bytes())
}

use std::io::Write as _;

use crate::{
    capture::{CaptureOpts, capture_frame},
    foundation::error::{MockshotError, MockshotResult},
    render::surface::RenderSurface,
    scene::{device::Platform, project::now_millis},
};

/// A store listing screenshot size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExportSize {
    pub id: &'static str,
    pub name: &'static str,
    pub platform: Platform,
    pub width: u32,
    pub height: u32,
    pub suffix: &'static str,
}

pub const EXPORT_SIZES: &[ExportSize] = &[
    ExportSize {
        id: "iphone-6.7",
        name: "iPhone 6.7\"",
        platform: Platform::Ios,
        width: 1290,
        height: 2796,
        suffix: "6.7",
    },
    ExportSize {
        id: "iphone-6.5",
        name: "iPhone 6.5\"",
        platform: Platform::Ios,
        width: 1242,
        height: 2688,
        suffix: "6.5",
    },
    ExportSize {
        id: "iphone-5.5",
        name: "iPhone 5.5\"",
        platform: Platform::Ios,
        width: 1242,
        height: 2208,
        suffix: "5.5",
    },
    ExportSize {
        id: "ipad-12.9",
        name: "iPad Pro 12.9\"",
        platform: Platform::Ios,
        width: 2048,
        height: 2732,
        suffix: "ipad_12.9",
    },
    ExportSize {
        id: "android-phone",
        name: "Android Phone",
        platform: Platform::Android,
        width: 1080,
        height: 1920,
        suffix: "android_phone",
    },
    ExportSize {
        id: "android-tablet",
        name: "Android Tablet",
        platform: Platform::Android,
        width: 1600,
        height: 2560,
        suffix: "android_tablet",
    },
];

pub fn find_export_size(id: &str) -> Option<&'static ExportSize> {
    EXPORT_SIZES.iter().find(|s| s.id == id)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StillFormat {
    #[default]
    Png,
    Jpeg,
}

impl StillFormat {
    pub fn parse(s: &str) -> MockshotResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            other => Err(MockshotError::validation(format!(
                "unknown image format \"{other}\" (expected png or jpg)"
            ))),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StillAsset {
    pub bytes: Vec<u8>,
    pub mime: &'static str,
    pub file_name: String,
}

/// Capture the surface at `width x height` and encode it. `quality` (1..=100) only affects JPEG.
#[tracing::instrument(skip(surface))]
pub fn export_still<S>(
    surface: &mut S,
    width: u32,
    height: u32,
    format: StillFormat,
    quality: u8,
) -> MockshotResult<StillAsset>
where
    S: RenderSurface + ?Sized,
{
    let img = capture_frame(surface, width, height, CaptureOpts::STILL)?;
    Ok(StillAsset {
        bytes: encode_still(img, format, quality)?,
        mime: format.mime(),
        file_name: format!("mockup-{}.{}", now_millis(), format.extension()),
    })
}

/// A multi-size export bundled as one ZIP archive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchAsset {
    pub bytes: Vec<u8>,
    pub mime: &'static str,
    pub file_name: String,
}

/// Export every size in `size_ids` into a ZIP with `ios/` and `android/` folders.
///
/// Unknown ids are skipped with a warning. Entries follow table order.
#[tracing::instrument(skip(surface, on_progress))]
pub fn export_batch<S>(
    surface: &mut S,
    size_ids: &[&str],
    format: StillFormat,
    quality: u8,
    mut on_progress: impl FnMut(usize, usize, &ExportSize),
) -> MockshotResult<BatchAsset>
where
    S: RenderSurface + ?Sized,
{
    for id in size_ids {
        if find_export_size(id).is_none() {
            tracing::warn!(id, "unknown export size skipped");
        }
    }
    let sizes: Vec<&ExportSize> = EXPORT_SIZES
        .iter()
        .filter(|s| size_ids.contains(&s.id))
        .collect();
    if sizes.is_empty() {
        return Err(MockshotError::validation("no export sizes selected"));
    }

    let mut zip = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    for (i, size) in sizes.iter().enumerate() {
        on_progress(i + 1, sizes.len(), size);
        let img = capture_frame(surface, size.width, size.height, CaptureOpts::STILL)?;
        let bytes = encode_still(img, format, quality)?;

        let entry = format!(
            "{}/screenshot_{}.{}",
            platform_folder(size.platform),
            size.suffix,
            format.extension()
        );
        zip.start_file(entry, options).map_err(zip_error)?;
        zip.write_all(&bytes)
            .map_err(|e| MockshotError::encode(e.to_string()))?;
    }
    let bytes = zip.finish().map_err(zip_error)?.into_inner();
    tracing::info!(count = sizes.len(), bytes = bytes.len(), "batch archive encoded");
    Ok(BatchAsset {
        bytes,
        mime: "application/zip",
        file_name: format!("screenshots-{}.zip", now_millis()),
    })
}

pub fn platform_folder(platform: Platform) -> &'static str {
    match platform {
        Platform::Ios => "ios",
        Platform::Android => "android",
    }
}

fn zip_error(e: zip::result::ZipError) -> MockshotError {
    MockshotError::encode(e.to_string())
}

pub fn encode_still(
    img: image::RgbaImage,
    format: StillFormat,
    quality: u8,
) -> MockshotResult<Vec<u8>> {
    let mut out = Vec::new();
    match format {
        StillFormat::Png => {
            img.write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
                .map_err(|e| MockshotError::encode(e.to_string()))?;
        }
        StillFormat::Jpeg => {
            let rgb = flatten_over_white(&img);
            let mut enc =
                image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100));
            enc.encode_image(&rgb)
                .map_err(|e| MockshotError::encode(e.to_string()))?;
        }
    }
    Ok(out)
}

fn flatten_over_white(img: &image::RgbaImage) -> image::RgbImage {
    image::RgbImage::from_fn(img.width(), img.height(), |x, y| {
        let [r, g, b, a] = img.get_pixel(x, y).0;
        let a = u16::from(a);
        let over = |c: u8| ((u16::from(c) * a + 255 * (255 - a) + 127) / 255) as u8;
        image::Rgb([over(r), over(g), over(b)])
    })
}

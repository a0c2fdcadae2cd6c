use std::io::{Cursor, Read as _};

use mockshot::{
    AnimationConfig, BackgroundKind, CaptureOpts, Canvas, CpuSurface, MockshotError,
    RenderSurface, SceneFrame, ScreenConfig, StillFormat, capture_frame, export_batch,
    export_still,
};

fn solid_surface(hex: &str) -> CpuSurface {
    let canvas = Canvas::new(50, 100).unwrap();
    let mut screen = ScreenConfig::new_default("s");
    screen.devices.clear();
    screen.background.kind = BackgroundKind::Solid;
    screen.background.color1 = hex.to_owned();
    let mut frame = SceneFrame::from_screen(&screen, &AnimationConfig::default(), 0.0);
    frame.canvas = canvas;

    let mut surface = CpuSurface::new(canvas);
    surface.submit(frame);
    surface
}

#[test]
fn square_capture_of_a_tall_canvas_is_cropped_not_letterboxed() {
    let mut surface = solid_surface("#3366ff");
    let img = capture_frame(&mut surface, 40, 40, CaptureOpts::GIF).unwrap();
    assert_eq!(img.dimensions(), (40, 40));
    for (x, y) in [(0, 0), (39, 0), (0, 39), (39, 39), (20, 20)] {
        assert_eq!(img.get_pixel(x, y).0, [0x33, 0x66, 0xff, 0xff], "({x}, {y})");
    }
}

#[test]
fn png_still_decodes_at_requested_size() {
    let mut surface = solid_surface("#ff0000");
    let asset = export_still(&mut surface, 120, 240, StillFormat::Png, 92).unwrap();
    assert_eq!(asset.mime, "image/png");
    assert!(asset.file_name.ends_with(".png"));

    let img = image::load_from_memory(&asset.bytes).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (120, 240));
    assert_eq!(img.get_pixel(60, 120).0, [255, 0, 0, 255]);
}

#[test]
fn jpeg_still_is_opaque() {
    let mut surface = solid_surface("#00ff00");
    let asset = export_still(&mut surface, 64, 64, StillFormat::Jpeg, 90).unwrap();
    assert_eq!(asset.mime, "image/jpeg");
    assert!(asset.file_name.ends_with(".jpg"));
    let img = image::load_from_memory(&asset.bytes).unwrap();
    assert_eq!((img.width(), img.height()), (64, 64));
    assert!(!img.color().has_alpha());
}

#[test]
fn batch_zips_one_entry_per_platform_folder() {
    let mut surface = solid_surface("#101010");
    let mut seen = Vec::new();
    let archive = export_batch(
        &mut surface,
        &["android-phone", "iphone-5.5", "not-a-size"],
        StillFormat::Png,
        92,
        |i, n, size| seen.push((i, n, size.id)),
    )
    .unwrap();

    assert_eq!(archive.mime, "application/zip");
    assert!(archive.file_name.ends_with(".zip"));
    assert_eq!(seen, vec![(1, 2, "iphone-5.5"), (2, 2, "android-phone")]);

    let mut zip = zip::ZipArchive::new(Cursor::new(archive.bytes)).unwrap();
    let mut names: Vec<&str> = zip.file_names().collect();
    names.sort_unstable();
    assert_eq!(
        names,
        vec!["android/screenshot_android_phone.png", "ios/screenshot_5.5.png"]
    );

    for (entry, dims) in [
        ("ios/screenshot_5.5.png", (1242, 2208)),
        ("android/screenshot_android_phone.png", (1080, 1920)),
    ] {
        let mut bytes = Vec::new();
        zip.by_name(entry).unwrap().read_to_end(&mut bytes).unwrap();
        let img = image::load_from_memory(&bytes).unwrap();
        assert_eq!((img.width(), img.height()), dims, "{entry}");
    }
}

#[test]
fn batch_with_no_known_sizes_is_rejected() {
    let mut surface = solid_surface("#101010");
    let err = export_batch(&mut surface, &["nope"], StillFormat::Png, 92, |_, _, _| {})
        .unwrap_err();
    assert!(matches!(err, MockshotError::Validation(_)), "{err}");
}

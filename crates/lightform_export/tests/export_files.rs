//! Cubemaps exported to disk

use glam::Vec4;
use lightform_env::{Cubemap, EnvError};
use lightform_export::{
    export_cubemap, save, ExportError, ExportFormat, ExportOptions, ExportedImage, ResolutionPreset,
};

#[test]
fn test_png_export_round_trip() {
    let cube = Cubemap::filled(4, Vec4::new(1.0, 0.0, 0.0, 1.0)).unwrap();
    let exported = export_cubemap(&cube, &ExportOptions::new(ExportFormat::Png, ResolutionPreset::OneK)).unwrap();
    assert_eq!(exported.filename, "envmap.png");
    assert_eq!(exported.mime_type, "image/png");

    let dir = tempfile::tempdir().unwrap();
    let path = save(&exported, dir.path()).unwrap();
    assert_eq!(path, dir.path().join("envmap.png"));

    let decoded = image::open(&path).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (1024, 512));
    assert_eq!(decoded.get_pixel(0, 0).0, [255, 0, 0, 255]);
    assert_eq!(decoded.get_pixel(1023, 511).0, [255, 0, 0, 255]);
}

#[test]
fn test_concurrent_saves_leave_one_whole_file() {
    let dir = tempfile::tempdir().unwrap();
    let images: Vec<ExportedImage> = (0..8u8)
        .map(|i| ExportedImage {
            filename: "envmap.png".into(),
            mime_type: "image/png",
            width: 1,
            height: 1,
            bytes: vec![i; 64 * 1024],
        })
        .collect();

    std::thread::scope(|s| {
        for image in &images {
            let dir = dir.path();
            s.spawn(move || save(image, dir).unwrap());
        }
    });

    let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().map(|e| e.unwrap().file_name()).collect();
    assert_eq!(entries, vec![std::ffi::OsString::from("envmap.png")]);
    let written = std::fs::read(dir.path().join("envmap.png")).unwrap();
    assert!(images.iter().any(|image| image.bytes == written));
}

#[test]
fn test_hdr_export_keeps_radiance() {
    let cube = Cubemap::filled(4, Vec4::new(6.0, 3.0, 1.5, 1.0)).unwrap();
    let exported = export_cubemap(&cube, &ExportOptions::default()).unwrap();
    assert_eq!(exported.filename, "envmap.hdr");

    let decoded = image::load_from_memory_with_format(&exported.bytes, image::ImageFormat::Hdr)
        .unwrap()
        .to_rgb32f();
    assert_eq!(decoded.dimensions(), (1024, 512));
    let p = decoded.get_pixel(512, 256).0;
    // RGBE keeps 8 bits of mantissa per channel
    assert!((p[0] - 6.0).abs() < 0.05, "{:?}", p);
    assert!((p[2] - 1.5).abs() < 0.05, "{:?}", p);
}

#[test]
fn test_jpeg_quality_is_clamped() {
    let cube = Cubemap::filled(2, Vec4::splat(0.5)).unwrap();
    let mut options = ExportOptions::new(ExportFormat::Jpeg, ResolutionPreset::OneK);
    options.jpeg_quality = 0;
    let exported = export_cubemap(&cube, &options).unwrap();
    assert_eq!(exported.filename, "envmap.jpg");
    assert_eq!((exported.width, exported.height), (1024, 512));
}

#[test]
fn test_projection_errors_convert() {
    let err: ExportError = EnvError::Readback("context lost".into()).into();
    assert!(matches!(err, ExportError::Projection(_)));
    assert!(err.to_string().contains("context lost"));
}

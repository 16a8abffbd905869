use image::codecs::png::PngEncoder;
use image::{ColorType as PixelType, ImageEncoder, ImageFormat};
use pngrle::archive::{self, ArchiveCodec, ArchiveOptions};
use pngrle::png::{self, ReadOptions};
use pngrle::{ColorType, Error};
use std::fs;

fn encode_png(pixels: &[u8], width: u32, height: u32, kind: PixelType) -> Vec<u8> {
    let mut out = vec![];
    PngEncoder::new(&mut out)
        .write_image(pixels, width, height, kind)
        .unwrap();
    out
}

#[test]
fn png_to_archive_and_back() {
    let dir = tempfile::tempdir().unwrap();
    // flat regions so the IDAT stream has something for RLE to find
    let pixels: Vec<u8> = (0..32 * 16).map(|i| if i % 32 < 16 { 0x10 } else { 0xE0 }).collect();
    let source = dir.path().join("gradient.png");
    fs::write(&source, encode_png(&pixels, 32, 16, PixelType::L8)).unwrap();

    for codec in [ArchiveCodec::Rle, ArchiveCodec::Raw] {
        let options = ArchiveOptions { codec };
        let image = png::read_file(&source, &ReadOptions { verify_crc: true }).unwrap();
        assert_eq!((image.width(), image.height()), (32, 16));
        assert_eq!(image.info.color_type, ColorType::Grayscale);

        let stored = archive::archive_path(dir.path().join("gradient"));
        archive::save_archive(&stored, &image, &options).unwrap();
        let header = fs::read(&stored).unwrap();
        assert!(header.starts_with(b"32 16 1 "));

        let loaded = archive::load_archive(&stored, &options).unwrap();
        assert_eq!(loaded.payload, image.payload);

        let restored = archive::decompressed_png_path(&stored);
        assert_eq!(restored, dir.path().join("gradient_decompressed.png"));
        png::write_file(&restored, &loaded).unwrap();

        let decoded = image::open(&restored).unwrap().to_luma8();
        assert_eq!(decoded.dimensions(), (32, 16));
        assert_eq!(decoded.into_raw(), pixels);
    }
}

#[test]
fn rgba_round_trip_through_files() {
    let dir = tempfile::tempdir().unwrap();
    let pixels: Vec<u8> = (0..5 * 7 * 4).map(|i| (i / 3) as u8).collect();
    let bytes = encode_png(&pixels, 5, 7, PixelType::Rgba8);

    let source = dir.path().join("rgba.png");
    fs::write(&source, &bytes).unwrap();
    let image = png::read_file(&source, &ReadOptions::default()).unwrap();
    assert_eq!(image.channels(), 4);

    let stored = dir.path().join("rgba.samet");
    archive::save_archive(&stored, &image, &ArchiveOptions::default()).unwrap();
    let loaded = archive::load_archive(&stored, &ArchiveOptions::default()).unwrap();

    let restored = dir.path().join("restored.png");
    png::write_file(&restored, &loaded).unwrap();
    let decoded = image::load_from_memory_with_format(&fs::read(&restored).unwrap(), ImageFormat::Png)
        .unwrap()
        .to_rgba8();
    assert_eq!(decoded.into_raw(), pixels);
}

#[test]
fn missing_and_foreign_files() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.png");
    assert!(matches!(
        png::read_file(&missing, &ReadOptions::default()),
        Err(Error::Io(_))
    ));

    let text = dir.path().join("notes.png");
    fs::write(&text, "just some text, not an image").unwrap();
    assert!(matches!(
        png::read_file(&text, &ReadOptions::default()),
        Err(Error::InvalidSignature(_))
    ));

    let short = dir.path().join("short.samet");
    fs::write(&short, b"2 2 3 100\n\x00\x01").unwrap();
    assert!(matches!(
        archive::load_archive(&short, &ArchiveOptions::default()),
        Err(Error::TruncatedInput(_))
    ));
}

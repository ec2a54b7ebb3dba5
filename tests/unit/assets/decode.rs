use std::io::Cursor;

use super::*;

fn encode(img: image::RgbaImage, format: image::ImageFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), format)
        .unwrap();
    buf
}

const SQUARE_SVG: &[u8] = br##"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10">
<rect x="0" y="0" width="10" height="10" fill="#ff0000"/>
</svg>"##;

#[test]
fn decode_image_png_keeps_straight_alpha() {
    let img = image::RgbaImage::from_raw(1, 1, vec![100u8, 50, 200, 128]).unwrap();
    let decoded = decode_image(&encode(img, image::ImageFormat::Png)).unwrap();
    assert_eq!(decoded.width(), 1);
    assert_eq!(decoded.height(), 1);
    assert_eq!(decoded.as_bytes(), &[100, 50, 200, 128]);
}

#[test]
fn decode_image_garbage_is_decode_error() {
    let err = decode_image(b"not an image").unwrap_err();
    assert!(matches!(err, JayverseError::Decode(_)));
}

#[test]
fn mime_mapping_accepts_picker_types() {
    assert_eq!(ImageMime::from_mime("image/png").unwrap(), ImageMime::Png);
    assert_eq!(ImageMime::from_mime("IMAGE/JPEG").unwrap(), ImageMime::Jpeg);
    assert_eq!(
        ImageMime::from_mime("image/svg+xml; charset=utf-8").unwrap(),
        ImageMime::Svg
    );
    assert!(matches!(
        ImageMime::from_mime("application/pdf"),
        Err(JayverseError::Validation(_))
    ));
}

#[test]
fn sniff_detects_svg_and_png() {
    let png = encode(image::RgbaImage::new(2, 2), image::ImageFormat::Png);
    assert_eq!(ImageMime::sniff(&png), Some(ImageMime::Png));
    assert_eq!(ImageMime::sniff(SQUARE_SVG), Some(ImageMime::Svg));
    assert_eq!(ImageMime::sniff(b"hello"), None);
}

#[test]
fn svg_asset_rasterizes_at_requested_size() {
    let asset = decode_asset(SQUARE_SVG, Some("image/svg+xml")).unwrap();
    let img = asset.rasterize(20, 8).unwrap();
    assert_eq!((img.width(), img.height()), (20, 8));
    assert_eq!(img.pixel(10, 4), Some([255, 0, 0, 255]));

    let intrinsic = asset.into_raster().unwrap();
    assert_eq!((intrinsic.width(), intrinsic.height()), (10, 10));
}

#[test]
fn decode_svg_parse_err() {
    assert!(parse_svg(br#"<svg"#).is_err());
    assert!(matches!(
        decode_asset(b"<svg", Some("image/svg+xml")),
        Err(JayverseError::Decode(_))
    ));
}

#[test]
fn rasterize_rejects_zero_size() {
    let svg = parse_svg(SQUARE_SVG).unwrap();
    assert!(rasterize_svg(&svg, 0, 10).is_err());
}

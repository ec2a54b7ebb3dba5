use super::*;

#[test]
fn png_export_decodes_back_to_same_pixels() {
    let img = RasterImage::from_rgba8(2, 1, vec![255, 0, 0, 255, 0, 0, 255, 128]).unwrap();
    let result = CompositeResult::new(Tool::Glitch, img.clone());
    let png = result.to_png().unwrap();
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    let back = crate::assets::decode::decode_image(&png).unwrap();
    assert_eq!(back, img);
}

#[test]
fn data_url_has_png_prefix_and_roundtrips() {
    let img = RasterImage::filled(3, 3, [9, 9, 9, 255]).unwrap();
    let url = CompositeResult::new(Tool::Meme, img).to_data_url().unwrap();
    assert!(url.starts_with("data:image/png;base64,"));
    let (mime, bytes) = decode_data_url(&url).unwrap();
    assert_eq!(mime, "image/png");
    assert_eq!(&bytes[1..4], b"PNG");
}

#[test]
fn decode_data_url_rejects_malformed_input() {
    assert!(decode_data_url("https://example.com/a.png").is_err());
    assert!(decode_data_url("data:image/png;base64").is_err());
    assert!(decode_data_url("data:text/plain,hello").is_err());
    assert!(matches!(
        decode_data_url("data:image/png;base64,@@@"),
        Err(JayverseError::Decode(_))
    ));
}

#[test]
fn download_filenames_follow_tool_slugs() {
    assert_eq!(
        download_filename(Tool::Glitch, 1_700_000_000_000),
        "jayverse-glitch-pfp-1700000000000.png"
    );
    assert_eq!(download_filename(Tool::Meme, 5), "jayverse-meme-5.png");
    let r = CompositeResult::new(Tool::Mockup, RasterImage::filled(1, 1, [0; 4]).unwrap());
    assert_eq!(r.download_filename(7), "jayverse-mockup-7.png");
}

#[test]
fn tool_metadata_matches_gallery_conventions() {
    assert_eq!(Tool::Glitch.display_name(), "Glitch My Profile");
    assert_eq!(Tool::Mockup.gallery_prefix(), "mockup");
    assert_eq!(serde_json::to_string(&Tool::Scene).unwrap(), "\"scene\"");
}

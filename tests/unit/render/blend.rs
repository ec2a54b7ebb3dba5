use super::*;

#[test]
fn over_opacity_0_is_noop() {
    let dst = [1, 2, 3, 4];
    let src = [200, 200, 200, 200];
    assert_eq!(over(dst, src, 0.0), dst);
}

#[test]
fn over_src_opaque_replaces_dst() {
    assert_eq!(over([0, 0, 0, 255], [255, 0, 0, 255], 1.0), [255, 0, 0, 255]);
}

#[test]
fn over_dst_transparent_returns_scaled_src() {
    let src = [100, 110, 120, 200];
    assert_eq!(over([0, 0, 0, 0], src, 1.0), src);
}

#[test]
fn blend_mode_names_parse_both_ways() {
    for m in BlendMode::ALL {
        assert_eq!(m.as_str().parse::<BlendMode>().unwrap(), m);
    }
    assert_eq!("normal".parse::<BlendMode>().unwrap(), BlendMode::Normal);
    assert_eq!(" Multiply ".parse::<BlendMode>().unwrap(), BlendMode::Multiply);
    assert!("plus-lighter".parse::<BlendMode>().is_err());

    let m: BlendMode = serde_json::from_str("\"source-over\"").unwrap();
    assert_eq!(m, BlendMode::Normal);
    let m: BlendMode = serde_json::from_str("\"color-dodge\"").unwrap();
    assert_eq!(m, BlendMode::ColorDodge);
}

#[test]
fn multiply_on_opaque_pixels_multiplies_channels() {
    let mut dst = vec![200, 100, 255, 255];
    let src = vec![128, 255, 0, 255];
    composite_in_place(&mut dst, &src, 1.0, BlendMode::Multiply).unwrap();
    // 200*128/255 = 100.4, 100*255/255 = 100, 255*0 = 0
    assert_eq!(dst, vec![100, 100, 0, 255]);
}

#[test]
fn screen_with_black_and_multiply_with_white_are_identity() {
    let base = vec![10, 120, 240, 255];

    let mut dst = base.clone();
    composite_in_place(&mut dst, &[0, 0, 0, 255], 1.0, BlendMode::Screen).unwrap();
    assert_eq!(dst, base);

    let mut dst = base.clone();
    composite_in_place(&mut dst, &[255, 255, 255, 255], 1.0, BlendMode::Multiply).unwrap();
    assert_eq!(dst, base);
}

#[test]
fn transparent_source_leaves_destination_for_every_mode() {
    let base = vec![10, 20, 30, 255, 40, 50, 60, 128];
    let src = vec![255, 0, 0, 0, 0, 255, 0, 0];
    for m in BlendMode::ALL {
        let mut dst = base.clone();
        composite_in_place(&mut dst, &src, 1.0, m).unwrap();
        assert_eq!(dst, base, "mode {m}");
    }
}

#[test]
fn blend_over_transparent_destination_shows_source() {
    let src = vec![200, 100, 50, 255];
    for m in BlendMode::ALL {
        let mut dst = vec![0, 0, 0, 0];
        composite_in_place(&mut dst, &src, 1.0, m).unwrap();
        assert_eq!(dst, src, "mode {m}");
    }
}

#[test]
fn luminosity_keeps_destination_hue_for_gray_source() {
    let mut dst = vec![255, 0, 0, 255];
    composite_in_place(&mut dst, &[128, 128, 128, 255], 1.0, BlendMode::Luminosity).unwrap();
    assert!(dst[0] > dst[1] && dst[0] > dst[2]);
    assert_eq!(dst[1], dst[2]);
    assert_eq!(dst[3], 255);
}

#[test]
fn mismatched_buffers_are_rejected() {
    let mut dst = vec![0u8; 8];
    assert!(composite_in_place(&mut dst, &[0u8; 4], 1.0, BlendMode::Normal).is_err());
}

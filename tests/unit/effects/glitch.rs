use super::*;

fn gradient(w: u32, h: u32) -> RasterImage {
    let mut bytes = Vec::with_capacity((w * h * 4) as usize);
    for y in 0..h {
        for x in 0..w {
            bytes.extend_from_slice(&[(x * 7) as u8, (y * 11) as u8, ((x + y) * 3) as u8, 255]);
        }
    }
    RasterImage::from_rgba8(w, h, bytes).unwrap()
}

#[test]
fn zero_parameters_are_identity() {
    let src = gradient(17, 9);
    let out = apply_glitch(&src, &GlitchParams::none());
    assert_eq!(out, src);
}

#[test]
fn output_keeps_dimensions_and_input_is_untouched() {
    let src = gradient(40, 30);
    let before = src.clone();
    let out = apply_glitch(&src, &GlitchParams::default());
    assert_eq!((out.width(), out.height()), (40, 30));
    assert_eq!(src, before);
}

#[test]
fn scanlines_darken_even_rows_only() {
    let src = RasterImage::filled(3, 4, [200, 100, 50, 180]).unwrap();
    let params = GlitchParams {
        scanline_intensity: 0.5,
        ..GlitchParams::none()
    };
    let out = apply_glitch(&src, &params);
    assert_eq!(out.pixel(1, 0), Some([100, 50, 25, 180]));
    assert_eq!(out.pixel(1, 1), Some([200, 100, 50, 180]));
    assert_eq!(out.pixel(2, 2), Some([100, 50, 25, 180]));
    assert_eq!(out.pixel(0, 3), Some([200, 100, 50, 180]));
}

#[test]
fn rgb_shift_reads_red_forward_and_blue_backward() {
    // One row of 5 pixels with distinct channels.
    let mut bytes = Vec::new();
    for i in 0..5u8 {
        bytes.extend_from_slice(&[10 + i, 100 + i, 200 + i, 255]);
    }
    let src = RasterImage::from_rgba8(5, 1, bytes).unwrap();
    let params = GlitchParams {
        rgb_shift_pixels: 2.0,
        ..GlitchParams::none()
    };
    let out = apply_glitch(&src, &params);

    // Pixel 0: red from 2, blue falls back to own.
    assert_eq!(out.pixel(0, 0), Some([12, 100, 200, 255]));
    // Pixel 2: red from 4, blue from 0.
    assert_eq!(out.pixel(2, 0), Some([14, 102, 200, 255]));
    // Pixel 4: red falls back to own, blue from 2.
    assert_eq!(out.pixel(4, 0), Some([14, 104, 202, 255]));
}

#[test]
fn rgb_shift_crosses_row_boundaries() {
    let mut bytes = Vec::new();
    for i in 0..4u8 {
        bytes.extend_from_slice(&[i * 10, 0, i * 10, 255]);
    }
    let src = RasterImage::from_rgba8(2, 2, bytes).unwrap();
    let params = GlitchParams {
        rgb_shift_pixels: 1.0,
        ..GlitchParams::none()
    };
    let out = apply_glitch(&src, &params);
    // Last pixel of row 0 takes red from first pixel of row 1.
    assert_eq!(out.pixel(1, 0).unwrap()[0], 20);
    // First pixel of row 1 takes blue from last pixel of row 0.
    assert_eq!(out.pixel(0, 1).unwrap()[2], 10);
}

#[test]
fn rgb_shift_below_half_pixel_is_noop() {
    let src = gradient(8, 8);
    let params = GlitchParams {
        rgb_shift_pixels: 0.4,
        ..GlitchParams::none()
    };
    assert_eq!(apply_glitch(&src, &params), src);
}

#[test]
fn block_glitch_is_reproducible_per_seed() {
    let src = gradient(64, 64);
    let params = GlitchParams {
        pixel_glitch_intensity: 0.1,
        rgb_shift_pixels: 0.0,
        scanline_intensity: 0.0,
        seed: 42,
    };
    let a = apply_glitch(&src, &params);
    let b = apply_glitch(&src, &params);
    assert_eq!(a, b);
    assert_eq!((a.width(), a.height()), (64, 64));
}

#[test]
fn some_seed_displaces_pixels_at_max_intensity() {
    // intensity 0.1 gives probability 0.5 per strip; at least one of many seeds must move pixels.
    let src = gradient(64, 200);
    let changed = (0..8u64).any(|seed| apply_glitch(&src, &blocks_only(0.1, seed)) != src);
    assert!(changed);
}

fn blocks_only(intensity: f64, seed: u64) -> GlitchParams {
    GlitchParams {
        pixel_glitch_intensity: intensity,
        rgb_shift_pixels: 0.0,
        scanline_intensity: 0.0,
        seed,
    }
}

// Every pixel names its own coordinates, so a moved pixel shows where it came from.
fn coordinates(w: u32, h: u32) -> RasterImage {
    let mut bytes = Vec::with_capacity((w * h * 4) as usize);
    for y in 0..h {
        for x in 0..w {
            bytes.extend_from_slice(&[x as u8, y as u8, 0, 255]);
        }
    }
    RasterImage::from_rgba8(w, h, bytes).unwrap()
}

// Horizontal shift `d` with `out(x, y) == src(x - d, y)` wherever a source pixel lands, and
// `out(x, y) == src(x, y)` where nothing lands. `None` when the row fits no shift in range.
fn row_shift(src: &RasterImage, out: &RasterImage, y: u32, max_offset: i64) -> Option<i64> {
    let w = i64::from(src.width());
    (-max_offset..=max_offset).find(|&d| {
        (0..w).all(|x| {
            let from = x - d;
            let expected = if (0..w).contains(&from) {
                src.pixel(from as u32, y)
            } else {
                src.pixel(x as u32, y)
            };
            out.pixel(x as u32, y) == expected
        })
    })
}

#[test]
fn block_glitch_moves_whole_strips_within_the_offset_bound() {
    // intensity 0.1: strips of round(0.1 * 200) = 20 rows, offsets within +-round(0.1 * 50) = 5,
    // and no vertical jitter since floor(r * 0.1 * 10) is always 0.
    let (w, h) = (64u32, 200u32);
    let pixel_size = 20u32;
    let max_offset = 5i64;
    let src = coordinates(w, h);

    let mut moved_strips = 0;
    let mut still_strips = 0;
    for seed in 0..8u64 {
        let out = apply_glitch(&src, &blocks_only(0.1, seed));
        for strip in 0..(h / pixel_size) {
            let first = strip * pixel_size;
            let shifts: Vec<Option<i64>> = (first..first + pixel_size)
                .map(|y| row_shift(&src, &out, y, max_offset))
                .collect();
            assert!(
                shifts.iter().all(|s| s.is_some()),
                "seed {seed} strip {strip}: row moved beyond +-{max_offset} or vertically"
            );
            assert!(
                shifts.windows(2).all(|p| p[0] == p[1]),
                "seed {seed} strip {strip}: rows of one strip moved differently: {shifts:?}"
            );
            if shifts[0] == Some(0) {
                still_strips += 1;
            } else {
                moved_strips += 1;
            }
        }
    }
    assert!(moved_strips > 0);
    assert!(still_strips > 0);
}

#[test]
fn block_glitch_strip_height_follows_intensity() {
    // intensity 0.02: strips of 4 rows with offsets within +-1.
    let (w, h) = (32u32, 400u32);
    let src = coordinates(w, h);
    let mut boundaries_seen = false;
    for seed in 0..4u64 {
        let out = apply_glitch(&src, &blocks_only(0.02, seed));
        let shifts: Vec<i64> = (0..h)
            .map(|y| row_shift(&src, &out, y, 1).expect("shift within +-1"))
            .collect();
        for (y, pair) in shifts.windows(2).enumerate() {
            let next = y as u32 + 1;
            if pair[0] != pair[1] {
                assert_eq!(next % 4, 0, "seed {seed}: shift changes inside a strip at row {next}");
                boundaries_seen = true;
            }
        }
    }
    assert!(boundaries_seen);
}

#[test]
fn rgb_shift_reads_the_scanline_output() {
    // Row 0 is darkened first; the shift then pulls row 0's darkened blue into row 1 and
    // row 1's untouched red into row 0.
    let mut bytes = Vec::new();
    for c in [100u8, 120, 140, 160, 180, 200] {
        bytes.extend_from_slice(&[c, 80, c, 255]);
    }
    let src = RasterImage::from_rgba8(3, 2, bytes).unwrap();
    let params = GlitchParams {
        scanline_intensity: 0.5,
        rgb_shift_pixels: 1.0,
        ..GlitchParams::none()
    };
    let out = apply_glitch(&src, &params);

    assert_eq!(out.pixel(0, 0), Some([60, 40, 50, 255]));
    assert_eq!(out.pixel(2, 0), Some([160, 40, 60, 255]));
    assert_eq!(out.pixel(0, 1), Some([180, 80, 70, 255]));
    assert_eq!(out.pixel(2, 1), Some([200, 80, 180, 255]));
}

#[test]
fn scanline_rounding_ties_go_to_even() {
    let mut bytes = Vec::new();
    for c in [1u8, 3, 5] {
        bytes.extend_from_slice(&[c, c, c, 255]);
    }
    let src = RasterImage::from_rgba8(3, 1, bytes).unwrap();
    let params = GlitchParams {
        scanline_intensity: 0.5,
        ..GlitchParams::none()
    };
    let out = apply_glitch(&src, &params);
    assert_eq!(out.pixel(0, 0), Some([0, 0, 0, 255]));
    assert_eq!(out.pixel(1, 0), Some([2, 2, 2, 255]));
    assert_eq!(out.pixel(2, 0), Some([2, 2, 2, 255]));
}

#[test]
fn out_of_range_parameters_are_clamped() {
    let src = gradient(10, 10);
    let wild = GlitchParams {
        pixel_glitch_intensity: -3.0,
        rgb_shift_pixels: f64::NAN,
        scanline_intensity: -1.0,
        seed: 7,
    };
    assert_eq!(apply_glitch(&src, &wild), src);
}

use super::*;

fn system_font() -> Option<LoadedFont> {
    LoadedFont::from_system(&["DejaVu Sans".to_string()]).ok()
}

fn style() -> OutlinedTextStyle {
    OutlinedTextStyle {
        size_px: 24.0,
        line_height: 26.4,
        fill: Rgba8::WHITE,
        stroke: Rgba8::BLACK,
        stroke_width: 2.0,
    }
}

fn painted_rows(surface: &Surface) -> Vec<u32> {
    (0..surface.height())
        .filter(|&y| (0..surface.width()).any(|x| surface.pixel_premul(x, y).is_some_and(|p| p[3] > 0)))
        .collect()
}

#[test]
fn empty_block_leaves_surface_untouched() {
    let Some(font) = system_font() else {
        return;
    };
    let mut painter = TextPainter::new(font);
    let mut s = Surface::new(32, 32).unwrap();
    painter
        .draw_block(&mut s, &[], BlockAnchor::Top(0.0), &style())
        .unwrap();
    assert!(painted_rows(&s).is_empty());
}

#[test]
fn top_and_bottom_anchors_paint_near_their_edges() {
    let Some(font) = system_font() else {
        return;
    };
    let mut painter = TextPainter::new(font);

    let mut s = Surface::new(200, 200).unwrap();
    painter
        .draw_block(&mut s, &["TOP".to_string()], BlockAnchor::Top(10.0), &style())
        .unwrap();
    let rows = painted_rows(&s);
    assert!(!rows.is_empty());
    assert!(rows.iter().all(|&y| y < 60), "{rows:?}");

    let mut s = Surface::new(200, 200).unwrap();
    painter
        .draw_block(
            &mut s,
            &["BOTTOM".to_string()],
            BlockAnchor::Bottom(190.0),
            &style(),
        )
        .unwrap();
    let rows = painted_rows(&s);
    assert!(!rows.is_empty());
    assert!(rows.iter().all(|&y| y > 140), "{rows:?}");
}

#[test]
fn lines_are_horizontally_centered() {
    let Some(font) = system_font() else {
        return;
    };
    let mut painter = TextPainter::new(font);
    let mut s = Surface::new(300, 80).unwrap();
    painter
        .draw_block(&mut s, &["MMMM".to_string()], BlockAnchor::Top(10.0), &style())
        .unwrap();

    let cols: Vec<u32> = (0..s.width())
        .filter(|&x| (0..s.height()).any(|y| s.pixel_premul(x, y).is_some_and(|p| p[3] > 0)))
        .collect();
    let (Some(&left), Some(&right)) = (cols.first(), cols.last()) else {
        panic!("nothing painted");
    };
    let mid = (left + right) as i64 / 2;
    assert!((mid - 150).abs() <= 8, "left={left} right={right}");
}

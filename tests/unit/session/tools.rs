use super::*;

const WAIT: Duration = Duration::from_secs(5);

#[test]
fn glitch_runner_commits_latest_parameters() {
    let src = RasterImage::filled(8, 6, [100, 150, 200, 255]).unwrap();
    let runner = glitch_runner(src.clone(), Duration::from_millis(20)).unwrap();
    runner
        .submit(GlitchParams {
            scanline_intensity: 1.0,
            ..GlitchParams::none()
        })
        .unwrap();
    let g = runner.submit(GlitchParams::none()).unwrap();
    assert!(runner.wait_settled(g, WAIT));

    let (visible_gen, result) = runner.visible().unwrap();
    assert_eq!(visible_gen, g);
    assert_eq!(result.tool, Tool::Glitch);
    assert_eq!(result.image, src);
}

#[test]
fn meme_runner_without_text_returns_template() {
    let template = RasterImage::filled(10, 10, [5, 5, 5, 255]).unwrap();
    let runner = meme_runner(
        template.clone(),
        FontChoice::File("/nonexistent.ttf".into()),
        Duration::from_millis(5),
    )
    .unwrap();
    let g = runner.submit(MemeParams::default()).unwrap();
    assert!(runner.wait_settled(g, WAIT));
    assert_eq!(runner.visible().unwrap().1.image, template);
    assert_eq!(runner.last_error(), None);
}

#[test]
fn runners_record_errors_and_draw_logos() {
    let template = RasterImage::filled(10, 10, [5, 5, 5, 255]).unwrap();
    let runner = meme_runner(
        template,
        FontChoice::File("/nonexistent.ttf".into()),
        Duration::from_millis(5),
    )
    .unwrap();
    let g = runner
        .submit(MemeParams {
            top_text: "hello".to_string(),
            ..MemeParams::default()
        })
        .unwrap();
    assert!(runner.wait_settled(g, WAIT));
    assert!(runner.visible().is_none());
    assert!(runner.last_error().unwrap().starts_with("render error"));

    let template = RasterImage::filled(20, 20, [0, 0, 0, 255]).unwrap();
    let logo = DecodedAsset::Raster(RasterImage::filled(1, 1, [255, 255, 255, 255]).unwrap());
    let placement = PlacementRect::new(5.0, 5.0, 10.0, 10.0).unwrap();
    let runner =
        mockup_runner(template, placement, Some(logo), Duration::from_millis(5)).unwrap();
    let g = runner.submit(MockupParams::default()).unwrap();
    assert!(runner.wait_settled(g, WAIT));
    let (_, result) = runner.visible().unwrap();
    assert_eq!(result.tool, Tool::Mockup);
    assert_eq!(result.image.pixel(10, 10), Some([255, 255, 255, 255]));
    assert_eq!(result.image.pixel(2, 2), Some([0, 0, 0, 255]));
}

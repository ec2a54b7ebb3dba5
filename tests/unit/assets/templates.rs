use super::*;

#[test]
fn builtin_catalog_is_valid_and_searchable() {
    let c = TemplateCatalog::builtin();
    c.validate().unwrap();
    assert_eq!(c.memes.len(), 4);
    assert_eq!(c.mockups.len(), 4);

    let drake = c.meme("drake_hotline_bling").unwrap();
    assert_eq!(drake.default_bottom_text.as_deref(), Some("Simple Solution"));

    let brain = c.meme("expanding_brain").unwrap();
    assert_eq!(brain.default_bottom_text, None);

    let phone = c.mockup("phone_screen").unwrap();
    assert_eq!(phone.placement.width, 628.0);
    assert!(c.mockup("nope").is_err());
}

#[test]
fn catalog_json_roundtrips_and_defaults_missing_sections() {
    let json = r#"{
        "memes": [
            { "id": "m1", "name": "One", "image_src": "memes/one.png", "default_top_text": "Hi" }
        ]
    }"#;
    let c = TemplateCatalog::from_reader(json.as_bytes()).unwrap();
    assert_eq!(c.memes.len(), 1);
    assert!(c.mockups.is_empty());
    assert_eq!(c.memes[0].default_bottom_text, None);
}

#[test]
fn catalog_rejects_duplicates_and_bad_rects() {
    let dup = r#"{ "memes": [
        { "id": "a", "name": "A", "image_src": "a.png" },
        { "id": "a", "name": "B", "image_src": "b.png" }
    ] }"#;
    assert!(TemplateCatalog::from_reader(dup.as_bytes()).is_err());

    let bad = r#"{ "mockups": [
        { "id": "m", "name": "M", "image_src": "m.png",
          "placement": { "x": 0, "y": 0, "width": 0, "height": 5 } }
    ] }"#;
    assert!(TemplateCatalog::from_reader(bad.as_bytes()).is_err());

    assert!(matches!(
        TemplateCatalog::from_reader("{".as_bytes()),
        Err(JayverseError::Serde(_))
    ));
}

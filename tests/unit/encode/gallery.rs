use super::*;

#[test]
fn object_path_follows_user_prefix_layout() {
    assert_eq!(
        gallery_object_path("u1", "glitch", 42).unwrap(),
        "u1/glitch_u1_42.png"
    );
    assert!(gallery_object_path("", "meme", 1).is_err());
    assert!(gallery_object_path("a/b", "meme", 1).is_err());
    assert!(gallery_object_path("..", "meme", 1).is_err());
}

#[test]
fn save_uploads_then_inserts() {
    let mut g = InMemoryGallery::default();
    let rec = save_to_gallery(&mut g, "user-7", Tool::Mockup, "Mockup: Mug", b"png", 99).unwrap();
    assert_eq!(rec.tool_source, "Mockup Genie");
    assert_eq!(
        rec.image_url,
        "memory://jayverse-gallery/user-7/mockup_user-7_99.png"
    );
    assert_eq!(g.objects().len(), 1);
    assert_eq!(g.records(), &[rec]);
}

#[test]
fn duplicate_upload_fails_without_inserting() {
    let mut g = InMemoryGallery::default();
    save_to_gallery(&mut g, "u", Tool::Meme, "t", b"a", 1).unwrap();
    let err = save_to_gallery(&mut g, "u", Tool::Meme, "t", b"b", 1).unwrap_err();
    assert!(matches!(err, JayverseError::Gallery(_)));
    assert_eq!(g.records().len(), 1);
    assert_eq!(g.objects()["u/meme_u_1.png"], b"a".to_vec());
}

struct NoUrl;

impl GallerySink for NoUrl {
    fn upload(&mut self, _: &str, _: &[u8], _: &str) -> JayverseResult<String> {
        Ok(String::new())
    }
    fn insert(&mut self, _: &GalleryRecord) -> JayverseResult<()> {
        panic!("insert must not run without a public URL");
    }
}

#[test]
fn missing_public_url_is_a_gallery_error() {
    let err = save_to_gallery(&mut NoUrl, "u", Tool::Glitch, "t", b"x", 1).unwrap_err();
    assert!(matches!(err, JayverseError::Gallery(_)));
}

#[test]
fn titles_match_tool_conventions() {
    assert_eq!(glitch_title("me.png"), "Glitched PFP: me.png");
    assert_eq!(mockup_title("Coffee Mug"), "Mockup: Coffee Mug");
    assert_eq!(
        meme_title("short", "Drake Hotline Bling"),
        "Meme: short - Drake Hotline Bling"
    );
    let long = "a".repeat(31);
    assert_eq!(
        meme_title(&long, "X"),
        format!("Meme: {}... - X", "a".repeat(30))
    );
    let desc = "é".repeat(60);
    assert_eq!(scene_title(&desc), format!("Scene: {}...", "é".repeat(50)));
}

#[test]
fn local_gallery_writes_objects_and_jsonl_rows() {
    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("target")
        .join("unit_local_gallery");
    let _ = std::fs::remove_dir_all(&root);

    let mut g = LocalGallery::new(&root, DEFAULT_BUCKET);
    let rec = save_to_gallery(&mut g, "u9", Tool::Scene, "Scene: x", b"\x89PNG", 5).unwrap();
    assert!(rec.image_url.starts_with("file://"));
    assert!(root.join(DEFAULT_BUCKET).join("u9/scene_u9_5.png").is_file());
    assert_eq!(g.records().unwrap(), vec![rec]);

    assert!(g.upload("u9/scene_u9_5.png", b"again", "image/png").is_err());
    assert!(g.upload("../escape.png", b"x", "image/png").is_err());
}

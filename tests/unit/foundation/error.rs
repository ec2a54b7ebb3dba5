use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        JayverseError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(JayverseError::decode("x").to_string().contains("decode error:"));
    assert!(JayverseError::render("x").to_string().contains("render error:"));
    assert!(JayverseError::export("x").to_string().contains("export error:"));
    assert!(
        JayverseError::gallery("x")
            .to_string()
            .contains("gallery error:")
    );
    assert!(JayverseError::proxy("x").to_string().contains("proxy error:"));
    assert!(
        JayverseError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = JayverseError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn messages_are_passed_through_verbatim() {
    let err = JayverseError::decode("Failed to load image.");
    assert_eq!(err.to_string(), "decode error: Failed to load image.");
}

use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        WeftError::route_resolution("x")
            .to_string()
            .contains("route resolution error:")
    );
    assert!(WeftError::render("x").to_string().contains("render error:"));
    assert!(WeftError::encode("x").to_string().contains("encode error:"));
    assert!(WeftError::decode("x").to_string().contains("decode error:"));
    assert!(WeftError::store("x").to_string().contains("store error:"));
    assert!(
        WeftError::validation("x")
            .to_string()
            .contains("validation error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = WeftError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

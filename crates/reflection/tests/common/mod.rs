use phpscope_reflection::{ReflectionOffset, Reflector};

/// Reflector that can find every class declared in `source`.
#[allow(dead_code)]
pub fn reflector_for(source: &str) -> Reflector {
    Reflector::builder().add_source(source).build()
}

/// Split a source on its `<>` cursor marker.
#[allow(dead_code)]
pub fn offset_from_code(code: &str) -> (String, usize) {
    let offset = code.find("<>").expect("source has no <> marker");
    (code.replacen("<>", "", 1), offset)
}

/// Reflect the `<>` position of `code` against a reflector over the same
/// source.
#[allow(dead_code)]
pub fn reflect_marker(code: &str) -> ReflectionOffset {
    let (source, offset) = offset_from_code(code);
    reflector_for(&source)
        .reflect_offset(source.as_str(), offset)
        .expect("offset reflection failed")
}

//! Content type detection from a paste's leading bytes.

use crate::constants::{DEFAULT_CONTENT_TYPE, SNIFF_LEN};

/// Sniff the content type of a paste.
///
/// Only the first [`SNIFF_LEN`] bytes are inspected. Known binary formats
/// (images, archives, documents) are reported by their MIME type; anything
/// else, including markup, is served as plain UTF-8 text.
pub fn sniff_content_type(head: &[u8]) -> String {
    let head = &head[..head.len().min(SNIFF_LEN)];
    match infer::get(head) {
        Some(kind) if !kind.mime_type().starts_with("text/") => kind.mime_type().to_string(),
        _ => DEFAULT_CONTENT_TYPE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::sniff_content_type;
    use crate::constants::DEFAULT_CONTENT_TYPE;

    #[test]
    fn plain_text_falls_back_to_default() {
        assert_eq!(sniff_content_type(b"fn main() {}\n"), DEFAULT_CONTENT_TYPE);
        assert_eq!(sniff_content_type(b""), DEFAULT_CONTENT_TYPE);
    }

    #[test]
    fn markup_is_not_served_as_html() {
        assert_eq!(
            sniff_content_type(b"<!DOCTYPE html><html><script>alert(1)</script></html>"),
            DEFAULT_CONTENT_TYPE
        );
    }

    #[test]
    fn png_signature_is_detected() {
        let head = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];
        assert_eq!(sniff_content_type(&head), "image/png");
    }
}

/// Fallback reported when the image bytes carry no known signature.
pub const DEFAULT_IMAGE_MIME: &str = "image/png";

/// Identify an image by its magic bytes.
pub fn sniff_image_mime(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0x89, 0x50, 0x4E, 0x47, ..] => Some("image/png"),
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Some("image/webp"),
        _ => None,
    }
}

/// Like [`sniff_image_mime`], falling back to [`DEFAULT_IMAGE_MIME`].
pub fn image_mime_or_default(bytes: &[u8]) -> &'static str {
    sniff_image_mime(bytes).unwrap_or_else(|| {
        tracing::warn!(
            "Unrecognized image signature {:02X?}, reporting {}",
            &bytes[..bytes.len().min(4)],
            DEFAULT_IMAGE_MIME
        );
        DEFAULT_IMAGE_MIME
    })
}

//! Image type sniffing by leading signature bytes.

use image::ImageFormat;

pub const OCTET_STREAM: &str = "application/octet-stream";

/// Formats both providers accept as image input.
pub const ACCEPTED_MEDIA_TYPES: &[&str] = &["image/png", "image/jpeg", "image/gif", "image/webp"];

const SNIFF_LEN: usize = 512;

/// Detect the MIME type from the first 512 bytes, falling back to
/// `application/octet-stream` when no signature matches.
pub fn sniff_media_type(bytes: &[u8]) -> &'static str {
    let head = &bytes[..bytes.len().min(SNIFF_LEN)];
    match image::guess_format(head) {
        Ok(format) => mime_for(format),
        Err(_) => OCTET_STREAM,
    }
}

fn mime_for(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Png => "image/png",
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::Gif => "image/gif",
        ImageFormat::WebP => "image/webp",
        ImageFormat::Bmp => "image/bmp",
        ImageFormat::Ico => "image/x-icon",
        ImageFormat::Tiff => "image/tiff",
        ImageFormat::Avif => "image/avif",
        _ => OCTET_STREAM,
    }
}

pub fn is_accepted(media_type: &str) -> bool {
    ACCEPTED_MEDIA_TYPES.contains(&media_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

    #[test]
    fn test_sniff_png() {
        let mut bytes = PNG_SIGNATURE.to_vec();
        bytes.extend_from_slice(&[0, 0]);
        assert_eq!(sniff_media_type(&bytes), "image/png");
    }

    #[test]
    fn test_sniff_jpeg_and_gif() {
        assert_eq!(sniff_media_type(&[0xFF, 0xD8, 0xFF, 0xE0, 0, 0]), "image/jpeg");
        assert_eq!(sniff_media_type(b"GIF89a\x01\x00"), "image/gif");
    }

    #[test]
    fn test_sniff_webp() {
        assert_eq!(sniff_media_type(b"RIFF\x24\x00\x00\x00WEBPVP8 "), "image/webp");
    }

    #[test]
    fn test_unknown_falls_back_to_octet_stream() {
        assert_eq!(sniff_media_type(b"hello, world"), OCTET_STREAM);
        assert_eq!(sniff_media_type(&[]), OCTET_STREAM);
    }

    #[test]
    fn test_only_leading_bytes_are_inspected() {
        let mut bytes = vec![0u8; 600];
        bytes[520..528].copy_from_slice(PNG_SIGNATURE);
        assert_eq!(sniff_media_type(&bytes), OCTET_STREAM);
    }

    #[test]
    fn test_accepted_types() {
        assert!(is_accepted("image/png"));
        assert!(is_accepted("image/webp"));
        assert!(!is_accepted("image/bmp"));
        assert!(!is_accepted(OCTET_STREAM));
    }
}

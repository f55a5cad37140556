//! Input validation for the compose form and settings.

use crate::protocol::AttachmentKind;

/// Upper bound on a single text message, matching the board's comfort zone
/// for inline display. The server itself accepts arbitrary sizes.
const MAX_MESSAGE_BYTES: usize = 1024 * 1024;

/// Validates a board base URL ("http://host[:port][/path]").
pub fn validate_server_url(url: &str) -> Result<String, String> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err("Server URL cannot be empty".to_string());
    }

    if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
        return Err("Server URL must start with http:// or https://".to_string());
    }

    let rest = trimmed
        .trim_start_matches("http://")
        .trim_start_matches("https://");
    if rest.is_empty() || rest.starts_with('/') {
        return Err("Server URL is missing a hostname".to_string());
    }

    if trimmed.contains(char::is_whitespace) {
        return Err("Server URL cannot contain whitespace".to_string());
    }

    // Normalize: the client appends paths like "/messages" itself.
    Ok(trimmed.trim_end_matches('/').to_string())
}

/// Validates a compose submission: something must actually be sent.
pub fn validate_compose(text: &str, has_attachment: bool) -> Result<(), String> {
    if text.trim().is_empty() && !has_attachment {
        return Err("Nothing to send".to_string());
    }

    if text.len() > MAX_MESSAGE_BYTES {
        return Err("Message too large (max 1 MiB of text)".to_string());
    }

    Ok(())
}

/// Decide which upload field a dropped or picked file belongs to.
///
/// Prefers content sniffing (magic bytes via the `image` crate) and falls
/// back to the filename extension; anything unrecognized goes up as a
/// generic file.
pub fn attachment_kind(filename: &str, bytes: &[u8]) -> AttachmentKind {
    if image::guess_format(bytes).is_ok() {
        return AttachmentKind::Image;
    }

    let ext = filename
        .rsplit('.')
        .next()
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "png" | "jpg" | "jpeg" | "gif" | "bmp" | "webp" | "tiff" => AttachmentKind::Image,
        "mp4" | "webm" | "mkv" | "mov" | "avi" | "m4v" => AttachmentKind::Video,
        _ => AttachmentKind::File,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_server_url() {
        assert_eq!(
            validate_server_url("http://127.0.0.1:5000").unwrap(),
            "http://127.0.0.1:5000"
        );
        assert_eq!(
            validate_server_url("https://paste.example.net/"),
            Ok("https://paste.example.net".to_string())
        );
        // Trailing slashes are stripped so path joins stay predictable
        assert_eq!(
            validate_server_url("http://host:8080///").unwrap(),
            "http://host:8080"
        );

        assert!(validate_server_url("").is_err());
        assert!(validate_server_url("   ").is_err());
        assert!(validate_server_url("ftp://host").is_err());
        assert!(validate_server_url("host:5000").is_err());
        assert!(validate_server_url("http://").is_err());
        assert!(validate_server_url("http://ho st").is_err());
    }

    #[test]
    fn test_validate_compose() {
        assert!(validate_compose("hello", false).is_ok());
        assert!(validate_compose("", true).is_ok());
        assert!(validate_compose("   \n", true).is_ok());

        assert!(validate_compose("", false).is_err());
        assert!(validate_compose("   \n\t", false).is_err());
        assert!(validate_compose(&"x".repeat(MAX_MESSAGE_BYTES + 1), false).is_err());
    }

    #[test]
    fn test_attachment_kind_by_extension() {
        assert_eq!(attachment_kind("clip.MP4", b"xxxx"), AttachmentKind::Video);
        assert_eq!(attachment_kind("photo.jpeg", b"xxxx"), AttachmentKind::Image);
        assert_eq!(attachment_kind("notes.pdf", b"xxxx"), AttachmentKind::File);
        assert_eq!(attachment_kind("README", b"xxxx"), AttachmentKind::File);
    }

    #[test]
    fn test_attachment_kind_sniffs_image_bytes() {
        // A real PNG with a misleading name still routes as an image
        let img = image::RgbaImage::new(1, 1);
        let mut png = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut png, image::ImageFormat::Png)
            .unwrap();
        assert_eq!(
            attachment_kind("mystery.bin", png.get_ref()),
            AttachmentKind::Image
        );
    }
}

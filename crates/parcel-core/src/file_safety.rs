//! Upload validation for delivery evidence images.
//!
//! Three independent checks run on every upload:
//! 1. Size cap
//! 2. Declared MIME type whitelist
//! 3. Magic byte sniffing: the payload must be an image in an allowed format
//!
//! Every failing check is reported; callers decide how many to surface.

use crate::defaults::{ALLOWED_IMAGE_FORMATS, ALLOWED_MIME_TYPES};
use crate::error::EvidenceError;
use crate::models::UploadedFile;

/// Validate an uploaded evidence file against all rules.
///
/// Returns every violation in check order (size, MIME type, image format).
/// An empty vector means the file is acceptable.
pub fn validate_upload(file: &UploadedFile, max_size_bytes: u64) -> Vec<EvidenceError> {
    let mut errors = Vec::new();

    if file.size() > max_size_bytes {
        errors.push(EvidenceError::FileTooLarge {
            actual_size: file.size(),
            max_size: max_size_bytes,
        });
    }

    if !ALLOWED_MIME_TYPES.contains(&file.content_type.as_str()) {
        errors.push(EvidenceError::InvalidFile {
            actual_type: file.content_type.clone(),
        });
    }

    match detect_image_format(&file.data) {
        Some(format) if ALLOWED_IMAGE_FORMATS.contains(&format.as_str()) => {}
        Some(format) => errors.push(EvidenceError::InvalidImageFormat {
            actual_format: format,
        }),
        None => errors.push(EvidenceError::InvalidImage),
    }

    errors
}

/// Detect the image format of a payload from its magic bytes.
///
/// Returns an upper-case format name ("JPEG", "PNG", "BMP", ...) when the
/// payload is a recognised image, or `None` when it is not an image at all.
pub fn detect_image_format(data: &[u8]) -> Option<String> {
    let kind = infer::get(data)?;
    if kind.matcher_type() != infer::MatcherType::Image {
        return None;
    }

    let name = match kind.mime_type() {
        "image/jpeg" => "JPEG",
        "image/png" => "PNG",
        "image/gif" => "GIF",
        "image/webp" => "WEBP",
        "image/bmp" => "BMP",
        "image/tiff" => "TIFF",
        "image/vnd.microsoft.icon" => "ICO",
        "image/vnd.adobe.photoshop" => "PSD",
        "image/jp2" => "JPEG2000",
        "image/heif" => "HEIF",
        "image/avif" => "AVIF",
        _ => return Some(kind.extension().to_uppercase()),
    };
    Some(name.to_string())
}

/// Sanitize a client-supplied filename for recording and storage.
pub fn sanitize_filename(filename: &str) -> String {
    // Remove path components
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);

    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '|' | '?' | '*' | '\0' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let sanitized = sanitized.trim();
    if sanitized.is_empty() {
        return "unnamed_file".to_string();
    }

    // Truncate if too long (preserve extension)
    if sanitized.len() > 255 {
        if let Some(dot_pos) = sanitized.rfind('.') {
            let ext = &sanitized[dot_pos..];
            if ext.len() < 255 {
                let stem = truncate_at_char_boundary(&sanitized[..dot_pos], 255 - ext.len());
                return format!("{}{}", stem, ext);
            }
        }
        return truncate_at_char_boundary(sanitized, 255).to_string();
    }

    sanitized.to_string()
}

fn truncate_at_char_boundary(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

use std::path::Path;

/// Content-Type used when the extension is missing or unknown
pub const FALLBACK_CONTENT_TYPE: &str = "image/jpeg";

/// Detect Content-Type based on file extension
///
/// Only image formats are recognised. Everything else, including files
/// without an extension, is tagged as "image/jpeg".
pub fn detect_content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        _ => FALLBACK_CONTENT_TYPE,
    }
}

/// File extension used for the upload's file name
pub fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/bmp" => "bmp",
        _ => "jpg",
    }
}

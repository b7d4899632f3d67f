//! Image validation for uploads
//!
//! Uploaded files are checked locally before any network call: size cap,
//! extension whitelist, and a decode pass to confirm the bytes really are
//! an image.

use uuid::Uuid;

use crate::error::{StoreError, StoreResult};

/// Maximum file size (5MB)
const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// Supported image formats
const SUPPORTED_FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// An image file selected for upload
#[derive(Debug, Clone)]
pub struct ImageFile {
    /// Original file name, used for the extension and content type
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    /// Lowercased file extension
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
    }

    /// Content type guessed from the file name
    pub fn content_type(&self) -> String {
        mime_guess::from_path(&self.filename)
            .first_or_octet_stream()
            .to_string()
    }
}

/// Validate an image file before upload
pub fn validate_image(file: &ImageFile) -> StoreResult<()> {
    if file.bytes.is_empty() {
        return Err(StoreError::Validation("Empty file provided".to_string()));
    }

    if file.bytes.len() > MAX_FILE_SIZE {
        return Err(StoreError::Validation(format!(
            "File too large. Maximum size is {} bytes ({}MB)",
            MAX_FILE_SIZE,
            MAX_FILE_SIZE / 1024 / 1024
        )));
    }

    let ext = file.extension().ok_or_else(|| {
        StoreError::Validation(format!("Invalid file extension for: {}", file.filename))
    })?;
    if !SUPPORTED_FORMATS.contains(&ext.as_str()) {
        return Err(StoreError::Validation(format!(
            "Unsupported file format '{}'. Supported: {}",
            ext,
            SUPPORTED_FORMATS.join(", ")
        )));
    }

    // Verify it's actually an image by trying to load it
    if let Err(e) = image::load_from_memory(&file.bytes) {
        return Err(StoreError::Validation(format!(
            "Invalid image file ({}): {}",
            ext, e
        )));
    }

    Ok(())
}

/// Generate a unique object name preserving the original extension
pub fn object_name(filename: &str) -> String {
    let ext = std::path::Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .unwrap_or_else(|| "jpg".to_string());
    format!("{}.{}", Uuid::new_v4(), ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(1, 1, image::Rgb([120, 80, 40]));
        let mut buffer = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut buffer, image::ImageFormat::Png)
            .unwrap();
        buffer.into_inner()
    }

    #[test]
    fn accepts_valid_png() {
        let file = ImageFile::new("aceite.png", png_bytes());
        assert!(validate_image(&file).is_ok());
        assert_eq!(file.content_type(), "image/png");
    }

    #[test]
    fn rejects_empty_file() {
        let file = ImageFile::new("empty.png", Vec::new());
        assert!(matches!(
            validate_image(&file),
            Err(StoreError::Validation(_))
        ));
    }

    #[test]
    fn rejects_unsupported_extension() {
        let file = ImageFile::new("listado.pdf", png_bytes());
        assert!(matches!(
            validate_image(&file),
            Err(StoreError::Validation(_))
        ));
    }

    #[test]
    fn rejects_non_image_bytes() {
        let file = ImageFile::new("fake.png", b"not an image".to_vec());
        assert!(matches!(
            validate_image(&file),
            Err(StoreError::Validation(_))
        ));
    }

    #[test]
    fn object_names_keep_extension_and_differ() {
        let a = object_name("logo.webp");
        let b = object_name("logo.webp");
        assert!(a.ends_with(".webp"));
        assert_ne!(a, b);
    }
}

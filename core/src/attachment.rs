//! Image attachments encoded as data URLs.

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::validation::ValidationError;

pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;
pub const SUPPORTED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "image/gif"];

/// An image that passed the type and size checks.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    mime: String,
    bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageAttachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageAttachment")
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ImageAttachment {
    pub fn new(mime: &str, bytes: Vec<u8>) -> Result<Self, ValidationError> {
        let mime = mime.trim().to_ascii_lowercase();
        if !SUPPORTED_IMAGE_TYPES.contains(&mime.as_str()) {
            return Err(ValidationError::UnsupportedImageType(mime));
        }
        if bytes.is_empty() {
            return Err(ValidationError::MissingImage);
        }
        check_size(bytes.len() as u64)?;
        Ok(Self { mime, bytes })
    }

    /// Read an image from disk, guessing its type from the extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ValidationError> {
        let path = path.as_ref();
        let mime = mime_guess::from_path(path)
            .first()
            .map(|m| m.essence_str().to_string())
            .ok_or_else(|| ValidationError::UnsupportedImageType(path.display().to_string()))?;

        let metadata = std::fs::metadata(path).map_err(|e| ValidationError::ImageRead(e.to_string()))?;
        check_size(metadata.len())?;

        let bytes = std::fs::read(path).map_err(|e| ValidationError::ImageRead(e.to_string()))?;
        Self::new(&mime, bytes)
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    /// `data:<mime>;base64,<payload>`, the shape a browser file reader yields.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, self.to_base64())
    }
}

fn check_size(size: u64) -> Result<(), ValidationError> {
    if size > MAX_IMAGE_BYTES {
        return Err(ValidationError::ImageTooLarge {
            size,
            limit: MAX_IMAGE_BYTES,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn encodes_data_url() {
        let image = ImageAttachment::new("image/png", vec![0x89, b'P', b'N', b'G']).unwrap();
        assert_eq!(image.to_data_url(), "data:image/png;base64,iVBORw==");
    }

    #[test]
    fn rejects_unsupported_type() {
        let err = ImageAttachment::new("image/webp", vec![1]).unwrap_err();
        assert_eq!(err, ValidationError::UnsupportedImageType("image/webp".to_string()));
    }

    #[test]
    fn rejects_empty_and_oversized() {
        assert_eq!(ImageAttachment::new("image/gif", Vec::new()), Err(ValidationError::MissingImage));
        let big = vec![0u8; MAX_IMAGE_BYTES as usize + 1];
        assert!(matches!(
            ImageAttachment::new("image/jpeg", big),
            Err(ValidationError::ImageTooLarge { .. })
        ));
    }

    #[test]
    fn from_path_guesses_mime() {
        let mut file = tempfile::Builder::new().suffix(".jpg").tempfile().unwrap();
        file.write_all(&[0xff, 0xd8, 0xff]).unwrap();
        let image = ImageAttachment::from_path(file.path()).unwrap();
        assert_eq!(image.mime(), "image/jpeg");
        assert_eq!(image.len(), 3);
    }

    #[test]
    fn from_path_rejects_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        assert!(matches!(
            ImageAttachment::from_path(file.path()),
            Err(ValidationError::UnsupportedImageType(_))
        ));
    }
}

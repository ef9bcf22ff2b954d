//! Shared provider types
//!
//! Types used across all meditation model providers.

/// A generated scene image, decoded from the provider's response
#[derive(Clone)]
pub struct GeneratedImage {
    /// Raw image bytes
    pub bytes: Vec<u8>,
    /// MIME type reported by the provider (e.g. "image/png")
    pub mime_type: String,
}

impl GeneratedImage {
    /// Create a new image from provider data
    pub fn new(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    /// Whether the provider returned no image data
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// One-line description for the chat transcript, e.g. "image/png, 245 KB"
    pub fn summary(&self) -> String {
        format!("{}, {}", self.mime_type, format_size(self.bytes.len()))
    }
}

// Image payloads run to hundreds of kilobytes, so Debug prints a summary
// instead of the byte vector.
impl std::fmt::Debug for GeneratedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratedImage")
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

fn format_size(bytes: usize) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{} KB", bytes / 1024)
    } else {
        format!("{} B", bytes)
    }
}

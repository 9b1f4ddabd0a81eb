//! # Media Resolution
//!
//! Attachment lookups used to build image records.

use super::product::AttachmentId;

/// Registered image sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSize {
    Full,
    Thumbnail,
}

pub trait MediaLibrary: Send + Sync {
    /// Source URL for a size; `None` when the id is not a valid image
    fn image_src(&self, id: AttachmentId, size: ImageSize) -> Option<String>;

    /// Responsive `srcset` for the full size, empty when unavailable
    fn image_srcset(&self, id: AttachmentId) -> String;

    /// Responsive `sizes` for the full size, empty when unavailable
    fn image_sizes(&self, id: AttachmentId) -> String;

    fn title(&self, id: AttachmentId) -> String;

    fn alt_text(&self, id: AttachmentId) -> String;
}

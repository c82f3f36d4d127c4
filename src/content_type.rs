use std::fmt;
use std::str::FromStr;

use image::ImageFormat;

use crate::error::{AssetError, AssetResult};

/// Image types accepted for upload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContentType {
    Png,
    Jpeg,
    Gif,
}

pub const ALLOWED_CONTENT_TYPES: [ContentType; 3] =
    [ContentType::Png, ContentType::Jpeg, ContentType::Gif];

/// Returns whether `content_type` names one of the supported image types.
pub fn is_allowed(content_type: &str) -> bool {
    ContentType::parse(content_type).is_ok()
}

impl ContentType {
    /// Parses a mime label such as `image/png` or `image/jpeg; charset=binary`.
    pub fn parse(content_type: &str) -> AssetResult<Self> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or(content_type)
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "image/png" => Ok(ContentType::Png),
            "image/jpeg" | "image/jpg" => Ok(ContentType::Jpeg),
            "image/gif" => Ok(ContentType::Gif),
            _ => Err(AssetError::UnsupportedContentType(content_type.to_string())),
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            ContentType::Png => "image/png",
            ContentType::Jpeg => "image/jpeg",
            ContentType::Gif => "image/gif",
        }
    }

    /// File extension including the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            ContentType::Png => ".png",
            ContentType::Jpeg => ".jpg",
            ContentType::Gif => ".gif",
        }
    }

    pub fn image_format(self) -> ImageFormat {
        match self {
            ContentType::Png => ImageFormat::Png,
            ContentType::Jpeg => ImageFormat::Jpeg,
            ContentType::Gif => ImageFormat::Gif,
        }
    }
}

impl FromStr for ContentType {
    type Err = AssetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentType::parse(s)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

use std::io::{BufReader, Read, Seek, Write};

use image::{DynamicImage, GenericImageView, ImageFormat};

use crate::content_type::ContentType;
use crate::error::{AssetError, AssetResult};

/// Decodes `source` as the format named by `content_type`.
pub fn decode<R: Read + Seek + ?Sized>(
    source: &mut R,
    content_type: &str,
) -> AssetResult<DynamicImage> {
    let content_type = ContentType::parse(content_type)?;
    decode_as(source, content_type)
}

/// Encodes `image` into `destination` as the format named by `content_type`.
pub fn encode<W: Write + Seek>(
    destination: &mut W,
    image: &DynamicImage,
    content_type: &str,
) -> AssetResult<()> {
    let content_type = ContentType::parse(content_type)?;
    encode_as(destination, image, content_type)
}

pub fn decode_as<R: Read + Seek + ?Sized>(
    source: &mut R,
    content_type: ContentType,
) -> AssetResult<DynamicImage> {
    let image = image::load(BufReader::new(source), content_type.image_format()).map_err(
        |source| AssetError::Decode {
            content_type: content_type.mime().to_string(),
            source,
        },
    )?;
    let (width, height) = image.dimensions();
    tracing::debug!(%content_type, width, height, "decoded image");
    Ok(image)
}

pub fn encode_as<W: Write + Seek>(
    destination: &mut W,
    image: &DynamicImage,
    content_type: ContentType,
) -> AssetResult<()> {
    let result = match content_type {
        ContentType::Png => image.write_to(destination, ImageFormat::Png),
        // The JPEG encoder has no alpha channel.
        ContentType::Jpeg => {
            DynamicImage::ImageRgb8(image.to_rgb8()).write_to(destination, ImageFormat::Jpeg)
        }
        ContentType::Gif => {
            DynamicImage::ImageRgba8(image.to_rgba8()).write_to(destination, ImageFormat::Gif)
        }
    };
    result.map_err(|source| AssetError::Encode {
        content_type: content_type.mime().to_string(),
        source,
    })
}

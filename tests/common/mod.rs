//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use photoshare_assets::AssetStore;
use tempfile::TempDir;

/// Encodes a gradient of the given size in `format`.
pub fn encoded_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let image = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    let image = match format {
        // GIF frames are built from RGBA pixels.
        ImageFormat::Gif => DynamicImage::ImageRgba8(DynamicImage::ImageRgb8(image).to_rgba8()),
        _ => DynamicImage::ImageRgb8(image),
    };
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, format)
        .unwrap();
    buffer.into_inner()
}

/// A store whose roots live inside a fresh temporary directory and do not exist yet.
pub fn temp_store() -> (TempDir, AssetStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = AssetStore::new(dir.path().join("uploads"), dir.path().join("thumbnails"));
    (dir, store)
}

/// Names of regular files in `dir`, empty if the directory is missing.
pub fn file_names(dir: &Path) -> Vec<String> {
    match std::fs::read_dir(dir) {
        Ok(entries) => {
            let mut names: Vec<String> = entries
                .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
                .collect();
            names.sort();
            names
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(err) => panic!("read_dir {}: {err}", dir.display()),
    }
}

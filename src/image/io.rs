//! I/O helpers for color images, masks and JSON.
//!
//! - `load_rgba_f32`: read a PNG/JPEG/etc. into an owned 4-channel f32 image in `[0, 1]`.
//! - `load_mask`: read an image as 8-bit luma and convert to an opacity mask.
//! - `save_rgb_f32`: write the color channels of an `ImageRgbaF32` to an 8-bit image.
//! - `write_json_file`: pretty-print a serializable value to disk.
use super::{ImageRgbaF32, ImageView, Mask, CHANNELS};
use image::{Rgb, RgbImage};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Load an image from disk as RGBA f32. Channel 3 carries the alpha of the
/// file (1.0 when the format has none) and is otherwise left alone.
pub fn load_rgba_f32(path: &Path) -> Result<ImageRgbaF32, String> {
    let img = image::open(path)
        .map_err(|e| format!("Failed to open {}: {e}", path.display()))?
        .into_rgba32f();
    let width = img.width() as usize;
    let height = img.height() as usize;
    ImageRgbaF32::from_raw(width, height, img.into_raw())
        .ok_or_else(|| format!("Unexpected buffer size decoding {}", path.display()))
}

/// Load a mask from disk. Black pixels stay exactly zero (inactive), any
/// other gray level becomes an active opacity in `(0, 1]`.
pub fn load_mask(path: &Path) -> Result<Mask, String> {
    let img = image::open(path)
        .map_err(|e| format!("Failed to open {}: {e}", path.display()))?
        .into_luma8();
    let width = img.width() as usize;
    let height = img.height() as usize;
    let data = img.into_raw().into_iter().map(|v| v as f32 / 255.0).collect();
    Mask::from_raw(width, height, data)
        .ok_or_else(|| format!("Unexpected buffer size decoding {}", path.display()))
}

/// Save the three color channels of a float image, clamping values in [0, 255].
pub fn save_rgb_f32(image: &ImageRgbaF32, path: &Path) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let mut out = RgbImage::new(image.w as u32, image.h as u32);
    for (y, row) in image.rows().enumerate() {
        for (x, px) in row.chunks_exact(CHANNELS).enumerate() {
            let to_u8 = |v: f32| (v * 255.0).round().clamp(0.0, 255.0) as u8;
            out.put_pixel(x as u32, y as u32, Rgb([to_u8(px[0]), to_u8(px[1]), to_u8(px[2])]));
        }
    }
    out.save(path)
        .map_err(|e| format!("Failed to save {}: {e}", path.display()))
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize JSON for {}: {e}", path.display()))?;
    fs::write(path, json).map_err(|e| format!("Failed to write JSON {}: {e}", path.display()))
}

fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
        }
    }
    Ok(())
}

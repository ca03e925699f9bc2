//! Raster → 1-bit packed bitmap.
//!
//! Pipeline: composite alpha over white, grayscale (ITU-R 601 luma), Lanczos
//! resample to the target size, Floyd–Steinberg dither to black/white, then
//! pack MSB-first, row-major, black = 1. Rows are padded to whole bytes.

use image::imageops::{self, BiLevel, FilterType};
use image::{DynamicImage, GenericImageView, GrayImage, Luma};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BitmapError {
    #[error("read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("decode: {0}")]
    Decode(#[from] image::ImageError),
    #[error("source image has no pixels")]
    Empty,
}

#[inline]
pub fn row_bytes(width: u32) -> usize { (width as usize).div_ceil(8) }

/// Exact byte length of a packed `width × height` bitmap.
#[inline]
pub fn bitmap_len(width: u32, height: u32) -> usize { row_bytes(width) * height as usize }

pub fn blank(width: u32, height: u32) -> Vec<u8> { vec![0u8; bitmap_len(width, height)] }

fn flatten_to_gray(img: &DynamicImage) -> GrayImage {
    let rgba = img.to_rgba8();
    GrayImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let a = a as u32;
        let over_white = |c: u8| (c as u32 * a + 255 * (255 - a)) / 255;
        let luma = (over_white(r) * 299 + over_white(g) * 587 + over_white(b) * 114) / 1000;
        Luma([luma.min(255) as u8])
    })
}

/// Pack an already binarized image (0 = black).
pub fn pack_bilevel(img: &GrayImage) -> Vec<u8> {
    let (w, h) = img.dimensions();
    let stride = row_bytes(w);
    let mut out = vec![0u8; stride * h as usize];
    for (x, y, px) in img.enumerate_pixels() {
        if px.0[0] < 128 {
            out[y as usize * stride + (x / 8) as usize] |= 0x80 >> (x % 8);
        }
    }
    out
}

pub fn encode_image(img: &DynamicImage, width: u32, height: u32) -> Result<Vec<u8>, BitmapError> {
    let (sw, sh) = img.dimensions();
    if sw == 0 || sh == 0 {
        return Err(BitmapError::Empty);
    }
    let gray = flatten_to_gray(img);
    let mut small = imageops::resize(&gray, width, height, FilterType::Lanczos3);
    imageops::dither(&mut small, &BiLevel);
    Ok(pack_bilevel(&small))
}

pub fn encode_bytes(bytes: &[u8], width: u32, height: u32) -> Result<Vec<u8>, BitmapError> {
    let img = image::load_from_memory(bytes)?;
    encode_image(&img, width, height)
}

pub fn encode_file(path: &Path, width: u32, height: u32) -> Result<Vec<u8>, BitmapError> {
    let bytes = std::fs::read(path).map_err(|source| BitmapError::Read { path: path.to_path_buf(), source })?;
    encode_bytes(&bytes, width, height)
}

/// Where a sprite's pixels come from.
#[derive(Debug, Clone)]
pub enum SpriteSource {
    File(PathBuf),
    Image(DynamicImage),
}

impl SpriteSource {
    pub fn describe(&self) -> String {
        match self {
            SpriteSource::File(p) => p.display().to_string(),
            SpriteSource::Image(img) => format!("<in-memory {}x{}>", img.width(), img.height()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sprite {
    pub bytes: Vec<u8>,
    pub failed: bool,
}

/// Never fails: an undecodable source becomes an all-zero bitmap of the exact
/// expected length and is flagged so the caller can count it.
pub fn render_sprite(source: &SpriteSource, width: u32, height: u32) -> Sprite {
    let res = match source {
        SpriteSource::File(p) => encode_file(p, width, height),
        SpriteSource::Image(img) => encode_image(img, width, height),
    };
    match res {
        Ok(bytes) => {
            debug_assert_eq!(bytes.len(), bitmap_len(width, height));
            Sprite { bytes, failed: false }
        }
        Err(e) => {
            tracing::warn!(source = %source.describe(), error = %e, "sprite fallback to blank bitmap");
            Sprite { bytes: blank(width, height), failed: true }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn png_bytes(img: RgbaImage) -> Vec<u8> {
        let mut buf = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn lengths_round_rows_up() {
        assert_eq!(bitmap_len(64, 64), 512);
        assert_eq!(bitmap_len(10, 3), 6);
        assert_eq!(bitmap_len(1, 1), 1);
    }

    #[test]
    fn black_and_white_fill() {
        let black = png_bytes(RgbaImage::from_pixel(16, 16, Rgba([0, 0, 0, 255])));
        assert_eq!(encode_bytes(&black, 8, 2).unwrap(), vec![0xFF, 0xFF]);
        let white = png_bytes(RgbaImage::from_pixel(16, 16, Rgba([255, 255, 255, 255])));
        assert_eq!(encode_bytes(&white, 8, 2).unwrap(), vec![0x00, 0x00]);
    }

    #[test]
    fn transparent_is_white() {
        let clear = png_bytes(RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 0])));
        assert_eq!(encode_bytes(&clear, 8, 1).unwrap(), vec![0x00]);
    }

    #[test]
    fn padding_bits_stay_zero() {
        let black = png_bytes(RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255])));
        let out = encode_bytes(&black, 10, 2).unwrap();
        assert_eq!(out, vec![0xFF, 0xC0, 0xFF, 0xC0]);
    }

    #[test]
    fn msb_first_packing() {
        let mut img = GrayImage::from_pixel(8, 1, Luma([255]));
        img.put_pixel(0, 0, Luma([0]));
        img.put_pixel(7, 0, Luma([0]));
        assert_eq!(pack_bilevel(&img), vec![0x81]);
    }

    #[test]
    fn mid_gray_dithers_to_roughly_half() {
        let gray = png_bytes(RgbaImage::from_pixel(32, 32, Rgba([128, 128, 128, 255])));
        let out = encode_bytes(&gray, 32, 32).unwrap();
        let black: u32 = out.iter().map(|b| b.count_ones()).sum();
        let total = 32 * 32;
        assert!(black > total / 4 && black < total * 3 / 4, "black={black}");
    }

    #[test]
    fn garbage_falls_back_to_blank() {
        let s = render_sprite(&SpriteSource::File(PathBuf::from("/definitely/not/here.png")), 64, 64);
        assert!(s.failed);
        assert_eq!(s.bytes, vec![0u8; 512]);
        assert!(encode_bytes(b"not an image", 8, 8).is_err());
    }
}

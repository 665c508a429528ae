//! Owned four-channel f32 image in row-major layout (stride == 4 * width).
//!
//! Three color channels plus one alignment slot per pixel, the layout the
//! healing core consumes directly through [`ImageRgbaF32::as_slice`].
use super::traits::{ImageView, ImageViewMut};

/// Values stored per pixel: three colors and one unused alignment slot.
pub const CHANNELS: usize = 4;

#[derive(Clone, Debug, PartialEq)]
pub struct ImageRgbaF32 {
    /// Image width in pixels
    pub w: usize,
    /// Image height in pixels
    pub h: usize,
    /// Backing storage, `CHANNELS` values per pixel
    pub data: Vec<f32>,
}

impl ImageRgbaF32 {
    /// Construct a zero-initialized image of size `w × h`.
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            data: vec![0.0; w * h * CHANNELS],
        }
    }

    /// Wrap an existing interleaved buffer. Returns `None` when the length
    /// does not match `w * h * CHANNELS`.
    pub fn from_raw(w: usize, h: usize, data: Vec<f32>) -> Option<Self> {
        (data.len() == w * h * CHANNELS).then_some(Self { w, h, data })
    }

    /// Build an image by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(w: usize, h: usize, mut f: impl FnMut(usize, usize) -> [f32; CHANNELS]) -> Self {
        let mut img = Self::new(w, h);
        for y in 0..h {
            for x in 0..w {
                img.set(x, y, f(x, y));
            }
        }
        img
    }

    #[inline]
    /// Linear index of the first channel of pixel (x, y).
    pub fn idx(&self, x: usize, y: usize) -> usize {
        (y * self.w + x) * CHANNELS
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> [f32; CHANNELS] {
        let i = self.idx(x, y);
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, px: [f32; CHANNELS]) {
        let i = self.idx(x, y);
        self.data[i..i + CHANNELS].copy_from_slice(&px);
    }

    /// Resample the image translated by `(dx, dy)`: output pixel (x, y) takes
    /// the value at (x + dx, y + dy), clamped to the image extents.
    ///
    /// Used to pick the source patch of a healing stroke from a different
    /// part of the same picture.
    pub fn shifted(&self, dx: isize, dy: isize) -> Self {
        if self.w == 0 || self.h == 0 {
            return self.clone();
        }
        let max_x = self.w as isize - 1;
        let max_y = self.h as isize - 1;
        Self::from_fn(self.w, self.h, |x, y| {
            let sx = (x as isize + dx).clamp(0, max_x) as usize;
            let sy = (y as isize + dy).clamp(0, max_y) as usize;
            self.get(sx, sy)
        })
    }
}

impl ImageView for ImageRgbaF32 {
    type Pixel = f32;

    #[inline]
    fn width(&self) -> usize {
        self.w
    }
    #[inline]
    fn height(&self) -> usize {
        self.h
    }
    #[inline]
    fn channels(&self) -> usize {
        CHANNELS
    }
    #[inline]
    fn stride(&self) -> usize {
        self.w * CHANNELS
    }
    #[inline]
    fn row(&self, y: usize) -> &[f32] {
        let stride = self.stride();
        let start = y * stride;
        &self.data[start..start + stride]
    }
    #[inline]
    fn as_slice(&self) -> Option<&[f32]> {
        Some(&self.data)
    }
}

impl ImageViewMut for ImageRgbaF32 {
    #[inline]
    fn row_mut(&mut self, y: usize) -> &mut [f32] {
        let stride = self.stride();
        let start = y * stride;
        &mut self.data[start..start + stride]
    }

    #[inline]
    fn as_mut_slice(&mut self) -> Option<&mut [f32]> {
        Some(&mut self.data)
    }
}

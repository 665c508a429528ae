//! Single-channel opacity mask.
//!
//! A cell is active iff its value is non-zero. There is no tolerance: a
//! value of `1e-30` is as active as `1.0`, and only an exact zero (either
//! sign) excludes the cell.
use super::traits::ImageView;

#[derive(Clone, Debug, PartialEq)]
pub struct Mask {
    /// Mask width in pixels
    pub w: usize,
    /// Mask height in pixels
    pub h: usize,
    /// One opacity value per pixel, row-major
    pub data: Vec<f32>,
}

impl Mask {
    /// All-inactive mask of size `w × h`.
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            data: vec![0.0; w * h],
        }
    }

    pub fn from_raw(w: usize, h: usize, data: Vec<f32>) -> Option<Self> {
        (data.len() == w * h).then_some(Self { w, h, data })
    }

    /// Build a mask from a per-pixel predicate; active cells get opacity 1.
    pub fn from_fn(w: usize, h: usize, mut f: impl FnMut(usize, usize) -> bool) -> Self {
        let mut mask = Self::new(w, h);
        for y in 0..h {
            for x in 0..w {
                if f(x, y) {
                    mask.data[y * w + x] = 1.0;
                }
            }
        }
        mask
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.w + x]
    }

    #[inline]
    pub fn is_active(&self, x: usize, y: usize) -> bool {
        is_active(self.get(x, y))
    }

    /// Number of active cells.
    pub fn count_active(&self) -> usize {
        self.data.iter().filter(|&&v| is_active(v)).count()
    }
}

/// Exact non-zero test shared by the mask and the run encoder.
#[inline]
pub fn is_active(value: f32) -> bool {
    value != 0.0
}

impl ImageView for Mask {
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
        1
    }
    #[inline]
    fn stride(&self) -> usize {
        self.w
    }
    #[inline]
    fn row(&self, y: usize) -> &[f32] {
        let start = y * self.w;
        &self.data[start..start + self.w]
    }
    #[inline]
    fn as_slice(&self) -> Option<&[f32]> {
        Some(&self.data)
    }
}

//! Red/black checkerboard storage of a 4-channel difference field.
//!
//! Pixel (x, y) of the raster is *red* when `x + y` is odd and *black*
//! otherwise. Each color lives in its own contiguous array laid out as
//! `height + 2` rows of `ceil(width / 2)` cells, four floats per cell. Row 0
//! and row `height + 1` are zero padding so vertical neighbor reads never
//! leave the array.
//!
//! Rearranged:
//!
//! ```text
//!   r00 r01 r02 ...          b00 b01 b02 ...
//!   r10 r11 r12              b10 b11 b12
//! ```
//!
//! Raster order, from which neighbors are taken:
//!
//! ```text
//!   b00 r00 b01 r01 b02 r02 ...
//!   r10 b10 r11 b11 r12 b12
//! ```
//!
//! Cell `col` of a row always holds raster column `2 * col` for the color the
//! row starts with and `2 * col + 1` for the other one. With an odd width the
//! trailing raster pixel belongs to the starting color; the other color gets
//! a zero cell at the same position.
use super::alloc::{AllocSite, ScratchAllocator, SystemAllocator};
use super::error::HealError;
use super::options::ParallelOptions;
use crate::image::CHANNELS;

/// Checkerboard color class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    Black,
}

impl Color {
    /// Color of raster pixel (`x`, `y`).
    #[inline]
    pub fn of(x: usize, y: usize) -> Self {
        if (x + y) & 1 == 1 {
            Color::Red
        } else {
            Color::Black
        }
    }

    /// Color of the leftmost pixel of raster row `y`.
    #[inline]
    pub fn first_in_row(y: usize) -> Self {
        Color::of(0, y)
    }

    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            Color::Red => Color::Black,
            Color::Black => Color::Red,
        }
    }
}

/// Number of cells per checkerboard row; rounds up for odd widths.
#[inline]
pub fn sub_width(width: usize) -> usize {
    width.div_ceil(2)
}

/// Two padded color arrays holding one difference field.
#[derive(Clone, Debug)]
pub struct CheckerboardBuffer {
    width: usize,
    height: usize,
    sub_width: usize,
    red: Vec<f32>,
    black: Vec<f32>,
}

impl CheckerboardBuffer {
    /// Allocate zero-filled red and black arrays for a `width × height` field.
    pub fn allocate<A: ScratchAllocator>(
        width: usize,
        height: usize,
        alloc: &A,
    ) -> Result<Self, HealError> {
        let sub_width = sub_width(width);
        let len = sub_width * CHANNELS * (height + 2);
        let red = alloc.try_filled(AllocSite::RedBuffer, len, 0.0f32)?;
        let black = alloc.try_filled(AllocSite::BlackBuffer, len, 0.0f32)?;
        Ok(Self {
            width,
            height,
            sub_width,
            red,
            black,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Cells per row of either color array.
    pub fn sub_width(&self) -> usize {
        self.sub_width
    }

    /// Floats per row of either color array.
    pub fn row_stride(&self) -> usize {
        self.sub_width * CHANNELS
    }

    pub fn red(&self) -> &[f32] {
        &self.red
    }

    pub fn black(&self) -> &[f32] {
        &self.black
    }

    pub fn buffer(&self, color: Color) -> &[f32] {
        match color {
            Color::Red => &self.red,
            Color::Black => &self.black,
        }
    }

    /// Borrow `color` mutably together with the opposite color read-only.
    pub(crate) fn split_mut(&mut self, color: Color) -> (&mut [f32], &[f32]) {
        match color {
            Color::Red => (&mut self.red, &self.black),
            Color::Black => (&mut self.black, &self.red),
        }
    }

    /// Stored value of raster pixel (`x`, `y`).
    pub fn pixel(&self, x: usize, y: usize) -> [f32; CHANNELS] {
        let i = (y + 1) * self.row_stride() + (x / 2) * CHANNELS;
        let buf = self.buffer(Color::of(x, y));
        [buf[i], buf[i + 1], buf[i + 2], buf[i + 3]]
    }

    /// Fill both arrays with `top - bottom`, routing each pixel to its color.
    ///
    /// `top` and `bottom` are interleaved 4-channel rasters of the buffer's
    /// dimensions. Padding rows are cleared.
    pub fn split(&mut self, top: &[f32], bottom: &[f32], parallel: &ParallelOptions) {
        let stride = self.row_stride();
        if stride == 0 {
            return;
        }
        let width = self.width;
        let height = self.height;
        let src_stride = width * CHANNELS;
        let kernel = |(r, (red_row, black_row)): (usize, (&mut [f32], &mut [f32]))| {
            if r == 0 || r > height {
                red_row.fill(0.0);
                black_row.fill(0.0);
                return;
            }
            let y = r - 1;
            let src = y * src_stride..(y + 1) * src_stride;
            let (first, second) = match Color::first_in_row(y) {
                Color::Black => (black_row, red_row),
                Color::Red => (red_row, black_row),
            };
            split_row(&top[src.clone()], &bottom[src], first, second, width);
        };

        if parallel.should_parallelize(height) {
            #[cfg(feature = "parallel")]
            {
                use rayon::prelude::*;
                self.red
                    .par_chunks_mut(stride)
                    .zip(self.black.par_chunks_mut(stride))
                    .enumerate()
                    .for_each(&kernel);
                return;
            }
        }

        self.red
            .chunks_mut(stride)
            .zip(self.black.chunks_mut(stride))
            .enumerate()
            .for_each(&kernel);
    }

    /// Write `stored + base` into `result` in raster order.
    pub fn merge(&self, base: &[f32], result: &mut [f32], parallel: &ParallelOptions) {
        let stride = self.row_stride();
        let src_stride = self.width * CHANNELS;
        if stride == 0 || self.height == 0 {
            return;
        }
        let width = self.width;
        let kernel = |(y, out_row): (usize, &mut [f32])| {
            let cells = (y + 1) * stride..(y + 2) * stride;
            let (first, second) = match Color::first_in_row(y) {
                Color::Black => (&self.black[cells.clone()], &self.red[cells]),
                Color::Red => (&self.red[cells.clone()], &self.black[cells]),
            };
            let base_row = &base[y * src_stride..(y + 1) * src_stride];
            merge_row(first, second, base_row, out_row, width);
        };

        if parallel.should_parallelize(self.height) {
            #[cfg(feature = "parallel")]
            {
                use rayon::prelude::*;
                result
                    .par_chunks_mut(src_stride)
                    .enumerate()
                    .for_each(&kernel);
                return;
            }
        }

        result.chunks_mut(src_stride).enumerate().for_each(&kernel);
    }
}

/// Split one raster row pairwise: even raster columns go to `first`, odd ones
/// to `second`.
fn split_row(top: &[f32], bottom: &[f32], first: &mut [f32], second: &mut [f32], width: usize) {
    let pairs = top
        .chunks_exact(2 * CHANNELS)
        .zip(bottom.chunks_exact(2 * CHANNELS));
    let cells = first
        .chunks_exact_mut(CHANNELS)
        .zip(second.chunks_exact_mut(CHANNELS));
    for ((a, b), (t, s)) in cells.zip(pairs) {
        for c in 0..CHANNELS {
            a[c] = t[c] - s[c];
            b[c] = t[CHANNELS + c] - s[CHANNELS + c];
        }
    }
    if width & 1 == 1 {
        let cell = (width - 1) / 2 * CHANNELS;
        let px = (width - 1) * CHANNELS;
        for c in 0..CHANNELS {
            first[cell + c] = top[px + c] - bottom[px + c];
            second[cell + c] = 0.0;
        }
    }
}

fn merge_row(first: &[f32], second: &[f32], base: &[f32], out: &mut [f32], width: usize) {
    let cells = first.chunks_exact(CHANNELS).zip(second.chunks_exact(CHANNELS));
    let pairs = base
        .chunks_exact(2 * CHANNELS)
        .zip(out.chunks_exact_mut(2 * CHANNELS));
    for ((a, b), (s, o)) in cells.zip(pairs) {
        for c in 0..CHANNELS {
            o[c] = a[c] + s[c];
            o[CHANNELS + c] = b[c] + s[CHANNELS + c];
        }
    }
    if width & 1 == 1 {
        let cell = (width - 1) / 2 * CHANNELS;
        let px = (width - 1) * CHANNELS;
        for c in 0..CHANNELS {
            out[px + c] = first[cell + c] + base[px + c];
        }
    }
}

/// Allocate a checkerboard buffer and fill it with `top - bottom`.
pub fn split(
    top: &[f32],
    bottom: &[f32],
    width: usize,
    height: usize,
    parallel: &ParallelOptions,
) -> Result<CheckerboardBuffer, HealError> {
    let mut buffer = CheckerboardBuffer::allocate(width, height, &SystemAllocator)?;
    buffer.split(top, bottom, parallel);
    Ok(buffer)
}

/// Recompose `buffer + base` into a new raster.
pub fn merge(buffer: &CheckerboardBuffer, base: &[f32], parallel: &ParallelOptions) -> Vec<f32> {
    let mut result = vec![0.0; buffer.width() * buffer.height() * CHANNELS];
    buffer.merge(base, &mut result, parallel);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raster(width: usize, height: usize, f: impl Fn(usize, usize, usize) -> f32) -> Vec<f32> {
        let mut out = vec![0.0; width * height * CHANNELS];
        for y in 0..height {
            for x in 0..width {
                for c in 0..CHANNELS {
                    out[(y * width + x) * CHANNELS + c] = f(x, y, c);
                }
            }
        }
        out
    }

    #[test]
    fn odd_width_trailing_pixel_has_zero_partner() {
        let width = 5;
        let top = raster(width, 1, |x, _, c| (x * 10 + c) as f32);
        let bottom = vec![0.0; top.len()];
        let buf = split(&top, &bottom, width, 1, &ParallelOptions::disabled()).unwrap();
        let stride = buf.row_stride();
        assert_eq!(stride, 3 * CHANNELS);
        let black_row = &buf.black()[stride..2 * stride];
        let red_row = &buf.red()[stride..2 * stride];
        // Row 0 starts black: columns 0, 2, 4 are black; 1, 3 are red.
        assert_eq!(&black_row[..4], &[0.0, 1.0, 2.0, 3.0]);
        assert_eq!(&black_row[4..8], &[20.0, 21.0, 22.0, 23.0]);
        assert_eq!(&black_row[8..12], &[40.0, 41.0, 42.0, 43.0]);
        assert_eq!(&red_row[..4], &[10.0, 11.0, 12.0, 13.0]);
        assert_eq!(&red_row[4..8], &[30.0, 31.0, 32.0, 33.0]);
        assert_eq!(&red_row[8..12], &[0.0; 4]);
    }

    #[test]
    fn odd_rows_start_with_red() {
        let (width, height) = (3, 2);
        let top = raster(width, height, |x, y, _| (y * width + x) as f32 + 1.0);
        let bottom = vec![0.0; top.len()];
        let buf = split(&top, &bottom, width, height, &ParallelOptions::disabled()).unwrap();
        for y in 0..height {
            for x in 0..width {
                assert_eq!(buf.pixel(x, y)[0], (y * width + x) as f32 + 1.0);
            }
        }
        let stride = buf.row_stride();
        assert_eq!(buf.red()[2 * stride], 4.0);
        assert_eq!(buf.black()[2 * stride], 5.0);
        assert_eq!(buf.red()[2 * stride + CHANNELS], 6.0);
        assert_eq!(buf.black()[2 * stride + CHANNELS], 0.0);
    }

    #[test]
    fn padding_rows_are_zero_after_split() {
        let (width, height) = (4, 3);
        let top = raster(width, height, |_, _, _| 1.0);
        let bottom = raster(width, height, |_, _, _| -1.0);
        let mut buf = CheckerboardBuffer::allocate(width, height, &SystemAllocator).unwrap();
        buf.red.fill(7.0);
        buf.black.fill(7.0);
        buf.split(&top, &bottom, &ParallelOptions::disabled());
        let stride = buf.row_stride();
        for color in [Color::Red, Color::Black] {
            let data = buf.buffer(color);
            assert!(data[..stride].iter().all(|&v| v == 0.0));
            assert!(data[(height + 1) * stride..].iter().all(|&v| v == 0.0));
            assert!(data[stride..(height + 1) * stride].iter().all(|&v| v == 2.0));
        }
    }

    #[test]
    fn split_then_merge_restores_top() {
        let (width, height) = (7, 4);
        let top = raster(width, height, |x, y, c| ((x + 3 * y + c) % 8) as f32 * 0.125);
        let bottom = raster(width, height, |x, y, c| ((5 * x + y + 2 * c) % 4) as f32 * 0.25);
        let opts = ParallelOptions::disabled();
        let buf = split(&top, &bottom, width, height, &opts).unwrap();
        assert_eq!(merge(&buf, &bottom, &opts), top);
    }

    #[test]
    fn color_classes_partition_the_raster() {
        let (width, height) = (5, 3);
        let red = (0..height)
            .flat_map(|y| (0..width).map(move |x| Color::of(x, y)))
            .filter(|&c| c == Color::Red)
            .count();
        let black = width * height - red;
        assert_eq!(red, 7);
        assert_eq!(black, 8);
        assert_eq!(Color::first_in_row(1), Color::Red);
        assert_eq!(Color::Red.opposite(), Color::Black);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_split_matches_sequential() {
        let (width, height) = (33, 40);
        let top = raster(width, height, |x, y, c| (x * y + c) as f32 * 0.01);
        let bottom = raster(width, height, |x, y, _| (x + y) as f32 * 0.02);
        let seq = split(&top, &bottom, width, height, &ParallelOptions::disabled()).unwrap();
        let par = split(&top, &bottom, width, height, &ParallelOptions::new(true, 1)).unwrap();
        assert_eq!(seq.red(), par.red());
        assert_eq!(seq.black(), par.black());
        assert_eq!(
            merge(&seq, &bottom, &ParallelOptions::disabled()),
            merge(&par, &bottom, &ParallelOptions::new(true, 1))
        );
    }
}

/// Interleaved RGBA f32 raster built from a per-pixel color function.
pub fn rgba_from_fn(width: usize, height: usize, f: impl Fn(usize, usize) -> [f32; 4]) -> Vec<f32> {
    assert!(width > 0 && height > 0, "image dimensions must be positive");
    let mut img = Vec::with_capacity(width * height * 4);
    for y in 0..height {
        for x in 0..width {
            img.extend_from_slice(&f(x, y));
        }
    }
    img
}

/// Smooth lighting gradient, linear in both axes (and therefore harmonic).
pub fn lighting(x: usize, y: usize) -> [f32; 4] {
    let (xf, yf) = (x as f32, y as f32);
    [
        0.2 + 0.010 * xf,
        0.6 - 0.005 * yf,
        0.3 + 0.004 * xf + 0.003 * yf,
        1.0,
    ]
}

/// Fine periodic texture in roughly [-0.1, 0.1].
pub fn texture(x: usize, y: usize) -> f32 {
    let v = ((x * 7 + y * 13) % 9) as f32 / 8.0;
    (v - 0.5) * 0.2
}

/// Pseudo-random values in [0, 1), deterministic per seed.
pub fn noise(len: usize, seed: u64) -> Vec<f32> {
    let mut state = seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
    (0..len)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (state >> 40) as f32 / (1u64 << 24) as f32
        })
        .collect()
}

/// Disc mask of opacity 1 centred at (`cx`, `cy`).
pub fn disc_mask(width: usize, height: usize, cx: f32, cy: f32, radius: f32) -> Vec<f32> {
    let mut mask = vec![0.0f32; width * height];
    for y in 0..height {
        for x in 0..width {
            let (dx, dy) = (x as f32 - cx, y as f32 - cy);
            if dx * dx + dy * dy <= radius * radius {
                mask[y * width + x] = 1.0;
            }
        }
    }
    mask
}

use seamless_heal::prelude::*;

fn main() {
    env_logger::init();
    // Demo: transplant a striped patch onto a smooth gradient through a disc mask
    let w = 320usize;
    let h = 240usize;
    let destination_px = |x: usize, y: usize| {
        let v = 0.2 + 0.6 * x as f32 / w as f32;
        [v, v * 0.8, 0.3 + 0.002 * y as f32, 1.0]
    };
    let source = ImageRgbaF32::from_fn(w, h, |x, _| {
        let stripe = if (x / 4) % 2 == 0 { 0.1 } else { 0.0 };
        [0.5 + stripe, 0.5 + stripe, 0.5 + stripe, 1.0]
    });
    let mut destination = ImageRgbaF32::from_fn(w, h, destination_px);
    let (cx, cy, r) = (w as f32 / 2.0, h as f32 / 2.0, 60.0f32);
    let mask = Mask::from_fn(w, h, |x, y| {
        let (dx, dy) = (x as f32 - cx, y as f32 - cy);
        dx * dx + dy * dy <= r * r
    });

    let healer = Healer::new(HealOptions::default());
    match healer.heal(&source, &mut destination, &mask) {
        Ok(report) => println!(
            "active={} iterations={} outcome={:?} latency_ms={:.3}",
            report.solve.active_cells,
            report.solve.iterations,
            report.solve.outcome,
            report.timings.total_ms
        ),
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    }
}

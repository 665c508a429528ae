use seamless_heal::config::heal::load_config;
use seamless_heal::image::io::{load_mask, load_rgba_f32, save_rgb_f32, write_json_file};
use seamless_heal::{Healer, SolveOutcome};
use std::env;
use std::path::Path;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = load_config(Path::new(&config_path))?;

    let source = load_rgba_f32(&config.source)?;
    let mut destination = load_rgba_f32(&config.destination)?;
    let mask = load_mask(&config.mask)?;
    let [dx, dy] = config.source_offset;
    let source = if dx != 0 || dy != 0 {
        source.shifted(dx, dy)
    } else {
        source
    };

    let healer = Healer::new(config.heal);
    let report = healer
        .heal(&source, &mut destination, &mask)
        .map_err(|e| format!("Healing failed: {e}"))?;

    save_rgb_f32(&destination, &config.output.image)?;
    println!(
        "Healed {} active pixels of {}x{} in {:.3} ms",
        report.solve.active_cells, report.width, report.height, report.timings.total_ms
    );
    match report.solve.outcome {
        SolveOutcome::Converged => println!("Converged after {} iterations", report.solve.iterations),
        SolveOutcome::MaxIterationsReached => println!(
            "Stopped at the iteration cap ({}), residual {:.3e}",
            report.solve.iterations, report.solve.residual
        ),
    }
    println!("Saved result to {}", config.output.image.display());

    if let Some(path) = &config.output.report_json {
        write_json_file(path, &report)?;
        println!("Saved report to {}", path.display());
    }
    Ok(())
}

fn usage() -> String {
    "Usage: heal_demo <config.json>".to_string()
}

use crate::JobReport;
use crate::config::PlotConfig;
use std::time::Duration;

pub fn show_greeting() {
    println!("=== Raster Contour Plotter ===");
}

pub fn config_echo(config: &PlotConfig) {
    println!("\nConfiguration:");
    println!("  Files: {}", config.files.len());
    for (i, file) in config.files.iter().enumerate() {
        println!("    {}: {}", i + 1, file.display());
    }
    println!(
        "  Scale: {}",
        if config.logscale { "logarithmic" } else { "linear" }
    );
    match (config.min, config.max) {
        (None, None) => {}
        (min, max) => println!(
            "  Bounds: {} .. {}",
            min.map_or("auto".to_string(), |v| v.to_string()),
            max.map_or("auto".to_string(), |v| v.to_string())
        ),
    }
    if let Some(diff) = &config.diff {
        println!("  Differences relative to: {}", diff.display());
    }
    if config.abs {
        println!("  Absolute values: yes");
    }
    if config.save {
        println!("  Output directory: {}", config.output_dir.display());
    }
    if config.wants_animation() {
        println!("  GIF: {} (delay {})", config.gif_tool, config.delay);
    }
    println!("  Interactive: {}", if config.offline { "no" } else { "yes" });
}

pub fn show_farewell_with_timing(elapsed: Duration, report: &JobReport) {
    println!("\n=== Plotted {} file(s) in {:.2?} ===", report.plotted, elapsed);
    if !report.images.is_empty() {
        println!("Images saved: {}", report.images.len());
    }
    if let Some(gif) = &report.animation {
        println!("Animation: {}", gif.display());
    }
}

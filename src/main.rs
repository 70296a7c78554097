use anyhow::Context;
use clap::Parser;
use log::LevelFilter;
use rasterplot::cli::{Cli, write_completions};
use rasterplot::log::{config_echo, show_farewell_with_timing, show_greeting};
use rasterplot::run_plot_job;
use std::time::Instant;

fn main() {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        write_completions(shell, &mut std::io::stdout());
        return;
    }

    init_logging(&cli);

    if let Err(e) = run(&cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(cli: &Cli) {
    let level = if cli.quiet {
        LevelFilter::Error
    } else if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).format_timestamp(None);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let start_time = Instant::now();

    let config = cli.to_config().context("Failed to load configuration")?;

    if !cli.quiet {
        show_greeting();
        config_echo(&config);
    }

    let report = run_plot_job(&config, !cli.quiet && config.offline)
        .context("Plotting failed")?;

    if !cli.quiet {
        show_farewell_with_timing(start_time.elapsed(), &report);
    }
    Ok(())
}

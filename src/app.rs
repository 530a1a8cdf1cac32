//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - runs the ingest -> prepare -> fit -> forecast pipeline
//! - prints reports/plots
//! - writes exports
//! - generates sample data

use clap::Parser;

use crate::cli::{Command, ForecastArgs, SampleArgs};
use crate::domain::ForecastConfig;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `salesfc` binary.
pub fn run() -> Result<(), AppError> {
    // We want `salesfc` and `salesfc --data x.csv` to behave like
    // `salesfc tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing. This preserves a clean clap structure while
    // retaining the requested UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Forecast(args) => {
            init_logging();
            handle_forecast(args, OutputMode::Full)
        }
        Command::Table(args) => {
            init_logging();
            handle_forecast(args, OutputMode::TableOnly)
        }
        Command::Sample(args) => {
            init_logging();
            handle_sample(args)
        }
        // No stderr logging in TUI mode: it would bleed into the alternate
        // screen.
        Command::Tui(args) => crate::tui::run(args),
    }
}

fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Full,
    TableOnly,
}

fn handle_forecast(args: ForecastArgs, mode: OutputMode) -> Result<(), AppError> {
    let config = forecast_config_from_args(&args);
    let out = pipeline::run_forecast(&config)?;

    // Print terminal output.
    match mode {
        OutputMode::Full => {
            println!(
                "{}",
                crate::report::format_run_summary(&out.ingest, &out.stats, &out.run, &config)
            );
            println!(
                "{}",
                crate::report::format_forecast_table(&out.run.forecast, config.table_rows)
            );
        }
        OutputMode::TableOnly => {
            println!(
                "{}",
                crate::report::format_forecast_table(&out.run.forecast, 0)
            );
        }
    }

    if mode == OutputMode::Full && config.plot {
        let plot = crate::plot::render_ascii_plot(
            &out.series,
            &out.run.forecast,
            config.plot_width,
            config.plot_height,
        );
        println!("{plot}");
    }

    // Exports (overwritten every run).
    if let Some(path) = &config.export {
        crate::io::export::write_forecast_csv(path, &out.run.forecast)?;
        if mode == OutputMode::Full {
            println!("Forecast saved to {}", path.display());
        }
    }
    if let Some(path) = &config.export_model {
        crate::io::model::write_model_json(path, &out.run.fit, config.fill, &out.stats, &out.run.forecast)?;
        if mode == OutputMode::Full {
            println!("Model saved to {}", path.display());
        }
    }

    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let summary = crate::data::write_sample_csv(&args)?;
    println!("Wrote {} rows to {}", summary.rows_written, args.out.display());
    println!(
        "days={} skipped={} duplicated={} junk-dated={}",
        summary.days_covered, summary.skipped_days, summary.duplicate_rows, summary.junk_rows,
    );
    Ok(())
}

pub fn forecast_config_from_args(args: &ForecastArgs) -> ForecastConfig {
    ForecastConfig {
        data_path: args.data.clone(),
        horizon: args.horizon,
        order: args.order,
        fill: args.fill,
        plot: !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export: (!args.no_export).then(|| args.export.clone()),
        export_model: args.export_model.clone(),
        table_rows: args.rows,
    }
}

/// Rewrite argv so `salesfc` defaults to `salesfc tui`.
///
/// Rules:
/// - `salesfc`                     -> `salesfc tui`
/// - `salesfc --data x.csv ...`    -> `salesfc tui --data x.csv ...`
/// - `salesfc --help/--version/-h` -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "forecast" | "table" | "sample" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_defaults_to_tui() {
        assert_eq!(rewrite_args(argv(&["salesfc"])), argv(&["salesfc", "tui"]));
    }

    #[test]
    fn leading_flag_defaults_to_tui() {
        assert_eq!(
            rewrite_args(argv(&["salesfc", "--data", "x.csv"])),
            argv(&["salesfc", "tui", "--data", "x.csv"])
        );
    }

    #[test]
    fn subcommands_and_help_pass_through() {
        assert_eq!(
            rewrite_args(argv(&["salesfc", "forecast", "-n", "7"])),
            argv(&["salesfc", "forecast", "-n", "7"])
        );
        assert_eq!(rewrite_args(argv(&["salesfc", "--help"])), argv(&["salesfc", "--help"]));
    }

    #[test]
    fn no_export_clears_the_export_path() {
        let args = crate::cli::ForecastArgs::parse_from(["forecast", "--no-export"]);
        let config = forecast_config_from_args(&args);
        assert!(config.export.is_none());
    }

    #[test]
    fn plot_is_on_by_default_and_no_plot_disables_it() {
        let args = crate::cli::ForecastArgs::parse_from(["forecast"]);
        assert!(forecast_config_from_args(&args).plot);

        let args = crate::cli::ForecastArgs::parse_from(["forecast", "--no-plot"]);
        assert!(!forecast_config_from_args(&args).plot);
    }
}

//! Command-line parsing for the SBS mortgage-rate viewer.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the pipeline code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{ExportFormat, SeriesName};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "sbs", version, about = "SBS mortgage-rate series viewer")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive chart (the default when no subcommand is given).
    Tui(ViewArgs),
    /// Print an ASCII chart of the selected series.
    Plot(PlotArgs),
    /// Write the assembled chart data to JSON or CSV.
    Export(ExportArgs),
    /// Print row counts and per-series coverage for the selected range.
    Summary(ViewArgs),
}

/// Options shared by every view: where the data comes from and what to show.
#[derive(Debug, Args, Clone, Default)]
pub struct ViewArgs {
    /// CSV file path or http(s) URL [env: SBS_RATES_CSV; default: data/hipotecarios_300_habiles.csv].
    #[arg(short = 's', long, value_name = "PATH|URL")]
    pub source: Option<String>,

    /// First date shown (YYYY-MM-DD, inclusive). Defaults to the first row.
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub from: Option<String>,

    /// Last date shown (YYYY-MM-DD, inclusive). Defaults to the last row.
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub to: Option<String>,

    /// Series to plot (repeat or comma-separate). Defaults to `promedio`.
    #[arg(long, value_enum, value_delimiter = ',', num_args = 1..)]
    pub series: Vec<SeriesName>,
}

/// Options for the ASCII chart.
#[derive(Debug, Args)]
pub struct PlotArgs {
    #[command(flatten)]
    pub view: ViewArgs,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

/// Options for exporting chart data.
#[derive(Debug, Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub view: ViewArgs,

    /// Output file.
    #[arg(short = 'o', long, value_name = "FILE")]
    pub out: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
    pub format: ExportFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plot_with_series_list() {
        let cli = Cli::parse_from([
            "sbs", "plot", "--series", "bbva,credito", "--series", "promedio", "--from", "2024-01-02",
            "--width", "60",
        ]);
        let Command::Plot(args) = cli.command else {
            panic!("expected plot");
        };
        assert_eq!(
            args.view.series,
            vec![SeriesName::Bbva, SeriesName::Credito, SeriesName::Promedio]
        );
        assert_eq!(args.view.from.as_deref(), Some("2024-01-02"));
        assert_eq!(args.width, 60);
        assert_eq!(args.height, 25);
    }

    #[test]
    fn export_defaults_to_json() {
        let cli = Cli::parse_from(["sbs", "export", "-o", "out.json", "-s", "x.csv"]);
        let Command::Export(args) = cli.command else {
            panic!("expected export");
        };
        assert_eq!(args.format, ExportFormat::Json);
        assert_eq!(args.view.source.as_deref(), Some("x.csv"));
    }
}

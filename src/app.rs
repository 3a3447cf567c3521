//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - initializes logging
//! - loads the rate export once
//! - builds the initial view state
//! - hands off to the chosen front end (TUI, plot, export, summary)

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, ExportArgs, PlotArgs, ViewArgs};
use crate::data::{DataSource, resolve_location};
use crate::domain::{ActiveSeries, ViewConfig, parse_iso_date};
use crate::error::AppError;

pub mod pipeline;
pub mod state;

use state::{Action, ViewState, reduce};

/// Entry point for the `sbs` binary.
pub fn run() -> Result<(), AppError> {
    // We want `sbs` and `sbs --series bbva` to behave like `sbs tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    init_logging(matches!(cli.command, Command::Tui(_)));

    match cli.command {
        Command::Tui(args) => handle_tui(args),
        Command::Plot(args) => handle_plot(args),
        Command::Export(args) => handle_export(args),
        Command::Summary(args) => handle_summary(args),
    }
}

/// Logs go to stderr. The TUI defaults to warnings only so the alternate
/// screen is not scribbled over; `RUST_LOG` overrides either default.
fn init_logging(interactive: bool) {
    let default = if interactive { "sbs_rates=warn" } else { "sbs_rates=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_tui(args: ViewArgs) -> Result<(), AppError> {
    let config = view_config_from_args(&args)?;

    // A failed load is not fatal here: the TUI opens with an empty dataset and
    // shows the error in its status line.
    let state = match load_state(&config) {
        Ok(state) => state,
        Err(err) => {
            error!(source = %config.source, error = %err, "failed to load rate export");
            reduce(&ViewState::new(config.active), Action::LoadFailed(err.to_string()))
        }
    };

    crate::tui::run(config, state)
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let config = view_config_from_args(&args.view)?;
    let state = load_state(&config)?;

    let plot = crate::plot::render_ascii_chart(&state.chart(), args.width, args.height);
    println!("{plot}");
    Ok(())
}

fn handle_export(args: ExportArgs) -> Result<(), AppError> {
    let config = view_config_from_args(&args.view)?;
    let state = load_state(&config)?;

    crate::io::export::write_chart(&args.out, args.format, &state.chart(), &state.range, &config.source)?;
    println!("Wrote {}", args.out.display());
    Ok(())
}

fn handle_summary(args: ViewArgs) -> Result<(), AppError> {
    let config = view_config_from_args(&args)?;
    let state = load_state(&config)?;

    println!("{}", crate::report::format_summary(&state, &config.source));
    Ok(())
}

/// Resolve CLI flags (plus `.env`) into a view configuration.
///
/// Range bounds are checked against the calendar here so typos fail fast with
/// exit code 2; the pipeline itself never rejects a bound.
pub fn view_config_from_args(args: &ViewArgs) -> Result<ViewConfig, AppError> {
    Ok(ViewConfig {
        source: resolve_location(args.source.as_deref()),
        from: validated_bound("--from", args.from.as_deref())?,
        to: validated_bound("--to", args.to.as_deref())?,
        active: ActiveSeries::from_names(args.series.iter().copied()),
    })
}

fn validated_bound(flag: &str, value: Option<&str>) -> Result<Option<String>, AppError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let date = parse_iso_date(value)
        .ok_or_else(|| AppError::input(format!("Invalid {flag} date '{value}': expected YYYY-MM-DD")))?;
    Ok(Some(date.format("%Y-%m-%d").to_string()))
}

/// Load the export named by `config` and build the initial view state.
pub fn load_state(config: &ViewConfig) -> Result<ViewState, AppError> {
    let text = DataSource::from_location(&config.source).fetch_text()?;
    let state = state_from_text(&text, config);
    info!(
        rows = state.rows.len(),
        shown = state.visible_rows().len(),
        series = ?state.active,
        "view ready"
    );
    Ok(state)
}

/// Initial view state for already-loaded export text.
///
/// The range starts at the full span of the rows; explicit `--from`/`--to`
/// then replace the matching bound.
pub fn state_from_text(text: &str, config: &ViewConfig) -> ViewState {
    let mut state = reduce(
        &ViewState::new(config.active),
        Action::Loaded(pipeline::load_rows(text)),
    );
    if let Some(from) = &config.from {
        state = reduce(&state, Action::SetFrom(from.clone()));
    }
    if let Some(to) = &config.to {
        state = reduce(&state, Action::SetTo(to.clone()));
    }
    state
}

/// Rewrite argv so `sbs` defaults to `sbs tui`.
///
/// Rules:
/// - `sbs`                      -> `sbs tui`
/// - `sbs --series bbva ...`    -> `sbs tui --series bbva ...`
/// - `sbs --help/--version/-h`  -> unchanged (show top-level help/version)
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

    let is_subcommand = matches!(arg1.as_str(), "tui" | "plot" | "export" | "summary");
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

//! # Dive Planner Application Entry Point
//!
//! Command-line driver for the dive planner library. It collects depths and
//! times, hands them to a [`DivePlanEngine`], and prints what comes back.
//!
//! Two ways to run it:
//! - **Interactive** (default): prompts for each step like a paper table workflow
//! - **Scripted**: `--dive1 60:55 --interval 1:30 --dive2 50:20` plans in one go
//!
//! Add `--json` for machine-readable output, `--limits` for the no-decompression chart.


use anyhow::{anyhow, bail, Context};
use dive_planner_lib::{
    config::{Config, OutputFormat, DEFAULT_CONFIG_PATH},
    report, DivePlanEngine, PlanError, PlanState, Units,
};
use std::env;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "\
Usage: dive-planner [OPTIONS]

Plans a first dive and one repetitive dive on the PADI Recreational Dive Planner tables.
Without --dive1 the planner asks for each value interactively.

Options:
  --dive1 DEPTH:TIME     First dive depth and bottom time in minutes
  --interval MINUTES     Surface interval, as minutes (90) or H:MM (1:30)
  --dive2 DEPTH:TIME     Second dive depth and planned bottom time
  --json                 Print the plan as JSON
  --limits               Print the no-decompression limit chart
  --config PATH          Configuration file (default: dive-planner.toml)
  --init-config          Write a default configuration file and exit
  -h, --help             Show this help";

/// Parsed command line options.
#[derive(Debug, Default, PartialEq)]
struct Options {
    config_path: Option<PathBuf>,
    json: bool,
    limits: bool,
    init_config: bool,
    help: bool,
    dive1: Option<(f64, f64)>,
    interval: Option<f64>,
    dive2: Option<(f64, f64)>,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> anyhow::Result<Options> {
    let mut options = Options::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        let mut value = |flag: &str| {
            args.next()
                .ok_or_else(|| anyhow!("{flag} needs a value"))
        };
        match arg.as_str() {
            "--json" => options.json = true,
            "--limits" => options.limits = true,
            "--init-config" => options.init_config = true,
            "-h" | "--help" => options.help = true,
            "--config" => options.config_path = Some(PathBuf::from(value("--config")?)),
            "--dive1" => {
                options.dive1 = Some(parse_dive(&value("--dive1")?).map_err(|e| anyhow!(e))?)
            }
            "--dive2" => {
                options.dive2 = Some(parse_dive(&value("--dive2")?).map_err(|e| anyhow!(e))?)
            }
            "--interval" => {
                let interval = value("--interval")?;
                options.interval = Some(parse_surface_interval(&interval).map_err(|e| anyhow!(e))?)
            }
            other => bail!("unknown argument {other:?}\n\n{USAGE}"),
        }
    }

    if options.dive2.is_some() && options.interval.is_none() {
        bail!("--dive2 needs --interval");
    }
    if options.interval.is_some() && options.dive1.is_none() {
        bail!("--interval needs --dive1");
    }
    Ok(options)
}

/// Parse a positive number.
fn parse_positive(text: &str) -> Result<f64, String> {
    match text.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => Ok(value),
        Ok(_) => Err("Please enter a number greater than zero".into()),
        Err(_) => Err("Please enter a valid number".into()),
    }
}

/// Parse `DEPTH:TIME`, e.g. `60:55`.
fn parse_dive(text: &str) -> Result<(f64, f64), String> {
    let (depth, time) = text
        .split_once(':')
        .ok_or_else(|| format!("expected DEPTH:TIME, got {text:?}"))?;
    Ok((parse_positive(depth)?, parse_positive(time)?))
}

/// Parse a surface interval as whole minutes (`90`) or hours and minutes (`1:30`).
fn parse_surface_interval(text: &str) -> Result<f64, String> {
    let text = text.trim();
    match text.split_once(':') {
        Some((hours, minutes)) => {
            let hours: u32 = hours
                .parse()
                .map_err(|_| format!("invalid hours in {text:?}"))?;
            let minutes: u32 = minutes
                .parse()
                .map_err(|_| format!("invalid minutes in {text:?}"))?;
            if minutes >= 60 {
                return Err(format!("minutes must be below 60 in {text:?}"));
            }
            Ok(f64::from(hours) * 60.0 + f64::from(minutes))
        }
        None => match text.parse::<f64>() {
            Ok(minutes) if minutes.is_finite() && minutes >= 0.0 => Ok(minutes),
            _ => Err("Please enter minutes (90) or hours and minutes (1:30)".into()),
        },
    }
}

/// Ask `question` until `parse` accepts the answer.
fn prompt<R, W, T, F>(input: &mut R, output: &mut W, question: &str, parse: F) -> anyhow::Result<T>
where
    R: BufRead,
    W: Write,
    F: Fn(&str) -> Result<T, String>,
{
    loop {
        write!(output, "{question}")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            bail!("input ended before the plan was complete");
        }
        match parse(line.trim()) {
            Ok(value) => return Ok(value),
            Err(message) => writeln!(output, "{message}")?,
        }
    }
}

/// Depth prompt that re-asks for depths deeper than the tables go.
fn prompt_depth<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    (max_depth, units): (u32, Units),
    question: &str,
) -> anyhow::Result<f64> {
    prompt(input, output, question, |text| {
        let depth = parse_positive(text)?;
        if depth > f64::from(max_depth) {
            Err(format!("Invalid depth. The tables stop at {max_depth} {units}"))
        } else {
            Ok(depth)
        }
    })
}

/// Walk the diver through both dives, printing each result as it comes.
fn run_interactive<R: BufRead, W: Write>(
    engine: &mut DivePlanEngine,
    input: &mut R,
    output: &mut W,
) -> anyhow::Result<()> {
    let units = engine.tables().units();
    let limits = (engine.tables().max_depth(), units);
    let minimum = engine.tables().min_surface_interval();
    writeln!(output, "\n=== PADI Dive Planner ===\n")?;

    let question = format!("Enter first dive depth ({units}): ");
    let depth = prompt_depth(input, output, limits, &question)?;
    let time = prompt(input, output, "Enter first dive bottom time (min): ", parse_positive)?;
    match engine.plan_first_dive(depth, time) {
        Ok(leg) => write!(output, "\n{}", report::format_leg("First dive", &leg, units))?,
        Err(err) => return report_failure(output, &err),
    }

    let minutes = prompt(
        input,
        output,
        "\nEnter surface interval (minutes or H:MM): ",
        |text| {
            let minutes = parse_surface_interval(text)?;
            if minutes < f64::from(minimum) {
                Err(format!("Surface interval must be at least {minimum} minutes"))
            } else {
                Ok(minutes)
            }
        },
    )?;
    match engine.apply_surface_interval(minutes) {
        Ok(credit) => write!(output, "{}", report::format_surface_credit(&credit))?,
        Err(err) => return report_failure(output, &err),
    }

    let question = format!("\nEnter second dive depth ({units}): ");
    let depth = prompt_depth(input, output, limits, &question)?;
    let time = prompt(
        input,
        output,
        "Enter second dive planned bottom time (min): ",
        parse_positive,
    )?;
    match engine.plan_second_dive(depth, time) {
        Ok(leg) => {
            write!(output, "\n{}", report::format_leg("Second dive", &leg, units))?;
            writeln!(output, "✅ Second dive is within no-decompression limits.")?;
        }
        Err(err) => return report_failure(output, &err),
    }
    Ok(())
}

fn report_failure<W: Write>(output: &mut W, err: &PlanError) -> anyhow::Result<()> {
    tracing::debug!(kind = err.kind(), "plan refused");
    write!(output, "{}", report::format_error(err))?;
    Ok(())
}

/// Plan every step given on the command line, stopping at the first failure.
///
/// A failure is also recorded in the engine state, which is what gets reported.
fn run_scripted(engine: &mut DivePlanEngine, options: &Options) -> Result<(), PlanError> {
    let Some((depth, time)) = options.dive1 else {
        return Ok(());
    };
    engine.plan_first_dive(depth, time)?;

    if let Some(minutes) = options.interval {
        engine.apply_surface_interval(minutes)?;
        if let Some((depth, time)) = options.dive2 {
            engine.plan_second_dive(depth, time)?;
        }
    }
    Ok(())
}

/// Main application entry point.
fn main() -> anyhow::Result<ExitCode> {
    // Logs go to stderr so plan output on stdout stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dive_planner=warn,dive_planner_lib=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let options = parse_args(env::args().skip(1))?;
    if options.help {
        println!("{USAGE}");
        return Ok(ExitCode::SUCCESS);
    }

    let config_path = options
        .config_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    if options.init_config {
        if config_path.exists() {
            bail!("{} already exists", config_path.display());
        }
        Config::default()
            .save_to_path(&config_path)
            .with_context(|| format!("failed to write {}", config_path.display()))?;
        println!("Wrote default configuration to {}", config_path.display());
        return Ok(ExitCode::SUCCESS);
    }

    let config = Config::load_from_path(&config_path);
    let tables = Arc::new(config.table_set().context("failed to load dive tables")?);
    tracing::info!(
        units = %tables.units(),
        depths = tables.depth_rows().len(),
        "dive tables loaded"
    );

    let json = options.json || config.output.format == OutputFormat::Json;
    if options.limits || config.output.show_table_limits {
        print!("{}", report::format_limits(&tables));
        if options.limits && options.dive1.is_none() {
            return Ok(ExitCode::SUCCESS);
        }
    }

    let mut engine = DivePlanEngine::new(tables);
    if options.dive1.is_some() {
        if let Err(err) = run_scripted(&mut engine, &options) {
            tracing::debug!(kind = err.kind(), "scripted plan stopped");
        }
        if !json {
            print!("{}", report::format_summary(&engine.summary()));
        }
    } else {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stdout();
        run_interactive(&mut engine, &mut input, &mut output)?;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&engine.summary())?);
    }

    Ok(match engine.current_state() {
        PlanState::PlanInvalid(_) => ExitCode::from(2),
        _ => ExitCode::SUCCESS,
    })
}

//! # Plan Rendering
//!
//! Plain-text rendering of planner results for terminals and logs. Every function
//! returns a `String` so callers decide where output goes and tests can inspect it.

use crate::{DivePlanLeg, PlanError, PlanState, PlanSummary, SurfaceCredit, TableSet, Units};
use std::fmt::Write;

/// Render one planned dive.
pub fn format_leg(title: &str, leg: &DivePlanLeg, units: Units) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{title}");
    let _ = writeln!(
        out,
        "  Depth:                {} {units} (table row {} {units})",
        format_number(leg.requested_depth),
        leg.depth
    );
    if let Some(group) = leg.pressure_group_before {
        let _ = writeln!(out, "  Starting group:       {group}");
        let _ = writeln!(out, "  Residual nitrogen:    {} min", leg.residual_nitrogen_time);
        let _ = writeln!(out, "  Adjusted limit:       {} min", leg.adjusted_ndl);
        let _ = writeln!(out, "  Planned bottom time:  {} min", leg.planned_bottom_time);
        let _ = writeln!(out, "  Total bottom time:    {} min", leg.actual_total_bottom_time);
    } else {
        let _ = writeln!(out, "  No-deco limit:        {} min", leg.adjusted_ndl);
        let _ = writeln!(out, "  Bottom time:          {} min", leg.planned_bottom_time);
    }
    let _ = writeln!(out, "  Pressure group after: {}", leg.pressure_group_after);
    out
}

/// Render the outcome of a surface interval.
pub fn format_surface_credit(credit: &SurfaceCredit) -> String {
    match credit.pressure_group {
        Some(group) if credit.residual_nitrogen_applies => format!(
            "Surface interval {}: group {} -> {group}\n",
            format_minutes(credit.minutes),
            credit.start_group
        ),
        _ => format!(
            "Surface interval {}: fully desaturated, next dive plans as a first dive\n",
            format_minutes(credit.minutes)
        ),
    }
}

/// Render a planning failure as a warning line.
pub fn format_error(err: &PlanError) -> String {
    format!("⚠ WARNING: {err}\n")
}

/// Render everything a session has produced.
pub fn format_summary(summary: &PlanSummary) -> String {
    let mut out = String::new();
    if let Some(leg) = &summary.first_dive {
        out.push_str(&format_leg("First dive", leg, summary.units));
    }
    if let Some(credit) = &summary.surface_interval {
        out.push_str(&format_surface_credit(credit));
    }
    if let Some(leg) = &summary.second_dive {
        out.push_str(&format_leg("Second dive", leg, summary.units));
    }
    match &summary.state {
        PlanState::PlanInvalid(err) => out.push_str(&format_error(err)),
        PlanState::PlanComplete => {
            out.push_str("✅ Both dives are within no-decompression limits.\n")
        }
        state => {
            let _ = writeln!(out, "Plan status: {}", state.name());
        }
    }
    out
}

/// Render the no-decompression limit for every tabulated depth.
pub fn format_limits(tables: &TableSet) -> String {
    let units = tables.units();
    let mut out = String::from("Depth   No-deco limit   Groups\n");
    for row in tables.depth_rows() {
        let last = row
            .breakpoints()
            .last()
            .map_or('-', |&(_, group)| group.letter());
        let _ = writeln!(
            out,
            "{:>4} {:<2} {:>6} min      A-{last}",
            row.depth(),
            units.abbreviation(),
            row.ndl()
        );
    }
    out
}

/// Format minutes as `H:MM`.
fn format_minutes(minutes: u32) -> String {
    format!("{}:{:02}", minutes / 60, minutes % 60)
}

/// Format a depth without a trailing `.0` for whole numbers.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}

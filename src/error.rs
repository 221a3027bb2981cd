//! # Planning Errors
//!
//! Every failure the planner can report. All of them are deterministic outcomes
//! of the inputs and the tables: retrying with the same inputs gives the same
//! answer, so none of them is ever retried or downgraded to a warning.
//!
//! Each variant carries the values that caused it so the caller can explain the
//! refusal to the diver without re-deriving anything.

use crate::PressureGroup;
use serde::Serialize;
use thiserror::Error;

/// Errors surfaced by the resolvers and the [`DivePlanEngine`](crate::DivePlanEngine).
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanError {
    /// Depth is deeper than the deepest tabulated row
    #[error("depth {depth} is deeper than the deepest table row ({max_depth})")]
    DepthOutOfRange { depth: f64, max_depth: u32 },

    /// Pressure group is too heavy for any dive at this depth
    #[error("pressure group {group} has no residual nitrogen entry at depth {depth}")]
    DepthOutOfRangeForResidualLoad { group: PressureGroup, depth: u32 },

    /// Bottom time exceeds the no-decompression limit
    #[error(
        "bottom time of {bottom_time} min exceeds the no-decompression limit of {ndl} min at depth {depth}"
    )]
    NoDecompressionLimitExceeded {
        depth: u32,
        bottom_time: u32,
        ndl: u32,
    },

    /// Surface interval too short for repetitive dive credit
    #[error("surface interval of {minutes} min is shorter than the {minimum} min minimum")]
    SurfaceIntervalTooShort { minutes: f64, minimum: u32 },

    /// Residual nitrogen uses up the whole limit at this depth
    #[error(
        "pressure group {group} leaves no bottom time at depth {depth} (residual nitrogen {residual_nitrogen_time} min, limit {ndl} min)"
    )]
    NoRemainingBottomTimeAvailable {
        group: PressureGroup,
        depth: u32,
        residual_nitrogen_time: u32,
        ndl: u32,
    },

    /// Planned time exceeds the limit left after residual nitrogen
    #[error(
        "planned bottom time of {bottom_time} min exceeds the adjusted limit of {adjusted_ndl} min at depth {depth}"
    )]
    RepetitiveDiveExceedsAdjustedLimit {
        depth: u32,
        bottom_time: u32,
        adjusted_ndl: u32,
        residual_nitrogen_time: u32,
    },

    /// Table has no entry for the requested key
    #[error("no {table} table entry for {key}")]
    LookupMiss { table: &'static str, key: String },

    /// Operation called out of sequence
    #[error("cannot {operation} while the plan is {state}")]
    InvalidPlanState {
        operation: &'static str,
        state: &'static str,
    },

    /// Depth or time that is not a positive, finite number
    #[error("{field} must be a positive number, got {value}")]
    InvalidMeasurement { field: &'static str, value: f64 },
}

impl PlanError {
    /// Short machine-friendly name of the failure.
    pub fn kind(&self) -> &'static str {
        match self {
            PlanError::DepthOutOfRange { .. } => "depth_out_of_range",
            PlanError::DepthOutOfRangeForResidualLoad { .. } => {
                "depth_out_of_range_for_residual_load"
            }
            PlanError::NoDecompressionLimitExceeded { .. } => "no_decompression_limit_exceeded",
            PlanError::SurfaceIntervalTooShort { .. } => "surface_interval_too_short",
            PlanError::NoRemainingBottomTimeAvailable { .. } => {
                "no_remaining_bottom_time_available"
            }
            PlanError::RepetitiveDiveExceedsAdjustedLimit { .. } => {
                "repetitive_dive_exceeds_adjusted_limit"
            }
            PlanError::LookupMiss { .. } => "lookup_miss",
            PlanError::InvalidPlanState { .. } => "invalid_plan_state",
            PlanError::InvalidMeasurement { .. } => "invalid_measurement",
        }
    }
}

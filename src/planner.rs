//! # Dive Plan Engine
//!
//! Sequences one planning session: a first dive, a surface interval, and a
//! repetitive second dive. The session is an explicit state machine so an
//! interactive prompt loop and a programmatic caller share the same checks:
//!
//! ```text
//! AwaitingFirstDive --plan_first_dive--> FirstDiveComplete
//! FirstDiveComplete --apply_surface_interval--> SurfaceIntervalApplied
//! SurfaceIntervalApplied --plan_second_dive--> PlanComplete
//! any state --data failure--> PlanInvalid (terminal)
//! ```
//!
//! Calling an operation from the wrong state fails with `InvalidPlanState` and
//! leaves the session untouched. Every other failure is final: the session
//! moves to `PlanInvalid` carrying the error and accepts no further calls.
//!
//! One engine serves one session. Engines share a [`TableSet`] through an `Arc`
//! and hold no other shared state.

use crate::{
    pressure_group::PressureGroupResolver, residual_nitrogen::ResidualNitrogenResolver,
    rounding, surface_interval::SurfaceIntervalResolver, DivePlanLeg, PlanError, PressureGroup,
    SurfaceCredit, TableSet, Units,
};
use serde::Serialize;
use std::sync::Arc;

/// Where a planning session stands.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum PlanState {
    /// Nothing planned yet
    AwaitingFirstDive,
    /// First dive planned, waiting for the surface interval
    FirstDiveComplete,
    /// Surface interval credited, waiting for the second dive
    SurfaceIntervalApplied,
    /// Both dives planned within limits
    PlanComplete,
    /// The plan failed; carries the reason
    PlanInvalid(PlanError),
}

impl PlanState {
    /// Short name of the state.
    pub fn name(&self) -> &'static str {
        match self {
            PlanState::AwaitingFirstDive => "awaiting first dive",
            PlanState::FirstDiveComplete => "first dive complete",
            PlanState::SurfaceIntervalApplied => "surface interval applied",
            PlanState::PlanComplete => "plan complete",
            PlanState::PlanInvalid(_) => "plan invalid",
        }
    }

    /// Whether the session accepts no further operations.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PlanState::PlanComplete | PlanState::PlanInvalid(_))
    }
}

/// Everything a session has produced so far, ready to render or serialize.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlanSummary {
    pub units: Units,
    pub state: PlanState,
    pub first_dive: Option<DivePlanLeg>,
    pub surface_interval: Option<SurfaceCredit>,
    pub second_dive: Option<DivePlanLeg>,
}

/// Planner for one first dive and one repetitive dive.
///
/// # Example
/// ```
/// use dive_planner_lib::{DivePlanEngine, PlanState, TableSet};
/// use std::sync::Arc;
///
/// let tables = Arc::new(TableSet::padi_imperial().unwrap());
/// let mut engine = DivePlanEngine::new(tables);
///
/// let first = engine.plan_first_dive(60.0, 55.0).unwrap();
/// assert_eq!(first.pressure_group_after.letter(), 'W');
///
/// engine.apply_surface_interval(90.0).unwrap();
/// let second = engine.plan_second_dive(50.0, 20.0).unwrap();
/// assert_eq!(second.residual_nitrogen_time, 19);
/// assert_eq!(engine.current_state(), &PlanState::PlanComplete);
/// ```
#[derive(Debug, Clone)]
pub struct DivePlanEngine {
    tables: Arc<TableSet>,
    state: PlanState,
    first_leg: Option<DivePlanLeg>,
    surface_credit: Option<SurfaceCredit>,
    second_leg: Option<DivePlanLeg>,
}

impl DivePlanEngine {
    pub fn new(tables: Arc<TableSet>) -> Self {
        Self {
            tables,
            state: PlanState::AwaitingFirstDive,
            first_leg: None,
            surface_credit: None,
            second_leg: None,
        }
    }

    /// Table set this session plans against.
    pub fn tables(&self) -> &TableSet {
        &self.tables
    }

    pub fn current_state(&self) -> &PlanState {
        &self.state
    }

    pub fn first_leg(&self) -> Option<&DivePlanLeg> {
        self.first_leg.as_ref()
    }

    pub fn surface_credit(&self) -> Option<&SurfaceCredit> {
        self.surface_credit.as_ref()
    }

    pub fn second_leg(&self) -> Option<&DivePlanLeg> {
        self.second_leg.as_ref()
    }

    /// Plan the first dive of the session.
    pub fn plan_first_dive(&mut self, depth: f64, time: f64) -> Result<DivePlanLeg, PlanError> {
        self.require(&PlanState::AwaitingFirstDive, "plan the first dive")?;

        let result = fresh_leg(&self.tables, depth, time);
        let leg = self.settle(result)?;
        self.first_leg = Some(leg.clone());
        self.state = PlanState::FirstDiveComplete;
        Ok(leg)
    }

    /// Credit the surface interval after the first dive.
    pub fn apply_surface_interval(&mut self, minutes: f64) -> Result<SurfaceCredit, PlanError> {
        self.require(&PlanState::FirstDiveComplete, "apply a surface interval")?;

        let Some(start_group) = self.first_leg.as_ref().map(|leg| leg.pressure_group_after) else {
            return Err(PlanError::InvalidPlanState {
                operation: "apply a surface interval",
                state: self.state.name(),
            });
        };

        let result = SurfaceIntervalResolver::new(&self.tables).resolve(start_group, minutes);
        let credit = self.settle(result)?;
        self.surface_credit = Some(credit);
        self.state = PlanState::SurfaceIntervalApplied;
        Ok(credit)
    }

    /// Plan the repetitive dive, charging residual nitrogen when it applies.
    pub fn plan_second_dive(&mut self, depth: f64, time: f64) -> Result<DivePlanLeg, PlanError> {
        self.require(&PlanState::SurfaceIntervalApplied, "plan the second dive")?;

        let carried = self
            .surface_credit
            .filter(|credit| credit.residual_nitrogen_applies)
            .and_then(|credit| credit.pressure_group);

        let result = match carried {
            Some(group) => repetitive_leg(&self.tables, group, depth, time),
            None => fresh_leg(&self.tables, depth, time),
        };
        let leg = self.settle(result)?;
        self.second_leg = Some(leg.clone());
        self.state = PlanState::PlanComplete;
        Ok(leg)
    }

    /// Snapshot of the session for rendering.
    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            units: self.tables.units(),
            state: self.state.clone(),
            first_dive: self.first_leg.clone(),
            surface_interval: self.surface_credit,
            second_dive: self.second_leg.clone(),
        }
    }

    fn require(&self, expected: &PlanState, operation: &'static str) -> Result<(), PlanError> {
        if &self.state == expected {
            Ok(())
        } else {
            Err(PlanError::InvalidPlanState {
                operation,
                state: self.state.name(),
            })
        }
    }

    fn settle<T>(&mut self, result: Result<T, PlanError>) -> Result<T, PlanError> {
        result.map_err(|err| self.fail(err))
    }

    fn fail(&mut self, err: PlanError) -> PlanError {
        self.state = PlanState::PlanInvalid(err.clone());
        err
    }
}

/// A dive with no residual nitrogen: first dive, or any dive after desaturation.
fn fresh_leg(tables: &TableSet, depth: f64, time: f64) -> Result<DivePlanLeg, PlanError> {
    let resolution = PressureGroupResolver::new(tables).resolve(depth, time)?;
    let pressure_group_after = resolution.into_group()?;

    Ok(DivePlanLeg {
        requested_depth: depth,
        depth: resolution.depth,
        planned_bottom_time: resolution.bottom_time,
        pressure_group_before: None,
        residual_nitrogen_time: 0,
        adjusted_ndl: resolution.ndl,
        actual_total_bottom_time: resolution.bottom_time,
        pressure_group_after,
    })
}

/// A repetitive dive carrying `group` from the surface interval.
fn repetitive_leg(
    tables: &TableSet,
    group: PressureGroup,
    depth: f64,
    time: f64,
) -> Result<DivePlanLeg, PlanError> {
    let planned = rounding::bottom_time_minutes(time)?;
    let residual = ResidualNitrogenResolver::new(tables).resolve(group, depth)?;

    if planned > residual.adjusted_ndl {
        return Err(PlanError::RepetitiveDiveExceedsAdjustedLimit {
            depth: residual.depth,
            bottom_time: planned,
            adjusted_ndl: residual.adjusted_ndl,
            residual_nitrogen_time: residual.residual_nitrogen_time,
        });
    }

    // The group on surfacing reflects all nitrogen taken up, residual included.
    let total = planned + residual.residual_nitrogen_time;
    let pressure_group_after = PressureGroupResolver::new(tables)
        .resolve(f64::from(residual.depth), f64::from(total))?
        .into_group()?;

    Ok(DivePlanLeg {
        requested_depth: depth,
        depth: residual.depth,
        planned_bottom_time: planned,
        pressure_group_before: Some(group),
        residual_nitrogen_time: residual.residual_nitrogen_time,
        adjusted_ndl: residual.adjusted_ndl,
        actual_total_bottom_time: total,
        pressure_group_after,
    })
}

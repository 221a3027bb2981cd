//! # Dive Planner Core Library
//!
//! This library computes recreational dive-safety parameters from the PADI
//! Recreational Dive Planner tables: pressure groups, surface interval credit,
//! residual nitrogen time and no-decompression limits for a first dive and one
//! repetitive dive.
//!
//! ## Design Philosophy
//!
//! ### The Tables Are The Model
//! There is no decompression physics here. The printed tables already encode a
//! discretized, safety-biased model, so every answer is a lookup plus the tables'
//! own rounding conventions:
//! - **Depth** rounds up to the next tabulated row (deeper is safer)
//! - **Bottom time** rounds up to the next whole minute
//! - **Surface time** is used as measured, never rounded up
//!
//! Those policies live in [`rounding`] so they are applied identically everywhere.
//!
//! ### Immutable, Injected Data
//! A [`TableSet`] is loaded and validated once, then shared read-only (usually
//! behind an `Arc`). Imperial and metric table sets can be loaded side by side;
//! units are never converted implicitly.
//!
//! ### Data Flow
//! 1. **First dive**: [`pressure_group`] maps depth and bottom time to a group
//! 2. **Surface interval**: [`surface_interval`] credits off-gassing time
//! 3. **Second dive**: [`residual_nitrogen`] adds the carried-over nitrogen
//! 4. **Orchestration**: [`planner::DivePlanEngine`] sequences and validates the steps
//!
//! ## Core Types
//!
//! - [`PressureGroup`]: the A..Z nitrogen loading letter
//! - [`DivePlanLeg`]: the finished, immutable result of planning one dive

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Module declarations
pub mod config;
pub mod error;
pub mod planner;
pub mod pressure_group;
pub mod report;
pub mod residual_nitrogen;
pub mod rounding;
pub mod surface_interval;
pub mod tables;

pub use error::PlanError;
pub use planner::{DivePlanEngine, PlanState, PlanSummary};
pub use surface_interval::SurfaceCredit;
pub use tables::{TableError, TableSet, Units};

/// Number of pressure groups on the tables (A through Z).
pub const PRESSURE_GROUP_COUNT: usize = 26;

/// A pressure group letter denoting residual nitrogen loading.
///
/// Groups are totally ordered: `A` is the lightest loading, `Z` the heaviest.
/// Internally the group is stored as its zero-based index, so comparisons are
/// plain integer comparisons.
///
/// # Example
/// ```
/// use dive_planner_lib::PressureGroup;
///
/// let w: PressureGroup = "W".parse().unwrap();
/// assert!(w > PressureGroup::A);
/// assert_eq!(w.to_string(), "W");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PressureGroup(u8);

impl PressureGroup {
    /// The lightest pressure group.
    pub const A: PressureGroup = PressureGroup(0);
    /// The heaviest pressure group.
    pub const Z: PressureGroup = PressureGroup(PRESSURE_GROUP_COUNT as u8 - 1);

    /// Group at a zero-based index (`0` is `A`).
    pub fn from_index(index: usize) -> Option<Self> {
        (index < PRESSURE_GROUP_COUNT).then_some(PressureGroup(index as u8))
    }

    /// Group for a letter, case-insensitive.
    pub fn from_letter(letter: char) -> Option<Self> {
        let upper = letter.to_ascii_uppercase();
        if upper.is_ascii_uppercase() {
            Some(PressureGroup(upper as u8 - b'A'))
        } else {
            None
        }
    }

    /// Zero-based index (`A` is `0`).
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// The group's letter.
    pub fn letter(self) -> char {
        (b'A' + self.0) as char
    }

    /// All groups in ascending order.
    pub fn all() -> impl Iterator<Item = PressureGroup> {
        (0..PRESSURE_GROUP_COUNT as u8).map(PressureGroup)
    }
}

impl fmt::Display for PressureGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Error returned when text is not a single pressure group letter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid pressure group {0:?}, expected a single letter A-Z")]
pub struct ParsePressureGroupError(pub String);

impl FromStr for PressureGroup {
    type Err = ParsePressureGroupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(letter), None) => {
                PressureGroup::from_letter(letter).ok_or_else(|| ParsePressureGroupError(s.into()))
            }
            _ => Err(ParsePressureGroupError(s.into())),
        }
    }
}

impl TryFrom<String> for PressureGroup {
    type Error = ParsePressureGroupError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PressureGroup> for String {
    fn from(group: PressureGroup) -> Self {
        group.to_string()
    }
}

/// The planned result of one dive, created once and never modified.
///
/// For a first dive (or any dive after full desaturation) there is no
/// `pressure_group_before`, the residual nitrogen time is zero and the
/// adjusted limit equals the table limit.
///
/// For a repetitive dive the final `pressure_group_after` is resolved from
/// `actual_total_bottom_time` (planned time plus residual nitrogen time), so it
/// reflects all nitrogen accumulated, not just the planned minutes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DivePlanLeg {
    /// Depth as entered by the caller
    pub requested_depth: f64,
    /// Tabulated depth used for the lookups (requested depth rounded up)
    pub depth: u32,
    /// Planned bottom time rounded up to whole minutes
    pub planned_bottom_time: u32,
    /// Pressure group carried into the dive from the surface interval
    pub pressure_group_before: Option<PressureGroup>,
    /// Residual nitrogen time credited at this depth
    pub residual_nitrogen_time: u32,
    /// No-decompression limit at this depth minus residual nitrogen time
    pub adjusted_ndl: u32,
    /// Planned bottom time plus residual nitrogen time
    pub actual_total_bottom_time: u32,
    /// Pressure group on surfacing
    pub pressure_group_after: PressureGroup,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_round_trip() {
        for (index, group) in PressureGroup::all().enumerate() {
            assert_eq!(group.index(), index);
            assert_eq!(PressureGroup::from_letter(group.letter()), Some(group));
        }
        assert_eq!(PressureGroup::all().count(), PRESSURE_GROUP_COUNT);
    }

    #[test]
    fn test_parse_accepts_lowercase_and_whitespace() {
        assert_eq!("w".parse::<PressureGroup>().unwrap().letter(), 'W');
        assert_eq!(" L ".parse::<PressureGroup>().unwrap().letter(), 'L');
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<PressureGroup>().is_err());
        assert!("AB".parse::<PressureGroup>().is_err());
        assert!("3".parse::<PressureGroup>().is_err());
        assert!(PressureGroup::from_index(26).is_none());
    }

    #[test]
    fn test_ordering_follows_letters() {
        assert!(PressureGroup::A < PressureGroup::Z);
        let l: PressureGroup = "L".parse().unwrap();
        let w: PressureGroup = "W".parse().unwrap();
        assert!(l < w);
    }

    #[test]
    fn test_serializes_as_letter() {
        let json = serde_json::to_string(&PressureGroup::Z).unwrap();
        assert_eq!(json, "\"Z\"");
        let parsed: PressureGroup = serde_json::from_str("\"q\"").unwrap();
        assert_eq!(parsed.letter(), 'Q');
        assert!(serde_json::from_str::<PressureGroup>("\"QQ\"").is_err());
    }
}

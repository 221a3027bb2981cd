//! # Dive Table Data
//!
//! This module loads and validates the three lookup tables the planner runs on:
//!
//! 1. **Depth/time table**: bottom-time thresholds per depth, one per pressure group.
//!    The last threshold of a row is that depth's no-decompression limit.
//! 2. **Surface interval credit table**: for each starting group, contiguous
//!    whole-minute bands that each map to a lighter group.
//! 3. **Residual nitrogen table**: minutes of residual nitrogen per
//!    (pressure group, depth).
//!
//! ## Data Source
//!
//! The PADI imperial tables ship inside the binary as `data/padi_rdp_imperial.toml`
//! and are parsed once by [`TableSet::padi_imperial`]. Alternate sets (for example a
//! metric edition) load through [`TableSet::load_from_path`] with the same schema:
//!
//! ```toml
//! units = "feet"
//! min_surface_interval = 10
//! full_desaturation_minutes = 360
//!
//! [[depth]]
//! depth = 60
//! bottom_time = [6, 11, 14]          # groups A, B, C, ...
//! residual_nitrogen = [6, 11, 14]    # groups A, B, C, ...
//!
//! [[surface_interval]]
//! from = "C"
//! bands = [{ min = 0, max = 9, group = "B" }, { min = 10, group = "A" }]
//! ```
//!
//! ## Validation
//!
//! A transcription slip in these tables silently produces an unsafe answer, so
//! every set is checked when it is loaded and rejected with [`TableError::Invalid`]
//! on the first inconsistency: unordered depths, thresholds that do not strictly
//! increase, residual nitrogen that does not grow with the group letter, surface
//! interval bands with gaps or overlaps, or a starting group with no bands.

use crate::{rounding, PlanError, PressureGroup, PRESSURE_GROUP_COUNT};
use serde::{Deserialize, Serialize};
use std::{fmt, fs, io, path::Path};
use thiserror::Error;

/// Bundled PADI RDP imperial tables.
const PADI_IMPERIAL: &str = include_str!("../data/padi_rdp_imperial.toml");

/// Errors raised while loading a table set.
///
/// These are startup-time configuration errors: a process should refuse to plan
/// dives with a table set that fails to load.
#[derive(Error, Debug)]
pub enum TableError {
    /// Table file could not be read
    #[error("table file IO: {0}")]
    Io(#[from] io::Error),

    /// Table file is not valid TOML or does not match the schema
    #[error("table file format: {0}")]
    Parse(#[from] toml::de::Error),

    /// Table data breaks an ordering or coverage invariant
    #[error("invalid table data: {0}")]
    Invalid(String),
}

/// Depth units of a table set. All depths given to one set use its units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    Feet,
    Meters,
}

impl Units {
    /// Short unit label for display.
    pub fn abbreviation(self) -> &'static str {
        match self {
            Units::Feet => "ft",
            Units::Meters => "m",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

/// One row of the depth/time table.
#[derive(Clone, Debug, PartialEq)]
pub struct DepthTimeEntry {
    depth: u32,
    breakpoints: Vec<(u32, PressureGroup)>,
}

impl DepthTimeEntry {
    /// Tabulated depth of this row.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// `(max bottom time, group)` bands in ascending order.
    pub fn breakpoints(&self) -> &[(u32, PressureGroup)] {
        &self.breakpoints
    }

    /// No-decompression limit: the row's last threshold.
    pub fn ndl(&self) -> u32 {
        self.breakpoints.last().map_or(0, |&(minutes, _)| minutes)
    }

    /// Group of the first band whose threshold is at least `minutes`.
    ///
    /// `None` once `minutes` passes the no-decompression limit.
    pub fn group_for(&self, minutes: u32) -> Option<PressureGroup> {
        self.breakpoints
            .iter()
            .find(|&&(threshold, _)| threshold >= minutes)
            .map(|&(_, group)| group)
    }
}

/// One band of the surface interval credit table, in whole minutes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SurfaceIntervalBand {
    /// First minute of the band
    pub min: u32,
    /// Last minute of the band, `None` for the open-ended final band
    #[serde(default)]
    pub max: Option<u32>,
    /// Group after a surface interval inside this band
    pub group: PressureGroup,
}

impl SurfaceIntervalBand {
    /// Whether `minutes` falls inside this band.
    pub fn contains(&self, minutes: u32) -> bool {
        minutes >= self.min && self.max.map_or(true, |max| minutes <= max)
    }
}

/// Surface interval bands for one starting group.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SurfaceIntervalEntry {
    from: PressureGroup,
    bands: Vec<SurfaceIntervalBand>,
}

impl SurfaceIntervalEntry {
    /// Starting group these bands apply to.
    pub fn from_group(&self) -> PressureGroup {
        self.from
    }

    /// Bands in ascending order of minutes.
    pub fn bands(&self) -> &[SurfaceIntervalBand] {
        &self.bands
    }
}

/// Residual nitrogen minutes at one depth, indexed by pressure group.
#[derive(Clone, Debug, PartialEq)]
struct ResidualNitrogenRow {
    depth: u32,
    minutes: Vec<u32>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TableFile {
    units: Units,
    min_surface_interval: u32,
    full_desaturation_minutes: u32,
    #[serde(rename = "depth")]
    depths: Vec<DepthRow>,
    surface_interval: Vec<SurfaceIntervalEntry>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DepthRow {
    depth: u32,
    bottom_time: Vec<u32>,
    residual_nitrogen: Vec<u32>,
}

/// A complete, validated set of planner tables in one unit system.
///
/// Immutable once built. Share it between planning sessions with an `Arc`.
#[derive(Clone, Debug, PartialEq)]
pub struct TableSet {
    units: Units,
    min_surface_interval: u32,
    full_desaturation_minutes: u32,
    depth_time: Vec<DepthTimeEntry>,
    surface_interval: Vec<SurfaceIntervalEntry>,
    residual_nitrogen: Vec<ResidualNitrogenRow>,
}

impl TableSet {
    /// The bundled PADI Recreational Dive Planner tables, in feet.
    pub fn padi_imperial() -> Result<Self, TableError> {
        Self::from_toml_str(PADI_IMPERIAL)
    }

    /// Load and validate a table set from a TOML file.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, TableError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate a table set from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, TableError> {
        let file: TableFile = toml::from_str(contents)?;
        let tables = Self::from_file(file)?;
        tables.validate()?;
        Ok(tables)
    }

    fn from_file(file: TableFile) -> Result<Self, TableError> {
        let mut depth_time = Vec::with_capacity(file.depths.len());
        let mut residual_nitrogen = Vec::with_capacity(file.depths.len());

        for row in file.depths {
            if row.bottom_time.len() > PRESSURE_GROUP_COUNT
                || row.residual_nitrogen.len() > PRESSURE_GROUP_COUNT
            {
                return Err(invalid(format!(
                    "depth {} lists more than {PRESSURE_GROUP_COUNT} groups",
                    row.depth
                )));
            }
            let breakpoints = row
                .bottom_time
                .iter()
                .copied()
                .zip(PressureGroup::all())
                .collect();
            depth_time.push(DepthTimeEntry {
                depth: row.depth,
                breakpoints,
            });
            residual_nitrogen.push(ResidualNitrogenRow {
                depth: row.depth,
                minutes: row.residual_nitrogen,
            });
        }

        let mut surface_interval = file.surface_interval;
        surface_interval.sort_by_key(|entry| entry.from);

        Ok(TableSet {
            units: file.units,
            min_surface_interval: file.min_surface_interval,
            full_desaturation_minutes: file.full_desaturation_minutes,
            depth_time,
            surface_interval,
            residual_nitrogen,
        })
    }

    fn validate(&self) -> Result<(), TableError> {
        if self.depth_time.is_empty() {
            return Err(invalid("depth/time table has no rows".into()));
        }
        if self.min_surface_interval >= self.full_desaturation_minutes {
            return Err(invalid(format!(
                "minimum surface interval {} must be below full desaturation at {}",
                self.min_surface_interval, self.full_desaturation_minutes
            )));
        }

        let mut previous_depth = 0;
        for entry in &self.depth_time {
            if entry.depth <= previous_depth {
                return Err(invalid(format!(
                    "depth {} is not deeper than the row before it",
                    entry.depth
                )));
            }
            previous_depth = entry.depth;

            if entry.breakpoints.is_empty() {
                return Err(invalid(format!("depth {} has no bottom times", entry.depth)));
            }
            strictly_increasing(
                entry.breakpoints.iter().map(|&(minutes, _)| minutes),
                || format!("bottom times at depth {}", entry.depth),
            )?;
        }

        for row in &self.residual_nitrogen {
            strictly_increasing(row.minutes.iter().copied(), || {
                format!("residual nitrogen at depth {}", row.depth)
            })?;
        }

        for group in PressureGroup::all() {
            let entry = self.surface_interval_entry(group).ok_or_else(|| {
                invalid(format!("no surface interval bands for group {group}"))
            })?;
            validate_bands(entry)?;
        }
        if self.surface_interval.len() != PRESSURE_GROUP_COUNT {
            return Err(invalid(
                "a starting group has more than one set of surface interval bands".into(),
            ));
        }

        Ok(())
    }

    /// Units every depth in this set is expressed in.
    pub fn units(&self) -> Units {
        self.units
    }

    /// Shortest surface interval that earns repetitive dive credit.
    pub fn min_surface_interval(&self) -> u32 {
        self.min_surface_interval
    }

    /// Surface interval after which no residual nitrogen is carried.
    pub fn full_desaturation_minutes(&self) -> u32 {
        self.full_desaturation_minutes
    }

    /// Depth/time rows, shallowest first.
    pub fn depth_rows(&self) -> &[DepthTimeEntry] {
        &self.depth_time
    }

    /// Deepest tabulated depth.
    pub fn max_depth(&self) -> u32 {
        self.depth_time.last().map_or(0, DepthTimeEntry::depth)
    }

    /// Depth/time row for a raw depth, rounded up to the next tabulated depth.
    pub fn depth_row(&self, depth: f64) -> Result<&DepthTimeEntry, PlanError> {
        let depth = rounding::depth_reading(depth)?;
        let tabulated = rounding::round_depth_up(depth, self.depth_time.iter().map(|e| e.depth))
            .ok_or(PlanError::DepthOutOfRange {
                depth,
                max_depth: self.max_depth(),
            })?;
        self.depth_time
            .iter()
            .find(|entry| entry.depth == tabulated)
            .ok_or_else(|| PlanError::LookupMiss {
                table: "depth/time",
                key: format!("depth {tabulated}"),
            })
    }

    /// Surface interval bands for a starting group.
    pub fn surface_interval_entry(&self, group: PressureGroup) -> Option<&SurfaceIntervalEntry> {
        self.surface_interval.iter().find(|entry| entry.from == group)
    }

    /// Residual nitrogen minutes for a group at an exact tabulated depth.
    pub fn residual_nitrogen(&self, group: PressureGroup, depth: u32) -> Option<u32> {
        self.residual_nitrogen
            .iter()
            .find(|row| row.depth == depth)
            .and_then(|row| row.minutes.get(group.index()).copied())
    }
}

fn invalid(reason: String) -> TableError {
    TableError::Invalid(reason)
}

fn strictly_increasing<I, F>(values: I, what: F) -> Result<(), TableError>
where
    I: IntoIterator<Item = u32>,
    F: Fn() -> String,
{
    let mut previous: Option<u32> = None;
    for value in values {
        if value == 0 || previous.is_some_and(|p| value <= p) {
            return Err(invalid(format!("{} must strictly increase from above zero", what())));
        }
        previous = Some(value);
    }
    Ok(())
}

fn validate_bands(entry: &SurfaceIntervalEntry) -> Result<(), TableError> {
    let from = entry.from;
    let bands = &entry.bands;
    let Some(first) = bands.first() else {
        return Err(invalid(format!("group {from} has an empty surface interval table")));
    };
    if first.min != 0 {
        return Err(invalid(format!("surface interval bands for group {from} must start at 0")));
    }

    let mut previous: Option<&SurfaceIntervalBand> = None;
    for band in bands {
        if band.group > from {
            return Err(invalid(format!(
                "group {from} cannot become heavier group {} on the surface",
                band.group
            )));
        }
        if let Some(prev) = previous {
            let Some(prev_max) = prev.max else {
                return Err(invalid(format!(
                    "only the last surface interval band for group {from} may be open-ended"
                )));
            };
            if band.min != prev_max + 1 {
                return Err(invalid(format!(
                    "surface interval bands for group {from} leave a gap or overlap at minute {}",
                    band.min
                )));
            }
            if band.group >= prev.group {
                return Err(invalid(format!(
                    "surface interval bands for group {from} must lighten as time passes"
                )));
            }
        }
        if band.max.is_some_and(|max| max < band.min) {
            return Err(invalid(format!(
                "surface interval band {}..{:?} for group {from} is reversed",
                band.min, band.max
            )));
        }
        previous = Some(band);
    }

    if bands.last().and_then(|band| band.max).is_some() {
        return Err(invalid(format!(
            "last surface interval band for group {from} must be open-ended"
        )));
    }
    Ok(())
}

//! # Pressure Group Resolution
//!
//! Maps a dive's depth and bottom time to the pressure group the diver surfaces
//! with, and flags dives that pass the no-decompression limit.
//!
//! Depth rounds up to the next tabulated row and bottom time rounds up to the
//! next whole minute (see [`rounding`](crate::rounding)). A bottom time exactly
//! equal to a threshold stays in that threshold's group; only a time strictly
//! past the last threshold is a violation.

use crate::{rounding, tables::DepthTimeEntry, PlanError, PressureGroup, TableSet};
use serde::Serialize;

/// Outcome of a depth/time lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PressureGroupResolution {
    /// Tabulated depth used for the lookup
    pub depth: u32,
    /// Bottom time rounded up to whole minutes
    pub bottom_time: u32,
    /// Group on surfacing, `None` when the limit is violated
    pub pressure_group: Option<PressureGroup>,
    /// No-decompression limit at `depth`
    pub ndl: u32,
    /// Bottom time is past the no-decompression limit
    pub violated: bool,
}

impl PressureGroupResolution {
    /// The pressure group, or `NoDecompressionLimitExceeded` for a violation.
    pub fn into_group(self) -> Result<PressureGroup, PlanError> {
        self.pressure_group
            .ok_or(PlanError::NoDecompressionLimitExceeded {
                depth: self.depth,
                bottom_time: self.bottom_time,
                ndl: self.ndl,
            })
    }
}

/// Resolves pressure groups against one table set.
#[derive(Clone, Copy, Debug)]
pub struct PressureGroupResolver<'a> {
    tables: &'a TableSet,
}

impl<'a> PressureGroupResolver<'a> {
    pub fn new(tables: &'a TableSet) -> Self {
        Self { tables }
    }

    /// Resolve the pressure group for `bottom_time` minutes at `depth`.
    ///
    /// Fails only for unusable inputs (`DepthOutOfRange`, `InvalidMeasurement`).
    /// A decompression dive is reported through `violated`, which callers must
    /// treat as a terminal planning failure.
    ///
    /// # Example
    /// ```
    /// use dive_planner_lib::{pressure_group::PressureGroupResolver, TableSet};
    ///
    /// let tables = TableSet::padi_imperial().unwrap();
    /// let resolution = PressureGroupResolver::new(&tables).resolve(60.0, 55.0).unwrap();
    /// assert_eq!(resolution.pressure_group.unwrap().letter(), 'W');
    /// assert!(!resolution.violated);
    /// ```
    pub fn resolve(
        &self,
        depth: f64,
        bottom_time: f64,
    ) -> Result<PressureGroupResolution, PlanError> {
        let row = self.tables.depth_row(depth)?;
        let minutes = rounding::bottom_time_minutes(bottom_time)?;
        Ok(resolve_in_row(row, minutes))
    }

    /// Tabulated depth and no-decompression limit for a raw depth.
    pub fn ndl_for(&self, depth: f64) -> Result<(u32, u32), PlanError> {
        let row = self.tables.depth_row(depth)?;
        Ok((row.depth(), row.ndl()))
    }
}

fn resolve_in_row(row: &DepthTimeEntry, minutes: u32) -> PressureGroupResolution {
    let ndl = row.ndl();
    let violated = minutes > ndl;
    PressureGroupResolution {
        depth: row.depth(),
        bottom_time: minutes,
        pressure_group: if violated { None } else { row.group_for(minutes) },
        ndl,
        violated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pg(letter: char) -> PressureGroup {
        PressureGroup::from_letter(letter).unwrap()
    }

    fn tables() -> TableSet {
        TableSet::padi_imperial().unwrap()
    }

    #[test]
    fn test_sixty_feet_at_limit_is_w() {
        let tables = tables();
        let resolution = PressureGroupResolver::new(&tables).resolve(60.0, 55.0).unwrap();
        assert_eq!(
            resolution,
            PressureGroupResolution {
                depth: 60,
                bottom_time: 55,
                pressure_group: Some(pg('W')),
                ndl: 55,
                violated: false,
            }
        );
    }

    #[test]
    fn test_one_minute_past_limit_violates() {
        let tables = tables();
        let resolution = PressureGroupResolver::new(&tables).resolve(60.0, 56.0).unwrap();
        assert!(resolution.violated);
        assert_eq!(resolution.pressure_group, None);
        assert_eq!(
            resolution.into_group(),
            Err(PlanError::NoDecompressionLimitExceeded {
                depth: 60,
                bottom_time: 56,
                ndl: 55
            })
        );
    }

    #[test]
    fn test_threshold_ties_stay_in_band() {
        let tables = tables();
        let resolver = PressureGroupResolver::new(&tables);
        // 60 ft: K up to 29 minutes, L up to 31
        assert_eq!(resolver.resolve(60.0, 29.0).unwrap().pressure_group, Some(pg('K')));
        assert_eq!(resolver.resolve(60.0, 30.0).unwrap().pressure_group, Some(pg('L')));
        assert_eq!(resolver.resolve(60.0, 31.0).unwrap().pressure_group, Some(pg('L')));
    }

    #[test]
    fn test_fractional_time_rounds_up() {
        let tables = tables();
        let resolver = PressureGroupResolver::new(&tables);
        let resolution = resolver.resolve(60.0, 29.5).unwrap();
        assert_eq!(resolution.bottom_time, 30);
        assert_eq!(resolution.pressure_group, Some(pg('L')));
        assert!(resolver.resolve(60.0, 55.2).unwrap().violated);
    }

    #[test]
    fn test_depth_between_rows_uses_deeper_row() {
        let tables = tables();
        let resolution = PressureGroupResolver::new(&tables).resolve(52.0, 40.0).unwrap();
        assert_eq!(resolution.depth, 60);
        assert_eq!(resolution.pressure_group, Some(pg('Q')));
    }

    #[test]
    fn test_depth_out_of_range() {
        let tables = tables();
        assert_eq!(
            PressureGroupResolver::new(&tables).resolve(150.0, 5.0),
            Err(PlanError::DepthOutOfRange {
                depth: 150.0,
                max_depth: 140
            })
        );
    }

    #[test]
    fn test_ndl_for() {
        let tables = tables();
        let resolver = PressureGroupResolver::new(&tables);
        assert_eq!(resolver.ndl_for(35.0).unwrap(), (35, 205));
        assert_eq!(resolver.ndl_for(95.0).unwrap(), (100, 20));
    }

    fn depth_and_ndl() -> impl Strategy<Value = (u32, u32)> {
        let limits: Vec<(u32, u32)> = tables()
            .depth_rows()
            .iter()
            .map(|row| (row.depth(), row.ndl()))
            .collect();
        proptest::sample::select(limits)
    }

    fn time_within_limit() -> impl Strategy<Value = (u32, u32)> {
        depth_and_ndl().prop_flat_map(|(depth, ndl)| (Just(depth), 1..=ndl))
    }

    fn two_times_within_limit() -> impl Strategy<Value = (u32, u32, u32)> {
        depth_and_ndl().prop_flat_map(|(depth, ndl)| (Just(depth), 1..=ndl, 1..=ndl))
    }

    proptest! {
        #[test]
        fn within_limit_never_violates((depth, time) in time_within_limit()) {
            let tables = tables();
            let resolution = PressureGroupResolver::new(&tables)
                .resolve(f64::from(depth), f64::from(time))
                .unwrap();
            prop_assert!(!resolution.violated);
            prop_assert!(resolution.pressure_group.is_some());
        }

        #[test]
        fn one_past_limit_always_violates((depth, ndl) in depth_and_ndl()) {
            let tables = tables();
            let resolution = PressureGroupResolver::new(&tables)
                .resolve(f64::from(depth), f64::from(ndl + 1))
                .unwrap();
            prop_assert!(resolution.violated);
        }

        #[test]
        fn more_time_never_lightens_group((depth, a, b) in two_times_within_limit()) {
            let (shorter, longer) = if a <= b { (a, b) } else { (b, a) };
            let tables = tables();
            let resolver = PressureGroupResolver::new(&tables);
            let short = resolver.resolve(f64::from(depth), f64::from(shorter)).unwrap();
            let long = resolver.resolve(f64::from(depth), f64::from(longer)).unwrap();
            prop_assert!(short.pressure_group <= long.pressure_group);
        }
    }
}

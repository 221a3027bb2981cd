//! # Surface Interval Credit
//!
//! Converts time spent on the surface into a lighter pressure group.
//!
//! Three regimes, checked in order:
//! - **Too short** (below the table minimum, 10 minutes on the PADI tables): the
//!   repetitive dive rules do not apply and the interval is refused.
//! - **Fully desaturated** (at or past the table's desaturation time, 6 hours):
//!   no residual nitrogen is carried and the next dive plans like a first dive.
//! - **Credited**: the starting group's band containing the elapsed minutes gives
//!   the new group.
//!
//! Surface time is measured, not rounded up. Partial minutes are dropped, so a
//! band printed as `0:10-0:12` covers everything from 10:00 up to just before 13:00.

use crate::{rounding, PlanError, PressureGroup, TableSet};
use serde::{Deserialize, Serialize};

/// Result of applying a surface interval to a pressure group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceCredit {
    /// Group before the surface interval
    pub start_group: PressureGroup,
    /// Whole minutes of surface interval credited
    pub minutes: u32,
    /// Group after the interval, `None` once fully desaturated
    pub pressure_group: Option<PressureGroup>,
    /// Whether the next dive must add residual nitrogen time
    pub residual_nitrogen_applies: bool,
}

/// Resolves surface interval credit against one table set.
#[derive(Clone, Copy, Debug)]
pub struct SurfaceIntervalResolver<'a> {
    tables: &'a TableSet,
}

impl<'a> SurfaceIntervalResolver<'a> {
    pub fn new(tables: &'a TableSet) -> Self {
        Self { tables }
    }

    /// Credit `surface_minutes` of surface interval to `start_group`.
    ///
    /// # Example
    /// ```
    /// use dive_planner_lib::{surface_interval::SurfaceIntervalResolver, PressureGroup, TableSet};
    ///
    /// let tables = TableSet::padi_imperial().unwrap();
    /// let w: PressureGroup = "W".parse().unwrap();
    /// let credit = SurfaceIntervalResolver::new(&tables).resolve(w, 90.0).unwrap();
    /// assert_eq!(credit.pressure_group.unwrap().letter(), 'D');
    /// assert!(credit.residual_nitrogen_applies);
    /// ```
    pub fn resolve(
        &self,
        start_group: PressureGroup,
        surface_minutes: f64,
    ) -> Result<SurfaceCredit, PlanError> {
        let minutes = rounding::surface_minutes(surface_minutes)?;

        if minutes < self.tables.min_surface_interval() {
            return Err(PlanError::SurfaceIntervalTooShort {
                minutes: surface_minutes,
                minimum: self.tables.min_surface_interval(),
            });
        }

        if minutes >= self.tables.full_desaturation_minutes() {
            return Ok(SurfaceCredit {
                start_group,
                minutes,
                pressure_group: None,
                residual_nitrogen_applies: false,
            });
        }

        let band = self
            .tables
            .surface_interval_entry(start_group)
            .and_then(|entry| entry.bands().iter().find(|band| band.contains(minutes)))
            .ok_or_else(|| PlanError::LookupMiss {
                table: "surface interval",
                key: format!("group {start_group} after {minutes} min"),
            })?;

        Ok(SurfaceCredit {
            start_group,
            minutes,
            pressure_group: Some(band.group),
            residual_nitrogen_applies: true,
        })
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
    fn test_w_after_ninety_minutes() {
        let tables = tables();
        let credit = SurfaceIntervalResolver::new(&tables).resolve(pg('W'), 90.0).unwrap();
        assert_eq!(
            credit,
            SurfaceCredit {
                start_group: pg('W'),
                minutes: 90,
                pressure_group: Some(pg('D')),
                residual_nitrogen_applies: true,
            }
        );
    }

    #[test]
    fn test_minimum_interval_boundary() {
        let tables = tables();
        let resolver = SurfaceIntervalResolver::new(&tables);
        assert_eq!(
            resolver.resolve(pg('W'), 9.0),
            Err(PlanError::SurfaceIntervalTooShort {
                minutes: 9.0,
                minimum: 10
            })
        );
        // W: 10-12 minutes credits down to M
        assert_eq!(resolver.resolve(pg('W'), 10.0).unwrap().pressure_group, Some(pg('M')));
    }

    #[test]
    fn test_partial_minutes_are_not_credited() {
        let tables = tables();
        let resolver = SurfaceIntervalResolver::new(&tables);
        assert!(resolver.resolve(pg('W'), 9.9).is_err());
        // W: 10-12 is M, 13-17 is L
        assert_eq!(resolver.resolve(pg('W'), 12.9).unwrap().pressure_group, Some(pg('M')));
        assert_eq!(resolver.resolve(pg('W'), 13.0).unwrap().pressure_group, Some(pg('L')));
    }

    #[test]
    fn test_band_edges_are_inclusive() {
        let tables = tables();
        let resolver = SurfaceIntervalResolver::new(&tables);
        // W: 89-105 is D, 106-124 is C
        assert_eq!(resolver.resolve(pg('W'), 105.0).unwrap().pressure_group, Some(pg('D')));
        assert_eq!(resolver.resolve(pg('W'), 106.0).unwrap().pressure_group, Some(pg('C')));
        // W: 146 and beyond is A
        assert_eq!(
            resolver.resolve(pg('W'), 359.0).unwrap().pressure_group,
            Some(PressureGroup::A)
        );
    }

    #[test]
    fn test_six_hours_fully_desaturates() {
        let tables = tables();
        let credit = SurfaceIntervalResolver::new(&tables)
            .resolve(PressureGroup::Z, 360.0)
            .unwrap();
        assert!(!credit.residual_nitrogen_applies);
        assert_eq!(credit.pressure_group, None);
    }

    #[test]
    fn test_light_groups_clear_to_a() {
        let tables = tables();
        let resolver = SurfaceIntervalResolver::new(&tables);
        for letter in ['A', 'B', 'C', 'D', 'E', 'F'] {
            let credit = resolver.resolve(pg(letter), 10.0).unwrap();
            assert_eq!(credit.pressure_group, Some(PressureGroup::A));
        }
    }

    #[test]
    fn test_negative_interval_is_invalid() {
        let tables = tables();
        assert!(matches!(
            SurfaceIntervalResolver::new(&tables).resolve(pg('B'), -5.0),
            Err(PlanError::InvalidMeasurement { .. })
        ));
    }

    proptest! {
        #[test]
        fn longer_interval_never_worsens_group(
            index in 0usize..26,
            a in 10u32..360,
            b in 10u32..360,
        ) {
            let (shorter, longer) = if a <= b { (a, b) } else { (b, a) };
            let tables = tables();
            let resolver = SurfaceIntervalResolver::new(&tables);
            let start = PressureGroup::from_index(index).unwrap();
            let early = resolver.resolve(start, f64::from(shorter)).unwrap();
            let late = resolver.resolve(start, f64::from(longer)).unwrap();
            prop_assert!(late.pressure_group <= early.pressure_group);
            prop_assert!(early.pressure_group <= Some(start));
        }

        #[test]
        fn desaturation_drops_residual_nitrogen(index in 0usize..26, minutes in 360u32..2000) {
            let tables = tables();
            let start = PressureGroup::from_index(index).unwrap();
            let credit = SurfaceIntervalResolver::new(&tables)
                .resolve(start, f64::from(minutes))
                .unwrap();
            prop_assert!(!credit.residual_nitrogen_applies);
        }
    }
}

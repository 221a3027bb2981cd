//! # Input Rounding Policy
//!
//! The tables only answer for whole minutes and tabulated depths, so every raw
//! measurement goes through exactly one of these functions before a lookup:
//!
//! | Input            | Rule                                   |
//! |------------------|----------------------------------------|
//! | Depth            | up to the next tabulated depth         |
//! | Bottom time      | up to the next whole minute            |
//! | Surface interval | down to the whole minutes elapsed      |
//!
//! Depth and bottom time always round toward the more conservative answer.
//! Surface time is not rounded up: crediting minutes that have not passed yet
//! would lower the pressure group, so only fully elapsed minutes count.

use crate::PlanError;

/// Check that a depth reading is positive and finite.
pub fn depth_reading(depth: f64) -> Result<f64, PlanError> {
    positive("depth", depth)
}

/// Round a depth up to the shallowest tabulated depth that is at least as deep.
///
/// `tabulated` must be in ascending order. Returns `None` when the depth is
/// deeper than every tabulated depth.
pub fn round_depth_up<I>(depth: f64, tabulated: I) -> Option<u32>
where
    I: IntoIterator<Item = u32>,
{
    tabulated.into_iter().find(|&row| f64::from(row) >= depth)
}

/// Round a bottom time up to whole minutes.
///
/// # Example
/// ```
/// use dive_planner_lib::rounding::bottom_time_minutes;
///
/// assert_eq!(bottom_time_minutes(31.2).unwrap(), 32);
/// assert_eq!(bottom_time_minutes(31.0).unwrap(), 31);
/// ```
pub fn bottom_time_minutes(time: f64) -> Result<u32, PlanError> {
    positive("bottom time", time).map(|time| time.ceil() as u32)
}

/// Truncate a surface interval to the whole minutes that have elapsed.
///
/// Zero is a valid reading here; it is the interval minimum, not this
/// function, that rejects short intervals.
pub fn surface_minutes(minutes: f64) -> Result<u32, PlanError> {
    if minutes.is_finite() && minutes >= 0.0 {
        Ok(minutes.floor() as u32)
    } else {
        Err(PlanError::InvalidMeasurement {
            field: "surface interval",
            value: minutes,
        })
    }
}

fn positive(field: &'static str, value: f64) -> Result<f64, PlanError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(PlanError::InvalidMeasurement { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROWS: [u32; 4] = [35, 40, 50, 60];

    #[test]
    fn test_depth_exact_match_is_kept() {
        assert_eq!(round_depth_up(40.0, ROWS), Some(40));
    }

    #[test]
    fn test_depth_rounds_up_never_down() {
        assert_eq!(round_depth_up(40.1, ROWS), Some(50));
        assert_eq!(round_depth_up(49.9, ROWS), Some(50));
        assert_eq!(round_depth_up(12.0, ROWS), Some(35));
    }

    #[test]
    fn test_depth_past_last_row() {
        assert_eq!(round_depth_up(60.5, ROWS), None);
    }

    #[test]
    fn test_bottom_time_rounds_up() {
        assert_eq!(bottom_time_minutes(0.1).unwrap(), 1);
        assert_eq!(bottom_time_minutes(54.01).unwrap(), 55);
        assert_eq!(bottom_time_minutes(55.0).unwrap(), 55);
    }

    #[test]
    fn test_surface_minutes_truncate() {
        assert_eq!(surface_minutes(9.99).unwrap(), 9);
        assert_eq!(surface_minutes(10.0).unwrap(), 10);
        assert_eq!(surface_minutes(0.0).unwrap(), 0);
    }

    #[test]
    fn test_rejects_non_positive_and_non_finite() {
        assert!(matches!(
            bottom_time_minutes(0.0),
            Err(PlanError::InvalidMeasurement {
                field: "bottom time",
                ..
            })
        ));
        assert!(depth_reading(-10.0).is_err());
        assert!(depth_reading(f64::NAN).is_err());
        assert!(surface_minutes(-1.0).is_err());
        assert!(surface_minutes(f64::INFINITY).is_err());
    }
}

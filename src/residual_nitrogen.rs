//! # Residual Nitrogen Time
//!
//! Translates the pressure group carried into a repetitive dive into minutes of
//! residual nitrogen time (RNT) at the next dive's depth, and the bottom time
//! that remains once those minutes are charged against the depth's limit.
//!
//! A group with no entry at a depth is already past what that depth allows
//! before any bottom time is spent; that is reported as a planning failure,
//! never treated as zero residual nitrogen.

use crate::{PlanError, PressureGroup, TableSet};
use serde::Serialize;

/// Residual nitrogen charge for one group at one depth.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ResidualNitrogen {
    /// Tabulated depth used for the lookup
    pub depth: u32,
    /// Group carried into the dive
    pub pressure_group: PressureGroup,
    /// Residual nitrogen minutes at `depth`
    pub residual_nitrogen_time: u32,
    /// Table no-decompression limit at `depth`
    pub ndl: u32,
    /// `ndl - residual_nitrogen_time`, always positive
    pub adjusted_ndl: u32,
}

/// Resolves residual nitrogen time against one table set.
#[derive(Clone, Copy, Debug)]
pub struct ResidualNitrogenResolver<'a> {
    tables: &'a TableSet,
}

impl<'a> ResidualNitrogenResolver<'a> {
    pub fn new(tables: &'a TableSet) -> Self {
        Self { tables }
    }

    /// Residual nitrogen time and adjusted limit for `group` diving to `next_depth`.
    pub fn resolve(
        &self,
        group: PressureGroup,
        next_depth: f64,
    ) -> Result<ResidualNitrogen, PlanError> {
        let row = self.tables.depth_row(next_depth)?;
        let depth = row.depth();
        let ndl = row.ndl();

        let residual_nitrogen_time = self
            .tables
            .residual_nitrogen(group, depth)
            .ok_or(PlanError::DepthOutOfRangeForResidualLoad { group, depth })?;

        if residual_nitrogen_time >= ndl {
            return Err(PlanError::NoRemainingBottomTimeAvailable {
                group,
                depth,
                residual_nitrogen_time,
                ndl,
            });
        }

        Ok(ResidualNitrogen {
            depth,
            pressure_group: group,
            residual_nitrogen_time,
            ndl,
            adjusted_ndl: ndl - residual_nitrogen_time,
        })
    }
}
